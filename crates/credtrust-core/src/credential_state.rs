use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// The states of an issued credential.
///
/// A credential enters the lifecycle as `Active` the moment it is issued.
/// "Unknown" is the absence of a record, never a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialState {
    /// Credential has been issued and is trustworthy.
    Active,
    /// Credential has been permanently revoked. Final state.
    Revoked,
}

impl CredentialState {
    /// Whether this is a final (terminal) state.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Revoked)
    }

    /// Stable lowercase name used on the wire and in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Revoked => "revoked",
        }
    }
}

impl fmt::Display for CredentialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Revoked => write!(f, "Revoked"),
        }
    }
}

impl FromStr for CredentialState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "revoked" => Ok(Self::Revoked),
            other => Err(CoreError::ValidationError(format!(
                "invalid credential state value: {}",
                other
            ))),
        }
    }
}

/// Events that trigger credential state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialEvent {
    /// Issuer permanently revokes the credential.
    Revoke,
}

/// Manages credential state transitions.
///
/// Valid transitions:
/// - Active → Revoked (Revoke)
///
/// Revocation is monotonic: nothing leaves `Revoked`.
pub struct CredentialStateMachine;

impl CredentialStateMachine {
    /// Attempt a state transition based on an event.
    /// Returns the new state on success, or an error for invalid transitions.
    pub fn transition(
        current: CredentialState,
        event: CredentialEvent,
    ) -> Result<CredentialState, CoreError> {
        let new_state = match (current, event) {
            (CredentialState::Active, CredentialEvent::Revoke) => CredentialState::Revoked,

            (CredentialState::Revoked, CredentialEvent::Revoke) => {
                return Err(CoreError::InvalidStateTransition {
                    from: current,
                    to: CredentialState::Revoked,
                });
            }
        };

        tracing::debug!(
            from = %current,
            to = %new_state,
            event = ?event,
            "credential state transition"
        );

        Ok(new_state)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: CredentialState, event: CredentialEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revoke_from_active() {
        let state =
            CredentialStateMachine::transition(CredentialState::Active, CredentialEvent::Revoke)
                .unwrap();
        assert_eq!(state, CredentialState::Revoked);
        assert!(state.is_final());
    }

    #[test]
    fn test_revoke_twice_is_rejected() {
        let result =
            CredentialStateMachine::transition(CredentialState::Revoked, CredentialEvent::Revoke);
        assert!(matches!(
            result,
            Err(CoreError::InvalidStateTransition {
                from: CredentialState::Revoked,
                to: CredentialState::Revoked,
            })
        ));
    }

    #[test]
    fn test_can_transition() {
        assert!(CredentialStateMachine::can_transition(
            CredentialState::Active,
            CredentialEvent::Revoke
        ));
        assert!(!CredentialStateMachine::can_transition(
            CredentialState::Revoked,
            CredentialEvent::Revoke
        ));
    }

    #[test]
    fn test_final_states() {
        assert!(CredentialState::Revoked.is_final());
        assert!(!CredentialState::Active.is_final());
    }

    #[test]
    fn test_str_roundtrip() {
        for state in [CredentialState::Active, CredentialState::Revoked] {
            let back: CredentialState = state.as_str().parse().unwrap();
            assert_eq!(state, back);
        }
    }

    #[test]
    fn test_invalid_str_value() {
        assert!("suspended".parse::<CredentialState>().is_err());
        assert!("".parse::<CredentialState>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", CredentialState::Active), "Active");
        assert_eq!(format!("{}", CredentialState::Revoked), "Revoked");
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&CredentialState::Revoked).unwrap();
        assert_eq!(json, "\"revoked\"");
        let back: CredentialState = serde_json::from_str("\"active\"").unwrap();
        assert_eq!(back, CredentialState::Active);
    }
}
