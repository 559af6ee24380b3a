use crate::credential_state::CredentialState;

/// Core protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: CredentialState,
        to: CredentialState,
    },

    #[error("invalid DID format: {0}")]
    InvalidDid(String),

    #[error("validation error: {0}")]
    ValidationError(String),
}
