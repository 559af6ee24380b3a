use chrono::Utc;
use std::sync::Arc;

use credtrust_core::{CoreError, CredentialEvent, CredentialState, CredentialStateMachine};

use crate::error::TrustError;
use crate::model::{CredentialRecord, RevocationStatus};
use crate::store::{CasOutcome, CredentialStore, StoreError};

/// Outcome of a revocation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    /// This call moved the credential from active to revoked.
    Revoked,
    /// The credential was already revoked; nothing changed.
    AlreadyRevoked,
}

impl RevokeOutcome {
    pub fn already_revoked(&self) -> bool {
        matches!(self, Self::AlreadyRevoked)
    }
}

/// Tracks the lifecycle state of every issued credential.
///
/// Each operation is a single atomic store step, so concurrent revocations
/// of one id produce exactly one `Revoked` outcome.
#[derive(Clone)]
pub struct RevocationRegistry {
    store: Arc<dyn CredentialStore>,
}

impl RevocationRegistry {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Record a newly issued credential as active.
    pub async fn record_issued(&self, record: CredentialRecord) -> Result<(), TrustError> {
        let credential_id = record.credential_id.clone();
        match self.store.insert(record).await {
            Ok(()) => {
                tracing::debug!(credential_id = %credential_id, "credential recorded as active");
                Ok(())
            }
            Err(StoreError::Conflict(_)) => Err(TrustError::DuplicateCredential(credential_id)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn revoke(&self, credential_id: &str) -> Result<RevokeOutcome, TrustError> {
        let current = self
            .store
            .get(credential_id)
            .await?
            .ok_or_else(|| TrustError::UnknownCredential(credential_id.to_string()))?;

        if current.state.is_final() {
            return Ok(RevokeOutcome::AlreadyRevoked);
        }
        let next = CredentialStateMachine::transition(current.state, CredentialEvent::Revoke)?;

        match self
            .store
            .compare_and_set(credential_id, current.state, next, Utc::now())
            .await?
        {
            CasOutcome::Swapped => {
                tracing::info!(credential_id = %credential_id, "credential revoked");
                Ok(RevokeOutcome::Revoked)
            }
            // Lost a race with another revocation.
            CasOutcome::Mismatch(CredentialState::Revoked) => Ok(RevokeOutcome::AlreadyRevoked),
            CasOutcome::Mismatch(found) => Err(CoreError::InvalidStateTransition {
                from: found,
                to: next,
            }
            .into()),
            CasOutcome::Missing => Err(TrustError::UnknownCredential(credential_id.to_string())),
        }
    }

    pub async fn status_of(&self, credential_id: &str) -> Result<RevocationStatus, TrustError> {
        let state = self.store.get(credential_id).await?.map(|r| r.state);
        Ok(RevocationStatus::from(state))
    }

    pub async fn record(&self, credential_id: &str) -> Result<Option<CredentialRecord>, TrustError> {
        Ok(self.store.get(credential_id).await?)
    }

    pub async fn count(&self) -> Result<usize, TrustError> {
        Ok(self.store.count().await?)
    }
}
