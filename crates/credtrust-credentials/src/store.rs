use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use credtrust_core::{CredentialState, Did};

use crate::model::{CredentialRecord, Issuer, IssuerRecord};

/// Errors raised by storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("key already present: {0}")]
    Conflict(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Outcome of a conditional state update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    /// The stored state matched and was replaced.
    Swapped,
    /// The stored state differed; carries what was found.
    Mismatch(CredentialState),
    /// No record under that id.
    Missing,
}

/// Authoritative store of registered issuers and their key pairs.
#[async_trait]
pub trait IssuerStore: Send + Sync {
    /// Insert a new issuer. Fails with `Conflict` if the identifier exists.
    async fn insert(&self, record: IssuerRecord) -> Result<(), StoreError>;

    async fn get(&self, identifier: &Did) -> Result<Option<IssuerRecord>, StoreError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Issuer>, StoreError>;

    /// All issuers, oldest registration first.
    async fn list(&self) -> Result<Vec<Issuer>, StoreError>;
}

/// Authoritative store of issued credentials and their revocation state.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a new record. Fails with `Conflict` if the id exists; the
    /// check and the write happen as one step.
    async fn insert(&self, record: CredentialRecord) -> Result<(), StoreError>;

    async fn get(&self, credential_id: &str) -> Result<Option<CredentialRecord>, StoreError>;

    /// Atomically move a record from `expected` to `next`, stamping
    /// `revoked_at` when `next` is final.
    async fn compare_and_set(
        &self,
        credential_id: &str,
        expected: CredentialState,
        next: CredentialState,
        at: DateTime<Utc>,
    ) -> Result<CasOutcome, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}

/// In-memory issuer store backed by a concurrent map.
#[derive(Default)]
pub struct InMemoryIssuerStore {
    issuers: DashMap<Did, IssuerRecord>,
}

impl InMemoryIssuerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IssuerStore for InMemoryIssuerStore {
    async fn insert(&self, record: IssuerRecord) -> Result<(), StoreError> {
        match self.issuers.entry(record.identifier().clone()) {
            Entry::Occupied(entry) => Err(StoreError::Conflict(entry.key().to_string())),
            Entry::Vacant(entry) => {
                entry.insert(record);
                Ok(())
            }
        }
    }

    async fn get(&self, identifier: &Did) -> Result<Option<IssuerRecord>, StoreError> {
        Ok(self.issuers.get(identifier).map(|r| r.value().clone()))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Issuer>, StoreError> {
        Ok(self
            .issuers
            .iter()
            .find(|r| r.issuer.name == name)
            .map(|r| r.issuer.clone()))
    }

    async fn list(&self) -> Result<Vec<Issuer>, StoreError> {
        let mut issuers: Vec<Issuer> = self.issuers.iter().map(|r| r.issuer.clone()).collect();
        issuers.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.identifier.cmp(&b.identifier))
        });
        Ok(issuers)
    }
}

/// In-memory credential store backed by a concurrent map.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    credentials: DashMap<String, CredentialRecord>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn insert(&self, record: CredentialRecord) -> Result<(), StoreError> {
        match self.credentials.entry(record.credential_id.clone()) {
            Entry::Occupied(entry) => Err(StoreError::Conflict(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(record);
                Ok(())
            }
        }
    }

    async fn get(&self, credential_id: &str) -> Result<Option<CredentialRecord>, StoreError> {
        Ok(self.credentials.get(credential_id).map(|r| r.value().clone()))
    }

    async fn compare_and_set(
        &self,
        credential_id: &str,
        expected: CredentialState,
        next: CredentialState,
        at: DateTime<Utc>,
    ) -> Result<CasOutcome, StoreError> {
        // The shard write lock is held until `record` drops.
        let Some(mut record) = self.credentials.get_mut(credential_id) else {
            return Ok(CasOutcome::Missing);
        };
        if record.state != expected {
            return Ok(CasOutcome::Mismatch(record.state));
        }
        record.state = next;
        if next.is_final() {
            record.revoked_at = Some(at);
        }
        Ok(CasOutcome::Swapped)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.credentials.len())
    }
}
