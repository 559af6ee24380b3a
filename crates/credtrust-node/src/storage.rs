//! RocksDB storage backend for the CredTrust node.
//!
//! One database with a column family per record type. Public issuer data and
//! secret key bytes live in separate families and are written together in a
//! single batch. Check-then-write sequences run under a process-local write
//! lock, so `insert` and `compare_and_set` are atomic per key.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use zeroize::Zeroizing;

use credtrust_core::{CredentialState, Did};
use credtrust_credentials::{
    CasOutcome, CredentialRecord, CredentialStore, Issuer, IssuerRecord, IssuerStore, StoreError,
};
use credtrust_crypto::KeyPair;

/// Column family names for different data types.
const CF_ISSUERS: &str = "issuers";
const CF_ISSUER_KEYS: &str = "issuer_keys";
const CF_CREDENTIALS: &str = "credentials";

/// RocksDB-backed storage for the CredTrust node.
pub struct Storage {
    db: DB,
    write_lock: Mutex<()>,
}

fn backend(e: rocksdb::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

impl Storage {
    /// Open or create a RocksDB database at the given path with column families.
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_ISSUERS, Options::default()),
            ColumnFamilyDescriptor::new(CF_ISSUER_KEYS, Options::default()),
            ColumnFamilyDescriptor::new(CF_CREDENTIALS, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;

        Ok(Self {
            db,
            write_lock: Mutex::new(()),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily, StoreError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Backend(format!("column family '{}' not found", name)))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Backend("write lock poisoned".into()))
    }

    fn get_raw(&self, cf_name: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        self.db.get_cf(self.cf(cf_name)?, key).map_err(backend)
    }

    fn put_raw(&self, cf_name: &str, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.db.put_cf(self.cf(cf_name)?, key, value).map_err(backend)
    }

    fn values(&self, cf_name: &str) -> Result<Vec<Vec<u8>>, StoreError> {
        self.db
            .iterator_cf(self.cf(cf_name)?, IteratorMode::Start)
            .map(|item| item.map(|(_, v)| v.into_vec()).map_err(backend))
            .collect()
    }

    fn insert_issuer(&self, record: &IssuerRecord) -> Result<(), StoreError> {
        let key = record.identifier().uri().as_bytes();
        let issuer_json = to_json(&record.issuer)?;
        let secret = record.keypair.secret_bytes();

        let _guard = self.lock()?;
        if self.get_raw(CF_ISSUERS, key)?.is_some() {
            return Err(StoreError::Conflict(record.identifier().to_string()));
        }
        let mut batch = WriteBatch::default();
        batch.put_cf(self.cf(CF_ISSUERS)?, key, issuer_json);
        batch.put_cf(self.cf(CF_ISSUER_KEYS)?, key, secret.as_slice());
        self.db.write(batch).map_err(backend)
    }

    fn load_issuer(&self, identifier: &Did) -> Result<Option<IssuerRecord>, StoreError> {
        let key = identifier.uri().as_bytes();
        let Some(issuer_json) = self.get_raw(CF_ISSUERS, key)? else {
            return Ok(None);
        };
        let issuer: Issuer = from_json(&issuer_json)?;

        let secret = self
            .get_raw(CF_ISSUER_KEYS, key)?
            .map(Zeroizing::new)
            .ok_or_else(|| StoreError::Backend(format!("no key material for {}", identifier)))?;
        let keypair =
            KeyPair::from_bytes(&secret).map_err(|e| StoreError::Backend(e.to_string()))?;
        if keypair.public_key() != issuer.public_key {
            return Err(StoreError::Backend(format!(
                "stored key material does not match issuer {}",
                identifier
            )));
        }

        Ok(Some(IssuerRecord {
            issuer,
            keypair: Arc::new(keypair),
        }))
    }

    fn insert_credential(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        let key = record.credential_id.as_bytes();
        let value = to_json(record)?;

        let _guard = self.lock()?;
        if self.get_raw(CF_CREDENTIALS, key)?.is_some() {
            return Err(StoreError::Conflict(record.credential_id.clone()));
        }
        self.put_raw(CF_CREDENTIALS, key, &value)
    }

    fn load_credential(&self, credential_id: &str) -> Result<Option<CredentialRecord>, StoreError> {
        self.get_raw(CF_CREDENTIALS, credential_id.as_bytes())?
            .map(|bytes| from_json(&bytes))
            .transpose()
    }

    fn swap_credential_state(
        &self,
        credential_id: &str,
        expected: CredentialState,
        next: CredentialState,
        at: DateTime<Utc>,
    ) -> Result<CasOutcome, StoreError> {
        let _guard = self.lock()?;
        let Some(mut record) = self.load_credential(credential_id)? else {
            return Ok(CasOutcome::Missing);
        };
        if record.state != expected {
            return Ok(CasOutcome::Mismatch(record.state));
        }
        record.state = next;
        if next.is_final() {
            record.revoked_at = Some(at);
        }
        self.put_raw(CF_CREDENTIALS, credential_id.as_bytes(), &to_json(&record)?)?;
        Ok(CasOutcome::Swapped)
    }
}

#[async_trait]
impl IssuerStore for Storage {
    async fn insert(&self, record: IssuerRecord) -> Result<(), StoreError> {
        self.insert_issuer(&record)
    }

    async fn get(&self, identifier: &Did) -> Result<Option<IssuerRecord>, StoreError> {
        self.load_issuer(identifier)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Issuer>, StoreError> {
        for bytes in self.values(CF_ISSUERS)? {
            let issuer: Issuer = from_json(&bytes)?;
            if issuer.name == name {
                return Ok(Some(issuer));
            }
        }
        Ok(None)
    }

    async fn list(&self) -> Result<Vec<Issuer>, StoreError> {
        let mut issuers = self
            .values(CF_ISSUERS)?
            .iter()
            .map(|bytes| from_json::<Issuer>(bytes))
            .collect::<Result<Vec<_>, _>>()?;
        issuers.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.identifier.cmp(&b.identifier))
        });
        Ok(issuers)
    }
}

#[async_trait]
impl CredentialStore for Storage {
    async fn insert(&self, record: CredentialRecord) -> Result<(), StoreError> {
        self.insert_credential(&record)
    }

    async fn get(&self, credential_id: &str) -> Result<Option<CredentialRecord>, StoreError> {
        self.load_credential(credential_id)
    }

    async fn compare_and_set(
        &self,
        credential_id: &str,
        expected: CredentialState,
        next: CredentialState,
        at: DateTime<Utc>,
    ) -> Result<CasOutcome, StoreError> {
        self.swap_credential_state(credential_id, expected, next, at)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.values(CF_CREDENTIALS)?.len())
    }
}
