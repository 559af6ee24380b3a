use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use credtrust_core::{Claims, CredentialState, Did, TrustPolicy};
use credtrust_crypto::KeyPair;

use crate::codec::CompactToken;
use crate::error::TrustError;
use crate::issuer::CredentialIssuer;
use crate::model::{Credential, CredentialRecord, Issuer, IssuerRecord, RevocationStatus};
use crate::registry::RevocationRegistry;
use crate::store::{
    CredentialStore, InMemoryCredentialStore, InMemoryIssuerStore, IssuerStore, StoreError,
};
use crate::verifier::{CredentialVerifier, SignatureVerdict, VerificationResult};

/// Request to issue a credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    /// Identifier of a registered issuer.
    #[serde(rename = "issuerIdentifier")]
    pub issuer: String,
    pub holder: String,
    #[serde(default)]
    pub claims: Claims,
    /// Extra credential types; `VerifiableCredential` is always added.
    #[serde(default, rename = "type")]
    pub credential_type: Vec<String>,
}

/// Acknowledgement of a revocation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevocationReceipt {
    pub credential_id: String,
    pub status: RevocationStatus,
    /// True when the credential had been revoked by an earlier call.
    pub already_revoked: bool,
}

/// Registers issuers, issues, verifies, and revokes credentials.
///
/// The service owns no storage itself: the hosting node injects the stores
/// and controls their lifecycle. All methods take `&self` and are safe to
/// call from concurrent tasks.
pub struct TrustService {
    issuers: Arc<dyn IssuerStore>,
    registry: RevocationRegistry,
    policy: TrustPolicy,
    /// Serializes the name check and insert when names must be unique.
    registration_lock: Mutex<()>,
}

impl TrustService {
    pub fn new(
        issuers: Arc<dyn IssuerStore>,
        credentials: Arc<dyn CredentialStore>,
        policy: TrustPolicy,
    ) -> Self {
        Self {
            issuers,
            registry: RevocationRegistry::new(credentials),
            policy,
            registration_lock: Mutex::new(()),
        }
    }

    /// A service over fresh in-memory stores.
    pub fn in_memory(policy: TrustPolicy) -> Self {
        Self::new(
            Arc::new(InMemoryIssuerStore::new()),
            Arc::new(InMemoryCredentialStore::new()),
            policy,
        )
    }

    pub fn policy(&self) -> &TrustPolicy {
        &self.policy
    }

    /// Register a new issuer under a freshly generated key pair.
    pub async fn register_issuer(&self, name: &str) -> Result<Issuer, TrustError> {
        let name = self.validate_name(name)?;
        let keypair = KeyPair::generate()?;
        self.insert_issuer(IssuerRecord::from_keypair(&name, keypair, Utc::now()))
            .await
    }

    /// Register an issuer around existing key material.
    pub async fn register_issuer_with_key(
        &self,
        name: &str,
        keypair: KeyPair,
    ) -> Result<Issuer, TrustError> {
        let name = self.validate_name(name)?;
        self.insert_issuer(IssuerRecord::from_keypair(&name, keypair, Utc::now()))
            .await
    }

    fn validate_name(&self, name: &str) -> Result<String, TrustError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrustError::InvalidName("name must not be empty".into()));
        }
        let len = name.chars().count();
        if len > self.policy.max_name_length {
            return Err(TrustError::InvalidName(format!(
                "name is {} characters, limit is {}",
                len, self.policy.max_name_length
            )));
        }
        Ok(name.to_string())
    }

    async fn insert_issuer(&self, record: IssuerRecord) -> Result<Issuer, TrustError> {
        let _guard = if self.policy.unique_issuer_names {
            let guard = self.registration_lock.lock().await;
            if self.issuers.find_by_name(&record.issuer.name).await?.is_some() {
                return Err(TrustError::IssuerAlreadyExists(record.issuer.name.clone()));
            }
            Some(guard)
        } else {
            None
        };

        let issuer = record.issuer.clone();
        match self.issuers.insert(record).await {
            Ok(()) => {}
            Err(StoreError::Conflict(id)) => return Err(TrustError::IssuerAlreadyExists(id)),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            issuer = %issuer.identifier,
            name = %issuer.name,
            algorithm = %issuer.algorithm(),
            "issuer registered"
        );
        Ok(issuer)
    }

    async fn issuer_record(&self, identifier: &str) -> Result<IssuerRecord, TrustError> {
        let unknown = || TrustError::UnknownIssuer(identifier.to_string());
        let did = Did::new(identifier).map_err(|_| unknown())?;
        self.issuers.get(&did).await?.ok_or_else(unknown)
    }

    /// Sign a credential for a holder and record it as active.
    pub async fn issue_credential(&self, request: IssueRequest) -> Result<Credential, TrustError> {
        if request.holder.trim().is_empty() {
            return Err(TrustError::InvalidHolder("holder must not be empty".into()));
        }
        let record = self.issuer_record(&request.issuer).await?;
        let credential = CredentialIssuer::from_record(&record).issue(
            &request.holder,
            request.credential_type,
            request.claims,
        )?;
        self.registry
            .record_issued(CredentialRecord::from(&credential))
            .await?;
        Ok(credential)
    }

    /// Verify a token: signature against the issuer key on record first,
    /// then revocation status.
    ///
    /// Structural problems, unsupported algorithms, and unknown issuers are
    /// errors; a bad signature or a revoked or unknown credential is a
    /// negative verdict.
    pub async fn verify_credential(&self, token: &str) -> Result<VerificationResult, TrustError> {
        let compact = CompactToken::parse(token)?;
        let record = self.issuer_record(compact.issuer()).await?;
        let verifier = CredentialVerifier::bind(&record.issuer)?;

        let result = match verifier.check_signature(&compact)? {
            SignatureVerdict::Invalid => verifier.rejected(),
            SignatureVerdict::Valid(payload) => {
                // A record issued by someone else does not vouch for this token.
                let state = self
                    .registry
                    .record(&payload.jti)
                    .await?
                    .filter(|r| &r.issuer == verifier.issuer())
                    .map(|r| r.state);
                verifier.conclude(&payload, RevocationStatus::from(state))
            }
        };

        tracing::info!(
            issuer = %result.issuer,
            credential_id = ?result.credential_id,
            valid = result.valid,
            reason = ?result.reason,
            "credential verified"
        );
        Ok(result)
    }

    /// Revoke a credential. Revoking twice is not an error.
    pub async fn revoke_credential(
        &self,
        credential_id: &str,
    ) -> Result<RevocationReceipt, TrustError> {
        let outcome = self.registry.revoke(credential_id).await?;
        Ok(RevocationReceipt {
            credential_id: credential_id.to_string(),
            status: RevocationStatus::Revoked,
            already_revoked: outcome.already_revoked(),
        })
    }

    pub async fn status_of(&self, credential_id: &str) -> Result<RevocationStatus, TrustError> {
        self.registry.status_of(credential_id).await
    }

    /// Public view of one issuer, for resolving its key out of band.
    pub async fn issuer(&self, identifier: &str) -> Result<Issuer, TrustError> {
        Ok(self.issuer_record(identifier).await?.issuer)
    }

    pub async fn issuers(&self) -> Result<Vec<Issuer>, TrustError> {
        Ok(self.issuers.list().await?)
    }

    /// Stored record of an issued credential, including its token.
    pub async fn credential(&self, credential_id: &str) -> Result<CredentialRecord, TrustError> {
        self.registry
            .record(credential_id)
            .await?
            .ok_or_else(|| TrustError::UnknownCredential(credential_id.to_string()))
    }

    pub async fn credential_count(&self) -> Result<usize, TrustError> {
        self.registry.count().await
    }

    /// Whether a credential is currently revoked. Unknown ids are not.
    pub async fn is_revoked(&self, credential_id: &str) -> Result<bool, TrustError> {
        Ok(self
            .registry
            .record(credential_id)
            .await?
            .is_some_and(|r| r.state == CredentialState::Revoked))
    }
}
