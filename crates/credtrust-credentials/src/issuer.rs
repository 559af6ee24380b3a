use chrono::{DateTime, SubsecRound, Utc};
use std::sync::Arc;
use uuid::Uuid;

use credtrust_core::{normalize_credential_types, Claims, Did};
use credtrust_crypto::{KeyPair, Signer};

use crate::codec::{self, CredentialPayload};
use crate::error::TrustError;
use crate::model::{Credential, IssuerRecord};

/// Issues credentials signed by one issuer's key pair.
pub struct CredentialIssuer {
    identifier: Did,
    keypair: Arc<KeyPair>,
}

impl CredentialIssuer {
    /// Create an issuer from a stored record. The key pair is shared, not
    /// copied.
    pub fn from_record(record: &IssuerRecord) -> Self {
        Self {
            identifier: record.identifier().clone(),
            keypair: record.keypair.clone(),
        }
    }

    /// Get the issuer's identifier.
    pub fn identifier(&self) -> &Did {
        &self.identifier
    }

    /// Issue a credential with a fresh id, stamped with the current time.
    pub fn issue(
        &self,
        holder: &str,
        credential_type: Vec<String>,
        claims: Claims,
    ) -> Result<Credential, TrustError> {
        let credential_id = format!("urn:uuid:{}", Uuid::now_v7());
        self.issue_with_id(&credential_id, holder, credential_type, claims, Utc::now())
    }

    /// Issue a credential under a caller-chosen id and time. `issued_at` is
    /// truncated to whole seconds, the resolution the token carries.
    pub fn issue_with_id(
        &self,
        credential_id: &str,
        holder: &str,
        credential_type: Vec<String>,
        claims: Claims,
        issued_at: DateTime<Utc>,
    ) -> Result<Credential, TrustError> {
        let holder = holder.trim();
        if holder.is_empty() {
            return Err(TrustError::InvalidHolder("holder must not be empty".into()));
        }
        let issued_at = issued_at.trunc_subsecs(0);
        let credential_type = normalize_credential_types(credential_type);

        let signer = Signer::new(&self.keypair);
        let payload = CredentialPayload::new(
            credential_id,
            signer.identifier(),
            holder,
            credential_type.clone(),
            claims.clone(),
            issued_at,
        );
        let token = codec::encode(&payload, &signer)?;

        tracing::info!(
            issuer = %self.identifier,
            holder = holder,
            credential_id = %credential_id,
            "credential issued"
        );

        Ok(Credential {
            credential_id: credential_id.to_string(),
            issuer: self.identifier.clone(),
            holder: holder.to_string(),
            credential_type,
            claims,
            issued_at,
            token,
        })
    }
}
