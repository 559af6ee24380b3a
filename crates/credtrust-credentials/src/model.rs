use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use credtrust_core::{Claims, CredentialState, Did};
use credtrust_crypto::{derive_identifier, KeyAlgorithm, KeyPair, PublicKey};

use crate::error::TrustError;

/// Public view of a registered issuer. Carries no secret material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issuer {
    /// Identifier derived from `public_key`.
    pub identifier: Did,
    /// Human-readable label.
    pub name: String,
    /// Verification key.
    pub public_key: PublicKey,
    /// When the issuer was registered.
    pub created_at: DateTime<Utc>,
}

impl Issuer {
    pub fn algorithm(&self) -> KeyAlgorithm {
        self.public_key.algorithm()
    }
}

/// An issuer together with its signing key, as held by an issuer store.
#[derive(Debug, Clone)]
pub struct IssuerRecord {
    pub issuer: Issuer,
    pub keypair: Arc<KeyPair>,
}

impl IssuerRecord {
    /// Generate a fresh key pair and derive the issuer identity from it.
    pub fn generate(name: &str) -> Result<Self, TrustError> {
        let keypair = KeyPair::generate()?;
        Ok(Self::from_keypair(name, keypair, Utc::now()))
    }

    /// Build a record around existing key material.
    pub fn from_keypair(name: &str, keypair: KeyPair, created_at: DateTime<Utc>) -> Self {
        let public_key = keypair.public_key();
        Self {
            issuer: Issuer {
                identifier: derive_identifier(&public_key),
                name: name.to_string(),
                public_key,
                created_at,
            },
            keypair: Arc::new(keypair),
        }
    }

    pub fn identifier(&self) -> &Did {
        &self.issuer.identifier
    }
}

/// A freshly issued credential, including the token handed to the holder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub credential_id: String,
    pub issuer: Did,
    pub holder: String,
    #[serde(rename = "type")]
    pub credential_type: Vec<String>,
    pub claims: Claims,
    pub issued_at: DateTime<Utc>,
    pub token: String,
}

/// What a credential store keeps per issued credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    pub credential_id: String,
    pub issuer: Did,
    pub holder: String,
    pub issued_at: DateTime<Utc>,
    pub token: String,
    pub state: CredentialState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
}

impl CredentialRecord {
    /// A new record in the `Active` state.
    pub fn new(
        credential_id: impl Into<String>,
        issuer: Did,
        holder: impl Into<String>,
        issued_at: DateTime<Utc>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            credential_id: credential_id.into(),
            issuer,
            holder: holder.into(),
            issued_at,
            token: token.into(),
            state: CredentialState::Active,
            revoked_at: None,
        }
    }
}

impl From<&Credential> for CredentialRecord {
    fn from(credential: &Credential) -> Self {
        Self::new(
            credential.credential_id.clone(),
            credential.issuer.clone(),
            credential.holder.clone(),
            credential.issued_at,
            credential.token.clone(),
        )
    }
}

/// Result of a revocation lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevocationStatus {
    Active,
    Revoked,
    /// No credential with this id was ever recorded.
    Unknown,
}

impl RevocationStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl From<Option<CredentialState>> for RevocationStatus {
    fn from(state: Option<CredentialState>) -> Self {
        match state {
            Some(CredentialState::Active) => Self::Active,
            Some(CredentialState::Revoked) => Self::Revoked,
            None => Self::Unknown,
        }
    }
}

impl fmt::Display for RevocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Revoked => write!(f, "revoked"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}
