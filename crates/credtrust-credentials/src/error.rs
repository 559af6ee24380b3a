use credtrust_core::CoreError;
use credtrust_crypto::CryptoError;

use crate::store::StoreError;

/// Errors surfaced by the credential trust engine.
#[derive(Debug, thiserror::Error)]
pub enum TrustError {
    #[error("invalid issuer name: {0}")]
    InvalidName(String),

    #[error("invalid holder: {0}")]
    InvalidHolder(String),

    #[error("unknown issuer: {0}")]
    UnknownIssuer(String),

    #[error("unknown credential: {0}")]
    UnknownCredential(String),

    #[error("issuer already exists: {0}")]
    IssuerAlreadyExists(String),

    #[error("duplicate credential id: {0}")]
    DuplicateCredential(String),

    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl TrustError {
    /// Stable machine-readable name for the failure, used by hosting shells.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidName(_) => "InvalidName",
            Self::InvalidHolder(_) => "InvalidHolder",
            Self::UnknownIssuer(_) => "UnknownIssuerError",
            Self::UnknownCredential(_) => "UnknownCredentialError",
            Self::IssuerAlreadyExists(_) => "IssuerAlreadyExistsError",
            Self::DuplicateCredential(_) => "DuplicateCredentialError",
            Self::MalformedToken(_) => "MalformedTokenError",
            Self::UnsupportedAlgorithm(_) => "UnsupportedAlgorithmError",
            Self::Crypto(CryptoError::KeyGenerationError(_)) => "KeyGenerationError",
            Self::Crypto(CryptoError::VerificationError(_)) => "VerificationError",
            Self::Crypto(_) => "CryptoError",
            Self::Core(_) => "StateError",
            Self::Store(_) => "StoreError",
            Self::Serialization(_) => "SerializationError",
        }
    }

    /// Whether the failure stems from caller input rather than service state.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidName(_)
                | Self::InvalidHolder(_)
                | Self::MalformedToken(_)
                | Self::UnsupportedAlgorithm(_)
        )
    }
}
