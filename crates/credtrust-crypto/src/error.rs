/// Cryptographic operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("key generation failed: {0}")]
    KeyGenerationError(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("malformed verification input: {0}")]
    VerificationError(String),

    #[error("key does not match identifier {claimed} (key derives {derived})")]
    KeyMismatch { claimed: String, derived: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}
