use ed25519_dalek::Signer as _;

use credtrust_core::Did;

use crate::error::CryptoError;
use crate::identifier::derive_identifier;
use crate::keys::{KeyAlgorithm, KeyPair, PublicKey};

/// Ed25519 signature (64 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    inner: ed25519_dalek::Signature,
}

impl Signature {
    /// Get the raw bytes (64 bytes).
    pub fn to_bytes(&self) -> [u8; 64] {
        self.inner.to_bytes()
    }

    /// Create from raw bytes (64 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes_arr: [u8; 64] = bytes.try_into().map_err(|_| {
            CryptoError::VerificationError(format!(
                "signature must be 64 bytes, got {}",
                bytes.len()
            ))
        })?;
        let inner = ed25519_dalek::Signature::from_bytes(&bytes_arr);
        Ok(Self { inner })
    }

    /// Encode as hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

/// Sign a message using Ed25519.
pub fn sign(message: &[u8], keypair: &KeyPair) -> Signature {
    let sig = keypair.signing_key().sign(message);
    Signature { inner: sig }
}

/// Verify an Ed25519 signature given as raw bytes.
///
/// Returns `Ok(false)` for a well-formed signature that does not match, and
/// `Err(VerificationError)` when the input cannot be a signature at all.
/// Uses strict verification, which rejects small-order keys and
/// non-canonical signatures.
pub fn verify(message: &[u8], signature: &[u8], pubkey: &PublicKey) -> Result<bool, CryptoError> {
    let expected = pubkey.algorithm().signature_len();
    if signature.len() != expected {
        return Err(CryptoError::VerificationError(format!(
            "{} signature must be {} bytes, got {}",
            pubkey.algorithm(),
            expected,
            signature.len()
        )));
    }
    let signature = Signature::from_bytes(signature)?;
    Ok(pubkey
        .verifying_key()
        .verify_strict(message, &signature.inner)
        .is_ok())
}

/// Signs on behalf of one issuer. The identifier is derived from the key,
/// never supplied by the caller.
pub struct Signer<'a> {
    identifier: Did,
    keypair: &'a KeyPair,
}

impl<'a> Signer<'a> {
    pub fn new(keypair: &'a KeyPair) -> Self {
        Self {
            identifier: derive_identifier(&keypair.public_key()),
            keypair,
        }
    }

    pub fn identifier(&self) -> &Did {
        &self.identifier
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.keypair.algorithm()
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        sign(message, self.keypair)
    }
}

/// Verifies signatures for one issuer identifier.
///
/// Construction fails unless the key derives exactly the claimed
/// identifier, so a substituted key can never vouch for another issuer.
#[derive(Debug, Clone)]
pub struct Verifier {
    identifier: Did,
    public_key: PublicKey,
}

impl Verifier {
    pub fn bind(identifier: &Did, public_key: PublicKey) -> Result<Self, CryptoError> {
        let derived = derive_identifier(&public_key);
        if &derived != identifier {
            tracing::warn!(
                claimed = %identifier,
                derived = %derived,
                "refusing key that does not match issuer identifier"
            );
            return Err(CryptoError::KeyMismatch {
                claimed: identifier.to_string(),
                derived: derived.to_string(),
            });
        }
        Ok(Self {
            identifier: identifier.clone(),
            public_key,
        })
    }

    pub fn identifier(&self) -> &Did {
        &self.identifier
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.public_key.algorithm()
    }

    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool, CryptoError> {
        verify(message, signature, &self.public_key)
    }
}
