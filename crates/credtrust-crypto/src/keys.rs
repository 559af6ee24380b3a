use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, Zeroizing};

use crate::error::CryptoError;

/// Signature algorithm a piece of key material belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyAlgorithm {
    Ed25519,
}

impl KeyAlgorithm {
    /// Name of the algorithm in a compact token header (`alg`).
    pub fn jws_name(&self) -> &'static str {
        match self {
            Self::Ed25519 => "EdDSA",
        }
    }

    /// Resolve a token header `alg` value. Anything unsupported yields `None`.
    pub fn from_jws_name(name: &str) -> Option<Self> {
        match name {
            "EdDSA" => Some(Self::Ed25519),
            _ => None,
        }
    }

    /// Multicodec-style tag prefixed to public key bytes before hashing.
    pub fn tag(&self) -> [u8; 2] {
        match self {
            Self::Ed25519 => [0xed, 0x01],
        }
    }

    pub fn public_key_len(&self) -> usize {
        match self {
            Self::Ed25519 => 32,
        }
    }

    pub fn signature_len(&self) -> usize {
        match self {
            Self::Ed25519 => 64,
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ed25519 => write!(f, "Ed25519"),
        }
    }
}

/// Ed25519 key pair for signing operations.
/// Private key material is zeroized on drop by ed25519-dalek.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a new random key pair using OS-provided entropy.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut seed = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut seed)
            .map_err(|e| CryptoError::KeyGenerationError(e.to_string()))?;
        let kp = Self::from_seed(&seed);
        seed.zeroize();
        Ok(kp)
    }

    /// Create a key pair from a 32-byte seed.
    /// The seed is used directly as the Ed25519 private key.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Create a key pair from raw bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut seed = [0u8; 32];
        seed.copy_from_slice(bytes);
        let kp = Self::from_seed(&seed);
        seed.zeroize();
        Ok(kp)
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        KeyAlgorithm::Ed25519
    }

    /// Get the public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            algorithm: self.algorithm(),
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    /// Raw private key bytes, wiped when the returned buffer is dropped.
    /// Only persistence backends should need this.
    pub fn secret_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.signing_key.to_bytes())
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("algorithm", &self.algorithm())
            .field("public_key", &self.public_key().to_hex())
            .finish_non_exhaustive()
    }
}

/// Public key tagged with its algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaggedPublicKey", into = "TaggedPublicKey")]
pub struct PublicKey {
    algorithm: KeyAlgorithm,
    verifying_key: VerifyingKey,
}

impl PublicKey {
    /// Create an Ed25519 public key from raw bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        Self::from_tagged(KeyAlgorithm::Ed25519, bytes)
    }

    /// Create a public key for the given algorithm from raw bytes.
    pub fn from_tagged(algorithm: KeyAlgorithm, bytes: &[u8]) -> Result<Self, CryptoError> {
        let expected = algorithm.public_key_len();
        let bytes_arr: [u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected,
            actual: bytes.len(),
        })?;
        let verifying_key = VerifyingKey::from_bytes(&bytes_arr)
            .map_err(|e| CryptoError::InvalidInput(format!("invalid public key: {}", e)))?;
        Ok(Self {
            algorithm,
            verifying_key,
        })
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// Get the raw bytes (32 bytes).
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.verifying_key.as_bytes()
    }

    /// Encode as hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    /// Decode an Ed25519 key from a hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| CryptoError::InvalidInput(format!("invalid hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Encode as unpadded base64url, the `x` member of an OKP JWK.
    pub fn to_base64url(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.as_bytes())
    }

    /// Decode an Ed25519 key from unpadded base64url.
    pub fn from_base64url(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| CryptoError::InvalidInput(format!("invalid base64url: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Render as a JSON Web Key so third-party verifiers can import it.
    pub fn to_jwk(&self) -> Jwk {
        match self.algorithm {
            KeyAlgorithm::Ed25519 => Jwk {
                kty: "OKP".into(),
                crv: "Ed25519".into(),
                x: self.to_base64url(),
            },
        }
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }
}

/// Public JSON Web Key (RFC 8037 OKP form).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub crv: String,
    pub x: String,
}

/// Serialized form of a [`PublicKey`].
#[derive(Serialize, Deserialize)]
struct TaggedPublicKey {
    algorithm: KeyAlgorithm,
    key: String,
}

impl TryFrom<TaggedPublicKey> for PublicKey {
    type Error = CryptoError;

    fn try_from(tagged: TaggedPublicKey) -> Result<Self, Self::Error> {
        let bytes = hex::decode(&tagged.key)
            .map_err(|e| CryptoError::InvalidInput(format!("invalid hex: {}", e)))?;
        Self::from_tagged(tagged.algorithm, &bytes)
    }
}

impl From<PublicKey> for TaggedPublicKey {
    fn from(pk: PublicKey) -> Self {
        Self {
            algorithm: pk.algorithm,
            key: pk.to_hex(),
        }
    }
}
