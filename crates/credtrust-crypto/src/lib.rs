pub mod error;
pub mod hashing;
pub mod identifier;
pub mod keys;
pub mod signing;

pub use error::CryptoError;
pub use hashing::hash;
pub use identifier::derive_identifier;
pub use keys::{Jwk, KeyAlgorithm, KeyPair, PublicKey};
pub use signing::{sign, verify, Signature, Signer, Verifier};
