//! Issuer identifier derivation.
//!
//! `did:ct:<base58(blake3(algorithm tag || public key bytes))>`. The
//! identifier is a pure function of the key, so a verifier holding only the
//! identifier can locate the key and confirm the pairing independently.

use credtrust_core::Did;

use crate::hashing::hash;
use crate::keys::PublicKey;

/// Derive the stable issuer identifier for a public key.
pub fn derive_identifier(public_key: &PublicKey) -> Did {
    let tag = public_key.algorithm().tag();
    let mut input = Vec::with_capacity(tag.len() + public_key.as_bytes().len());
    input.extend_from_slice(&tag);
    input.extend_from_slice(public_key.as_bytes());
    let fingerprint = bs58::encode(hash(&input)).into_string();
    Did::from_fingerprint(&fingerprint)
}
