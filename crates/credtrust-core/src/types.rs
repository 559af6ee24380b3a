use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Prefix shared by every issuer identifier.
pub const DID_PREFIX: &str = "did:ct:";

/// The base type every credential carries first.
pub const VERIFIABLE_CREDENTIAL: &str = "VerifiableCredential";

/// Issuer identifier in CredTrust.
/// Format: `did:ct:<fingerprint>` where the fingerprint is derived from the
/// issuer's public key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did(String);

impl Did {
    /// Parse a DID from a full URI string.
    pub fn new(uri: impl Into<String>) -> Result<Self, CoreError> {
        let uri = uri.into();
        let fingerprint = uri.strip_prefix(DID_PREFIX).ok_or_else(|| {
            CoreError::InvalidDid(format!("DID must start with '{}', got: {}", DID_PREFIX, uri))
        })?;
        if fingerprint.is_empty() {
            return Err(CoreError::InvalidDid(format!(
                "DID must have format '{}<fingerprint>', got: {}",
                DID_PREFIX, uri
            )));
        }
        if !fingerprint.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CoreError::InvalidDid(format!(
                "DID fingerprint must be alphanumeric, got: {}",
                uri
            )));
        }
        Ok(Self(uri))
    }

    /// Build a DID from an already encoded key fingerprint.
    pub fn from_fingerprint(fingerprint: &str) -> Self {
        Self(format!("{}{}", DID_PREFIX, fingerprint))
    }

    /// Get the full DID URI.
    pub fn uri(&self) -> &str {
        &self.0
    }

    /// Extract the key fingerprint.
    pub fn fingerprint(&self) -> &str {
        &self.0[DID_PREFIX.len()..]
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Did {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Did {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.0
    }
}

/// Claims asserted about a holder, ordered by claim name.
///
/// Ordering by name keeps the serialized form canonical: the same logical
/// claim set always produces the same bytes.
pub type Claims = BTreeMap<String, serde_json::Value>;

/// Normalize a list of credential types: `VerifiableCredential` first,
/// blank entries dropped, duplicates removed while keeping first-seen order.
pub fn normalize_credential_types(credential_type: Vec<String>) -> Vec<String> {
    let mut types = vec![VERIFIABLE_CREDENTIAL.to_string()];
    for t in credential_type {
        let t = t.trim();
        if t.is_empty() || types.iter().any(|existing| existing == t) {
            continue;
        }
        types.push(t.to_string());
    }
    types
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_did_new_valid() {
        let did = Did::new("did:ct:abc123").unwrap();
        assert_eq!(did.uri(), "did:ct:abc123");
        assert_eq!(did.fingerprint(), "abc123");
    }

    #[test]
    fn test_did_new_invalid_prefix() {
        assert!(Did::new("did:other:abc123").is_err());
        assert!(Did::new("did:ct").is_err());
    }

    #[test]
    fn test_did_new_empty_fingerprint() {
        assert!(Did::new("did:ct:").is_err());
    }

    #[test]
    fn test_did_rejects_non_alphanumeric_fingerprint() {
        assert!(Did::new("did:ct:abc:def").is_err());
        assert!(Did::new("did:ct:abc#keys-1").is_err());
    }

    #[test]
    fn test_did_from_fingerprint() {
        let did = Did::from_fingerprint("z6Mk");
        assert_eq!(did.uri(), "did:ct:z6Mk");
        assert_eq!(format!("{}", did), "did:ct:z6Mk");
    }

    #[test]
    fn test_did_serde_is_plain_string() {
        let did = Did::from_fingerprint("abc");
        let json = serde_json::to_string(&did).unwrap();
        assert_eq!(json, "\"did:ct:abc\"");
        let back: Did = serde_json::from_str(&json).unwrap();
        assert_eq!(back, did);
    }

    #[test]
    fn test_did_serde_rejects_invalid() {
        let result: Result<Did, _> = serde_json::from_str("\"did:example:abc\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_normalize_adds_base_type() {
        let types = normalize_credential_types(vec!["InternshipCertificate".into()]);
        assert_eq!(types, vec!["VerifiableCredential", "InternshipCertificate"]);
    }

    #[test]
    fn test_normalize_no_duplicates() {
        let types = normalize_credential_types(vec![
            "VerifiableCredential".into(),
            "Custom".into(),
            "Custom".into(),
            " ".into(),
        ]);
        assert_eq!(types, vec!["VerifiableCredential", "Custom"]);
    }

    #[test]
    fn test_claims_are_ordered_by_name() {
        let mut claims = Claims::new();
        claims.insert("role".into(), serde_json::json!("Intern"));
        claims.insert("company".into(), serde_json::json!("Acme"));
        let json = serde_json::to_string(&claims).unwrap();
        assert_eq!(json, r#"{"company":"Acme","role":"Intern"}"#);
    }
}
