use serde::{Deserialize, Serialize};
use std::fmt;

use credtrust_core::Did;
use credtrust_crypto::{CryptoError, Verifier};

use crate::codec::{CompactToken, CredentialPayload};
use crate::error::TrustError;
use crate::model::{Issuer, RevocationStatus};

/// Why a well-formed token was judged invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    /// The signature does not match the issuer's key on record.
    InvalidSignature,
    /// The credential has been revoked.
    Revoked,
    /// Correctly signed, but no credential with this id was ever recorded.
    UnknownCredential,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSignature => write!(f, "InvalidSignature"),
            Self::Revoked => write!(f, "Revoked"),
            Self::UnknownCredential => write!(f, "UnknownCredential"),
        }
    }
}

/// Result of credential verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    /// Whether the credential is valid.
    pub valid: bool,
    /// First failing reason, absent when valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
    /// Individual check results.
    pub checks: Vec<VerificationCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,
    pub issuer: Did,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
}

impl VerificationResult {
    pub fn check(&self, name: &str) -> Option<&VerificationCheck> {
        self.checks.iter().find(|c| c.name == name)
    }
}

/// An individual verification check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationCheck {
    /// Name of the check.
    pub name: String,
    /// Whether the check passed.
    pub passed: bool,
    /// Optional detail message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl VerificationCheck {
    fn new(name: &str, passed: bool, detail: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            passed,
            detail,
        }
    }
}

pub const SIGNATURE_CHECK: &str = "signature_valid";
pub const STATUS_CHECK: &str = "not_revoked";

/// Outcome of the signature phase.
#[derive(Debug, Clone, PartialEq)]
pub enum SignatureVerdict {
    /// Signature verified; the payload can be trusted.
    Valid(CredentialPayload),
    Invalid,
}

/// Verifies tokens against one issuer's key on record.
pub struct CredentialVerifier {
    verifier: Verifier,
}

impl CredentialVerifier {
    /// Bind to an issuer. Refuses a key that does not derive the issuer's
    /// identifier.
    pub fn bind(issuer: &Issuer) -> Result<Self, TrustError> {
        let verifier = Verifier::bind(&issuer.identifier, issuer.public_key.clone())?;
        Ok(Self { verifier })
    }

    pub fn issuer(&self) -> &Did {
        self.verifier.identifier()
    }

    /// Check the signature over the token's signing input. The payload is
    /// only interpreted once the signature holds.
    pub fn check_signature(&self, token: &CompactToken) -> Result<SignatureVerdict, TrustError> {
        if token.issuer() != self.issuer().uri() {
            return Err(TrustError::MalformedToken(format!(
                "token names issuer {}, verifier is bound to {}",
                token.issuer(),
                self.issuer()
            )));
        }
        if token.algorithm() != self.verifier.algorithm() {
            return Err(TrustError::UnsupportedAlgorithm(
                token.header().alg.clone(),
            ));
        }

        // An undecodable signature segment cannot match any key.
        let Ok(signature) = token.signature() else {
            tracing::warn!(issuer = %self.issuer(), "token signature segment is not base64url");
            return Ok(SignatureVerdict::Invalid);
        };

        let valid = self
            .verifier
            .verify(token.signing_input(), &signature)
            .map_err(|e| match e {
                CryptoError::VerificationError(detail) => TrustError::MalformedToken(detail),
                other => other.into(),
            })?;

        if !valid {
            tracing::warn!(issuer = %self.issuer(), "token signature does not match issuer key");
            return Ok(SignatureVerdict::Invalid);
        }
        Ok(SignatureVerdict::Valid(token.payload()?))
    }

    /// Verdict for a token whose signature failed. Status is not looked up
    /// because nothing in the payload can be trusted.
    pub fn rejected(&self) -> VerificationResult {
        VerificationResult {
            valid: false,
            reason: Some(FailureReason::InvalidSignature),
            checks: vec![
                VerificationCheck::new(
                    SIGNATURE_CHECK,
                    false,
                    Some("signature does not match the issuer's key".into()),
                ),
                VerificationCheck::new(
                    STATUS_CHECK,
                    false,
                    Some("not evaluated: payload is untrusted".into()),
                ),
            ],
            credential_id: None,
            issuer: self.issuer().clone(),
            holder: None,
        }
    }

    /// Verdict for a correctly signed token given its revocation status.
    pub fn conclude(
        &self,
        payload: &CredentialPayload,
        status: RevocationStatus,
    ) -> VerificationResult {
        let (passed, reason, detail) = match status {
            RevocationStatus::Active => (true, None, None),
            RevocationStatus::Revoked => (
                false,
                Some(FailureReason::Revoked),
                Some("credential has been revoked".to_string()),
            ),
            RevocationStatus::Unknown => (
                false,
                Some(FailureReason::UnknownCredential),
                Some(format!("credential {} was never recorded", payload.jti)),
            ),
        };

        VerificationResult {
            valid: passed,
            reason,
            checks: vec![
                VerificationCheck::new(SIGNATURE_CHECK, true, None),
                VerificationCheck::new(STATUS_CHECK, passed, detail),
            ],
            credential_id: Some(payload.jti.clone()),
            issuer: self.issuer().clone(),
            holder: Some(payload.sub.clone()),
        }
    }
}
