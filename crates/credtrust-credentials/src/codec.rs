//! Compact signed-token codec.
//!
//! A token is `b64(header) "." b64(payload) "." b64(signature)` with unpadded
//! base64url segments, the same layout as a compact JWS. Header and payload
//! are JSON with keys in sorted order (struct fields are declared
//! alphabetically and claims are a `BTreeMap`), so one logical credential
//! always yields one byte sequence. The signature covers the ASCII
//! `b64(header) "." b64(payload)` exactly as it appears in the token.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use credtrust_core::{Claims, Did};
use credtrust_crypto::{KeyAlgorithm, Signer};

use crate::error::TrustError;

/// Media type carried in the `typ` header.
pub const TOKEN_TYPE: &str = "vc+jwt";

/// Token header. Fields are declared in sorted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    /// Signature algorithm (`EdDSA`).
    pub alg: String,
    /// Identifier of the issuer whose key signed the token.
    pub kid: String,
    /// Token media type.
    pub typ: String,
}

impl TokenHeader {
    pub fn for_signer(signer: &Signer<'_>) -> Self {
        Self {
            alg: signer.algorithm().jws_name().to_string(),
            kid: signer.identifier().to_string(),
            typ: TOKEN_TYPE.to_string(),
        }
    }
}

/// Header as it may arrive from an untrusted token; every field optional so
/// the algorithm can be judged before anything else is required.
#[derive(Deserialize)]
struct RawHeader {
    alg: Option<String>,
    kid: Option<String>,
    typ: Option<String>,
}

/// Signed credential payload. Fields are declared in sorted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialPayload {
    /// Issuance time, seconds since the Unix epoch.
    pub iat: i64,
    /// Issuer identifier.
    pub iss: String,
    /// Credential id.
    pub jti: String,
    /// Holder identifier.
    pub sub: String,
    pub vc: CredentialBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialBody {
    #[serde(rename = "credentialSubject")]
    pub credential_subject: Claims,
    #[serde(rename = "type")]
    pub credential_type: Vec<String>,
}

impl CredentialPayload {
    pub fn new(
        credential_id: &str,
        issuer: &Did,
        holder: &str,
        credential_type: Vec<String>,
        claims: Claims,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            iat: issued_at.timestamp(),
            iss: issuer.to_string(),
            jti: credential_id.to_string(),
            sub: holder.to_string(),
            vc: CredentialBody {
                credential_subject: claims,
                credential_type,
            },
        }
    }

    pub fn issued_at(&self) -> Result<DateTime<Utc>, TrustError> {
        DateTime::from_timestamp(self.iat, 0)
            .ok_or_else(|| TrustError::MalformedToken(format!("iat out of range: {}", self.iat)))
    }

    pub fn issuer(&self) -> Result<Did, TrustError> {
        Did::new(self.iss.as_str())
            .map_err(|e| TrustError::MalformedToken(format!("invalid iss: {}", e)))
    }
}

fn b64(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

fn b64_decode(segment: &str, what: &str) -> Result<Vec<u8>, TrustError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| TrustError::MalformedToken(format!("{} is not base64url: {}", what, e)))
}

fn to_canonical_json<T: Serialize>(value: &T) -> Result<Vec<u8>, TrustError> {
    serde_json::to_vec(value).map_err(|e| TrustError::Serialization(e.to_string()))
}

/// The exact ASCII bytes a signature covers.
pub fn signing_input(
    header: &TokenHeader,
    payload: &CredentialPayload,
) -> Result<String, TrustError> {
    let header_b64 = b64(&to_canonical_json(header)?);
    let payload_b64 = b64(&to_canonical_json(payload)?);
    Ok(format!("{}.{}", header_b64, payload_b64))
}

/// Append a base64url signature segment to a signing input.
pub fn assemble(signing_input: &str, signature: &[u8]) -> String {
    format!("{}.{}", signing_input, b64(signature))
}

/// Serialize and sign a payload into a compact token.
pub fn encode(payload: &CredentialPayload, signer: &Signer<'_>) -> Result<String, TrustError> {
    if payload.iss != signer.identifier().uri() {
        return Err(TrustError::MalformedToken(format!(
            "payload issuer {} does not match signing issuer {}",
            payload.iss,
            signer.identifier()
        )));
    }
    let header = TokenHeader::for_signer(signer);
    let input = signing_input(&header, payload)?;
    let signature = signer.sign(input.as_bytes());
    Ok(assemble(&input, &signature.to_bytes()))
}

/// A structurally valid token whose payload has not been interpreted yet.
///
/// Parsing checks the segment layout, the header, and the algorithm. The
/// payload and signature segments stay as text until asked for, so callers
/// check the signature over the exact signed bytes before trusting any
/// payload content. The `kid` is kept verbatim; resolving it to an issuer
/// is the caller's job.
#[derive(Debug, Clone)]
pub struct CompactToken {
    header: TokenHeader,
    algorithm: KeyAlgorithm,
    payload_segment: String,
    signature_segment: String,
    signing_input: Vec<u8>,
}

impl CompactToken {
    pub fn parse(token: &str) -> Result<Self, TrustError> {
        let token = token.trim();
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 {
            return Err(TrustError::MalformedToken(format!(
                "expected 3 segments, got {}",
                segments.len()
            )));
        }
        let (header_b64, payload_b64, signature_b64) = (segments[0], segments[1], segments[2]);

        let header_json = b64_decode(header_b64, "header")?;
        let raw: RawHeader = serde_json::from_slice(&header_json)
            .map_err(|e| TrustError::MalformedToken(format!("invalid header JSON: {}", e)))?;

        let alg = raw
            .alg
            .ok_or_else(|| TrustError::MalformedToken("header is missing alg".into()))?;
        let algorithm = KeyAlgorithm::from_jws_name(&alg)
            .ok_or_else(|| TrustError::UnsupportedAlgorithm(alg.clone()))?;

        let kid = raw
            .kid
            .filter(|kid| !kid.trim().is_empty())
            .ok_or_else(|| TrustError::MalformedToken("header is missing kid".into()))?;

        let typ = raw.typ.unwrap_or_else(|| TOKEN_TYPE.to_string());
        if typ != TOKEN_TYPE {
            return Err(TrustError::MalformedToken(format!(
                "unexpected token type: {}",
                typ
            )));
        }

        if payload_b64.is_empty() {
            return Err(TrustError::MalformedToken("payload is empty".into()));
        }
        if signature_b64.is_empty() {
            return Err(TrustError::MalformedToken("signature is missing".into()));
        }

        let signing_input = format!("{}.{}", header_b64, payload_b64).into_bytes();

        Ok(Self {
            header: TokenHeader { alg, kid, typ },
            algorithm,
            payload_segment: payload_b64.to_string(),
            signature_segment: signature_b64.to_string(),
            signing_input,
        })
    }

    pub fn header(&self) -> &TokenHeader {
        &self.header
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// Issuer identifier named in the header, as written.
    pub fn issuer(&self) -> &str {
        &self.header.kid
    }

    pub fn signing_input(&self) -> &[u8] {
        &self.signing_input
    }

    /// Decoded signature bytes.
    pub fn signature(&self) -> Result<Vec<u8>, TrustError> {
        b64_decode(&self.signature_segment, "signature")
    }

    /// Interpret the payload. Fails if it is not base64url JSON, lacks
    /// required fields, or names a different issuer than the header.
    pub fn payload(&self) -> Result<CredentialPayload, TrustError> {
        let bytes = b64_decode(&self.payload_segment, "payload")?;
        let payload: CredentialPayload = serde_json::from_slice(&bytes)
            .map_err(|e| TrustError::MalformedToken(format!("invalid payload JSON: {}", e)))?;
        if payload.iss != self.header.kid {
            return Err(TrustError::MalformedToken(format!(
                "payload issuer {} does not match header kid {}",
                payload.iss, self.header.kid
            )));
        }
        Ok(payload)
    }
}

/// Fully decoded token.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedToken {
    pub header: TokenHeader,
    pub payload: CredentialPayload,
    /// The bytes the signature was computed over.
    pub signing_input: Vec<u8>,
    pub signature: Vec<u8>,
}

/// Parse a token into its fields, signed bytes, and signature.
pub fn decode(token: &str) -> Result<DecodedToken, TrustError> {
    let compact = CompactToken::parse(token)?;
    let payload = compact.payload()?;
    let signature = compact.signature()?;
    Ok(DecodedToken {
        header: compact.header,
        payload,
        signing_input: compact.signing_input,
        signature,
    })
}
