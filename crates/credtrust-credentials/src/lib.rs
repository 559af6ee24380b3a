//! CredTrust Credentials: token codec, issuer, verifier, revocation
//! registry, and the trust service that orchestrates them.

pub mod codec;
pub mod error;
pub mod issuer;
pub mod model;
pub mod registry;
pub mod service;
pub mod store;
pub mod verifier;

pub use codec::{
    decode, encode, CompactToken, CredentialBody, CredentialPayload, DecodedToken, TokenHeader,
};
pub use error::TrustError;
pub use issuer::CredentialIssuer;
pub use model::{Credential, CredentialRecord, Issuer, IssuerRecord, RevocationStatus};
pub use registry::{RevocationRegistry, RevokeOutcome};
pub use service::{IssueRequest, RevocationReceipt, TrustService};
pub use store::{
    CasOutcome, CredentialStore, InMemoryCredentialStore, InMemoryIssuerStore, IssuerStore,
    StoreError,
};
pub use verifier::{
    CredentialVerifier, FailureReason, SignatureVerdict, VerificationCheck, VerificationResult,
};
