//! CredTrust Core: Fundamental types, errors, and policy for the
//! CredTrust credential trust service.

pub mod config;
pub mod credential_state;
pub mod error;
pub mod types;

pub use config::TrustPolicy;
pub use credential_state::{CredentialEvent, CredentialState, CredentialStateMachine};
pub use error::CoreError;
pub use types::{normalize_credential_types, Claims, Did, DID_PREFIX, VERIFIABLE_CREDENTIAL};
