use serde::{Deserialize, Serialize};

/// Issuance policy applied by the trust service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustPolicy {
    /// Reject registration of a second issuer with the same display name.
    #[serde(default)]
    pub unique_issuer_names: bool,
    /// Maximum length of an issuer display name, in characters.
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
}

fn default_max_name_length() -> usize {
    256
}

impl Default for TrustPolicy {
    fn default() -> Self {
        Self {
            unique_issuer_names: false,
            max_name_length: default_max_name_length(),
        }
    }
}
