//! Node configuration loading and management.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use credtrust_core::TrustPolicy;

/// Full configuration for the CredTrust node.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CredTrustConfig {
    /// API server settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Issuance policy.
    #[serde(default)]
    pub policy: TrustPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API listen address.
    #[serde(default = "default_api_addr")]
    pub listen_addr: String,
    /// API port.
    #[serde(default = "default_api_port")]
    pub port: u16,
}

/// Which store implementation backs the trust service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Volatile; everything is lost on restart.
    Memory,
    #[default]
    Rocksdb,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Rocksdb => write!(f, "rocksdb"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Path to the data directory (RocksDB backend only).
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_api_addr() -> String {
    "127.0.0.1".into()
}
fn default_api_port() -> u16 {
    9101
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_api_addr(),
            port: default_api_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: default_data_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl CredTrustConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: CredTrustConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// `host:port` the API server binds to.
    pub fn api_addr(&self) -> String {
        format!("{}:{}", self.api.listen_addr, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CredTrustConfig::default();
        assert_eq!(config.api.port, 9101);
        assert_eq!(config.storage.backend, StorageBackend::Rocksdb);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.is_json());
        assert!(!config.policy.unique_issuer_names);
    }

    #[test]
    fn test_api_addr() {
        let config = CredTrustConfig::default();
        assert_eq!(config.api_addr(), "127.0.0.1:9101");
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let mut config = CredTrustConfig::default();
        config.storage.backend = StorageBackend::Memory;
        config.policy.unique_issuer_names = true;
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let decoded: CredTrustConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(decoded.api.port, config.api.port);
        assert_eq!(decoded.storage.backend, StorageBackend::Memory);
        assert!(decoded.policy.unique_issuer_names);
    }

    #[test]
    fn test_config_load_nonexistent_uses_defaults() {
        let config = CredTrustConfig::load(Path::new("/nonexistent/credtrust.toml")).unwrap();
        assert_eq!(config.api.port, 9101);
    }

    #[test]
    fn test_config_from_toml_partial() {
        let toml_str = r#"
[api]
port = 8001

[storage]
backend = "memory"

[logging]
format = "json"

[policy]
unique_issuer_names = true
"#;
        let config: CredTrustConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.api.port, 8001);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert!(config.logging.is_json());
        assert!(config.policy.unique_issuer_names);
        // Defaults for unspecified
        assert_eq!(config.api.listen_addr, "127.0.0.1");
        assert_eq!(config.policy.max_name_length, 256);
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let result: Result<CredTrustConfig, _> = toml::from_str("[storage]\nbackend = \"s3\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("credtrust-config-{}", rand::random::<u64>()));
        let path = dir.join("credtrust.toml");
        let mut config = CredTrustConfig::default();
        config.api.port = 9999;
        config.save(&path).unwrap();
        let loaded = CredTrustConfig::load(&path).unwrap();
        assert_eq!(loaded.api.port, 9999);
        std::fs::remove_dir_all(&dir).ok();
    }
}
