//! Configuration for the ACME store.
//!
//! ```toml
//! bucket = "acme-certs"
//! debug = false
//!
//! [backend]
//! type = "filesystem"
//! root = "/var/lib/acme-store"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::{Validate, ValidationError};

use crate::error::ConfigError;

/// Environment variable overriding the configured bucket
pub const BUCKET_ENV_VAR: &str = "ACME_STORE_BUCKET";

/// Root configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StoreConfig {
    /// Bucket (store target) holding accounts and certificates
    #[validate(length(min = 1, max = 255), custom(function = "validate_bucket"))]
    pub bucket: String,

    /// Log every registry operation (lookups, hits, misses, writes) at
    /// debug level. Failures are logged regardless.
    #[serde(default)]
    pub debug: bool,

    /// Object store backend
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Object store backend selection
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendConfig {
    /// In-process map; contents are lost on exit
    #[default]
    Memory,
    /// One directory per bucket under `root`
    Filesystem {
        root: PathBuf,
    },
}

fn validate_bucket(bucket: &str) -> Result<(), ValidationError> {
    let valid = bucket
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && bucket != "."
        && bucket != "..";

    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("bucket_name"))
    }
}

impl StoreConfig {
    /// Configuration for an in-memory bucket
    pub fn memory(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            debug: false,
            backend: BackendConfig::Memory,
        }
    }

    /// Configuration for a filesystem bucket under `root`
    pub fn filesystem(bucket: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            bucket: bucket.into(),
            debug: false,
            backend: BackendConfig::Filesystem { root: root.into() },
        }
    }

    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: StoreConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    ///
    /// The bucket can be overridden with `ACME_STORE_BUCKET`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config: StoreConfig = toml::from_str(&content)?;

        if let Ok(bucket) = std::env::var(BUCKET_ENV_VAR) {
            debug!(bucket = %bucket, "Bucket overridden from environment");
            config.bucket = bucket;
        }

        config.validate()?;
        debug!(path = %path.display(), bucket = %config.bucket, "Loaded store configuration");
        Ok(config)
    }
}
