//! Error types for ACME storage.

use std::string::FromUtf8Error;

use thiserror::Error;

use crate::keys::StorageKey;
use crate::lookup::FanOutReport;

/// Errors reported by an [`ObjectStore`](crate::ObjectStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No object is stored under the key. Recoverable: maps to "absent".
    #[error("object not found: {key}")]
    NotFound { key: StorageKey },

    /// Local I/O failure in a filesystem backend
    #[error("I/O error on {key}: {source}")]
    Io {
        key: StorageKey,
        #[source]
        source: std::io::Error,
    },

    /// The backend could not serve the request (auth, throttling, network)
    #[error("object store unavailable for {key}: {reason}")]
    Unavailable { key: StorageKey, reason: String },

    /// The backend could not be set up
    #[error("object store initialization failed: {0}")]
    Init(String),
}

impl StoreError {
    /// Whether this is the recoverable not-found outcome
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Errors surfaced by the account and certificate registries.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Object store failure other than not-found
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Key material could not be encoded or decoded as JSON
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A PEM artifact was not valid UTF-8
    #[error("invalid UTF-8 in {key}: {source}")]
    InvalidUtf8 {
        key: StorageKey,
        #[source]
        source: FromUtf8Error,
    },
}

/// A multi-key write where at least one key failed.
///
/// The report lists every key that was written and every key that failed,
/// so callers can retry only the failed subset.
#[derive(Debug, Error)]
#[error("{operation} failed for {} of {} keys", .report.failed.len(), .report.total())]
pub struct FanOutError {
    /// Name of the registry operation
    pub operation: &'static str,
    /// Per-key outcomes
    pub report: FanOutReport,
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration parsed but is invalid
    #[error("invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
}
