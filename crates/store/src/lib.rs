//! ACME Store
//!
//! Object-store persistence for an ACME client: account key pairs keyed by
//! email, certificate keys and bundles keyed by domain set.
//!
//! # Architecture
//!
//! - [`ObjectStore`] - key/value blob store; [`MemoryObjectStore`] and
//!   [`FsObjectStore`] ship with the crate, remote stores implement the trait
//! - [`AccountRegistry`] - account key pairs at `accounts/{email}/private_key.json`
//! - [`CertificateRegistry`] - certificate keys and PEM bundles under
//!   `certs/{domain}/`, written to every domain of the certificate and
//!   reconciled on read
//! - [`AcmeStore`] - ties both registries to one store and configuration
//!
//! # Example
//!
//! ```ignore
//! use acme_store::{AcmeStore, StoreConfig, CertificateBundle};
//! use acme_store_common::DomainSet;
//!
//! let store = AcmeStore::from_config(StoreConfig::memory("certs")).await?;
//! let domains = DomainSet::new(["example.com", "www.example.com"])?;
//!
//! store.certificates().set(&domains, bundle).await?;
//! let lookup = store.certificates().check(&domains, None).await;
//! ```

pub mod accounts;
pub mod certificates;
pub mod config;
pub mod error;
mod fanout;
pub mod keys;
pub mod lookup;
pub mod model;
pub mod object_store;

use std::sync::Arc;

use tracing::info;

pub use accounts::AccountRegistry;
pub use certificates::CertificateRegistry;
pub use config::{BackendConfig, StoreConfig};
pub use error::{ConfigError, FanOutError, RegistryError, StoreError};
pub use keys::{CertArtifact, StorageKey};
pub use lookup::{FanOutReport, Lookup, Reconciled};
pub use model::{Account, CertificateBundle, KeyPair, Registration};
pub use object_store::{FsObjectStore, MemoryObjectStore, ObjectStore};

/// Account and certificate registries over one object store
#[derive(Debug, Clone)]
pub struct AcmeStore {
    config: StoreConfig,
    accounts: AccountRegistry,
    certificates: CertificateRegistry,
}

impl AcmeStore {
    /// Build the registries over an existing object store
    pub fn new(config: StoreConfig, store: Arc<dyn ObjectStore>) -> Self {
        info!(
            bucket = %config.bucket,
            backend = store.backend_name(),
            "Initialized ACME store"
        );

        Self {
            accounts: AccountRegistry::new(Arc::clone(&store)).with_debug(config.debug),
            certificates: CertificateRegistry::new(store).with_debug(config.debug),
            config,
        }
    }

    /// Build the registries over the backend named in the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be initialized.
    pub async fn from_config(config: StoreConfig) -> Result<Self, StoreError> {
        let store: Arc<dyn ObjectStore> = match &config.backend {
            BackendConfig::Memory => Arc::new(MemoryObjectStore::new()),
            BackendConfig::Filesystem { root } => {
                Arc::new(FsObjectStore::open(root, &config.bucket).await?)
            }
        };
        Ok(Self::new(config, store))
    }

    /// Effective configuration
    pub fn options(&self) -> &StoreConfig {
        &self.config
    }

    pub fn accounts(&self) -> &AccountRegistry {
        &self.accounts
    }

    pub fn certificates(&self) -> &CertificateRegistry {
        &self.certificates
    }
}
