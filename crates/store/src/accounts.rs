//! Account registry.
//!
//! Maps an ACME account email to its key pair. Only the private key JWK is
//! persisted; the registration receipt lives in the returned [`Account`].

use std::sync::Arc;

use acme_store_common::AccountEmail;
use bytes::Bytes;
use tracing::{debug, error, trace};

use crate::error::RegistryError;
use crate::keys::StorageKey;
use crate::lookup::Lookup;
use crate::model::{Account, KeyPair, Registration};
use crate::object_store::ObjectStore;

/// Stores ACME account key pairs by email
#[derive(Clone)]
pub struct AccountRegistry {
    store: Arc<dyn ObjectStore>,
    /// Log every operation at debug level
    debug: bool,
}

impl AccountRegistry {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            debug: false,
        }
    }

    /// Enable per-operation debug logging
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Persist an account key pair
    ///
    /// Returns the key pair unchanged once it is stored.
    pub async fn set_keypair(
        &self,
        email: &AccountEmail,
        keypair: KeyPair,
    ) -> Result<KeyPair, RegistryError> {
        if self.debug {
            debug!(email = %email, "Setting account keypair");
        }

        self.write_keypair(email, &keypair).await?;
        Ok(keypair)
    }

    /// Look up an account key pair
    pub async fn check_keypair(&self, email: &AccountEmail) -> Lookup<KeyPair> {
        if self.debug {
            debug!(email = %email, "Checking account keypair");
        }

        let lookup = self.read_keypair(email).await;
        match &lookup {
            Lookup::Failed(e) => error!(email = %email, error = %e, "Failed to check account keypair"),
            Lookup::Found(_) if self.debug => debug!(email = %email, "Account keypair found"),
            Lookup::Absent if self.debug => debug!(email = %email, "Account keypair not found"),
            _ => {}
        }
        lookup
    }

    /// Look up an account
    ///
    /// The stored key pair is wrapped into an [`Account`] whose id is the
    /// email. The receipt is not persisted, so it is always `None` here.
    pub async fn check(&self, email: &AccountEmail) -> Lookup<Account> {
        if self.debug {
            debug!(email = %email, "Checking account");
        }

        let lookup = self
            .read_keypair(email)
            .await
            .map(|keypair| Account::new(email, keypair, None));
        match &lookup {
            Lookup::Failed(e) => error!(email = %email, error = %e, "Failed to check account"),
            Lookup::Found(_) if self.debug => debug!(email = %email, "Account found"),
            Lookup::Absent if self.debug => debug!(email = %email, "Account not found"),
            _ => {}
        }
        lookup
    }

    /// Register an account
    ///
    /// Persists the key pair and returns the account with the receipt
    /// attached.
    pub async fn set(
        &self,
        email: &AccountEmail,
        registration: Registration,
    ) -> Result<Account, RegistryError> {
        if self.debug {
            debug!(email = %email, "Setting account");
        }

        self.write_keypair(email, &registration.keypair).await?;
        Ok(Account::new(email, registration.keypair, registration.receipt))
    }

    async fn write_keypair(
        &self,
        email: &AccountEmail,
        keypair: &KeyPair,
    ) -> Result<(), RegistryError> {
        let key = StorageKey::account_key(email);
        let body = Bytes::from(keypair.private_key_jwk.to_string());

        self.store
            .put(&key, body)
            .await
            .inspect_err(|e| {
                error!(
                    email = %email,
                    key = %key,
                    backend = self.store.backend_name(),
                    error = %e,
                    "Failed to store account keypair"
                );
            })?;

        trace!(key = %key, "Stored account keypair");
        Ok(())
    }

    async fn read_keypair(&self, email: &AccountEmail) -> Lookup<KeyPair> {
        let key = StorageKey::account_key(email);
        match self.store.get(&key).await {
            Ok(body) => match serde_json::from_slice(&body) {
                Ok(jwk) => Lookup::Found(KeyPair::new(jwk)),
                Err(e) => Lookup::Failed(e.into()),
            },
            Err(e) if e.is_not_found() => {
                trace!(key = %key, "No stored account keypair");
                Lookup::Absent
            }
            Err(e) => Lookup::Failed(e.into()),
        }
    }
}

impl std::fmt::Debug for AccountRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountRegistry")
            .field("backend", &self.store.backend_name())
            .field("debug", &self.debug)
            .finish()
    }
}
