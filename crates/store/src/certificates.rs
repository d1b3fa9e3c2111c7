//! Certificate registry.
//!
//! A certificate is identified by its canonical [`DomainSet`]. Its key and
//! PEM artifacts are written once per domain, so any domain of the set can
//! find them. Reads fetch every domain's copy and reconcile them: all copies
//! must be byte-identical, otherwise the result is [`Reconciled::Diverged`]
//! and the caller is expected to rewrite a single shared value everywhere.

use std::sync::Arc;

use acme_store_common::{AccountEmail, DomainName, DomainSet};
use bytes::Bytes;
use tracing::{debug, error, info, warn};

use crate::error::{FanOutError, RegistryError};
use crate::fanout::{get_all, put_all};
use crate::keys::{CertArtifact, StorageKey};
use crate::lookup::{FanOutReport, Lookup, Reconciled};
use crate::model::{CertificateBundle, KeyPair};
use crate::object_store::ObjectStore;

/// Stores certificate keys and bundles by domain set
#[derive(Clone)]
pub struct CertificateRegistry {
    store: Arc<dyn ObjectStore>,
    /// Log every operation at debug level
    debug: bool,
}

impl CertificateRegistry {
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

    // =========================================================================
    // Certificate Keys
    // =========================================================================

    /// Write the certificate key to every domain of the set
    ///
    /// # Errors
    ///
    /// Returns a [`FanOutError`] listing the domains whose write failed.
    pub async fn set_keypair(
        &self,
        domains: &DomainSet,
        keypair: KeyPair,
    ) -> Result<KeyPair, FanOutError> {
        if self.debug {
            debug!(domains = %domains, "Setting cert keypair");
        }

        let body = Bytes::from(keypair.private_key_jwk.to_string());

        let writes = domains
            .iter()
            .map(|domain| (StorageKey::domain_key(domain), body.clone()))
            .collect();

        self.finish_writes("set_cert_keypair", domains, put_all(self.store.as_ref(), writes).await)?;
        Ok(keypair)
    }

    /// Look up the certificate key shared by the domain set
    ///
    /// A missing key on any domain makes the whole lookup absent.
    pub async fn check_keypair(&self, domains: &DomainSet) -> Lookup<Reconciled<KeyPair>> {
        if self.debug {
            debug!(domains = %domains, "Checking cert keypair");
        }

        let names: Vec<&DomainName> = domains.iter().collect();
        let keys: Vec<StorageKey> = domains.iter().map(StorageKey::domain_key).collect();

        let lookup = get_all(self.store.as_ref(), &keys)
            .await
            .and_then(|bodies| match first_divergence(&bodies) {
                None => {
                    let jwk = serde_json::from_slice(&bodies[0])?;
                    Ok(Reconciled::Shared(KeyPair::new(jwk)))
                }
                Some(index) => {
                    warn!(
                        domains = %domains,
                        first = %names[index - 1],
                        second = %names[index],
                        "Cert keypair differs between domains"
                    );
                    Ok(Reconciled::Diverged)
                }
            });

        match &lookup {
            Lookup::Failed(e) => {
                error!(domains = %domains, error = %e, "Failed to check cert keypair")
            }
            Lookup::Found(_) if self.debug => debug!(domains = %domains, "Cert keypair found"),
            Lookup::Absent if self.debug => debug!(domains = %domains, "Cert keypair not found"),
            _ => {}
        }
        lookup
    }

    // =========================================================================
    // Certificate Bundles
    // =========================================================================

    /// Look up the certificate bundle of the domain set
    ///
    /// Every domain's cert/privkey/chain triple is fetched and all of them
    /// must agree. `account` only annotates the log.
    pub async fn check(
        &self,
        domains: &DomainSet,
        account: Option<&AccountEmail>,
    ) -> Lookup<Reconciled<CertificateBundle>> {
        if self.debug {
            debug!(
                domains = %domains,
                account = account.map(AccountEmail::as_str),
                "Looking for cert"
            );
        }

        let names: Vec<&DomainName> = domains.iter().collect();
        let keys: Vec<StorageKey> = domains
            .iter()
            .flat_map(|domain| {
                CertArtifact::ALL
                    .into_iter()
                    .map(move |artifact| StorageKey::cert_artifact(domain, artifact))
            })
            .collect();

        let lookup = get_all(self.store.as_ref(), &keys)
            .await
            .and_then(|bodies| {
                let triples: Vec<&[Bytes]> = bodies.chunks(CertArtifact::ALL.len()).collect();
                match first_divergence(&triples) {
                    None => decode_bundle(&keys, &bodies).map(Reconciled::Shared),
                    Some(index) => {
                        warn!(
                            domains = %domains,
                            first = %names[index - 1],
                            second = %names[index],
                            "Cert bundle differs between domains"
                        );
                        Ok(Reconciled::Diverged)
                    }
                }
            });

        match &lookup {
            Lookup::Failed(e) => error!(domains = %domains, error = %e, "Failed to check cert"),
            Lookup::Found(_) if self.debug => debug!(domains = %domains, "Cert found"),
            Lookup::Absent if self.debug => debug!(domains = %domains, "Cert not found"),
            _ => {}
        }
        lookup
    }

    /// Write the certificate bundle to every domain of the set
    ///
    /// Renewal overwrites the previous bundle wholesale.
    ///
    /// # Errors
    ///
    /// Returns a [`FanOutError`] listing the artifacts whose write failed.
    pub async fn set(
        &self,
        domains: &DomainSet,
        bundle: CertificateBundle,
    ) -> Result<CertificateBundle, FanOutError> {
        if self.debug {
            debug!(domains = %domains, "Setting cert");
        }

        let bodies = [
            Bytes::from(bundle.cert.clone()),
            Bytes::from(bundle.privkey.clone()),
            Bytes::from(bundle.chain.clone()),
        ];

        let writes = domains
            .iter()
            .flat_map(|domain| {
                CertArtifact::ALL
                    .into_iter()
                    .zip(bodies.iter().cloned())
                    .map(move |(artifact, body)| (StorageKey::cert_artifact(domain, artifact), body))
            })
            .collect();

        self.finish_writes("set_cert", domains, put_all(self.store.as_ref(), writes).await)?;

        info!(domains = %domains, "Saved certificate to storage");
        Ok(bundle)
    }

    fn finish_writes(
        &self,
        operation: &'static str,
        domains: &DomainSet,
        report: FanOutReport,
    ) -> Result<(), FanOutError> {
        if report.is_complete() {
            if self.debug {
                debug!(operation, domains = %domains, written = report.succeeded.len(), "Fan-out write complete");
            }
            return Ok(());
        }

        for (key, e) in &report.failed {
            error!(
                operation,
                domains = %domains,
                key = %key,
                backend = self.store.backend_name(),
                error = %e,
                "Failed to write object"
            );
        }
        Err(FanOutError { operation, report })
    }
}

impl std::fmt::Debug for CertificateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateRegistry")
            .field("backend", &self.store.backend_name())
            .field("debug", &self.debug)
            .finish()
    }
}

/// Index of the first entry that differs from its predecessor
fn first_divergence<T: PartialEq>(items: &[T]) -> Option<usize> {
    items
        .windows(2)
        .position(|pair| pair[0] != pair[1])
        .map(|i| i + 1)
}

/// Build a bundle from the first domain's cert/privkey/chain bodies
fn decode_bundle(keys: &[StorageKey], bodies: &[Bytes]) -> Result<CertificateBundle, RegistryError> {
    let text = |i: usize| {
        String::from_utf8(bodies[i].to_vec()).map_err(|source| RegistryError::InvalidUtf8 {
            key: keys[i].clone(),
            source,
        })
    };

    Ok(CertificateBundle {
        cert: text(0)?,
        privkey: text(1)?,
        chain: text(2)?,
    })
}
