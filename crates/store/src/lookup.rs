//! Outcome types returned by the registries.

use crate::error::{RegistryError, StoreError};
use crate::keys::StorageKey;
use crate::model::KeyPair;

/// Result of a registry read.
///
/// Keeps "nothing stored" and "could not find out" apart so the caller can
/// decide whether to issue, retry or abort.
#[derive(Debug)]
#[must_use]
pub enum Lookup<T> {
    /// The value is stored
    Found(T),
    /// Nothing is stored (every miss is a miss, even a partial one)
    Absent,
    /// The store could not confirm either way
    Failed(RegistryError),
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Lookup::Absent)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Lookup::Failed(_))
    }

    /// The found value, discarding the absent/failed distinction
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::Absent | Lookup::Failed(_) => None,
        }
    }

    /// Convert into a `Result`, with absence as `Ok(None)`
    pub fn into_result(self) -> Result<Option<T>, RegistryError> {
        match self {
            Lookup::Found(value) => Ok(Some(value)),
            Lookup::Absent => Ok(None),
            Lookup::Failed(e) => Err(e),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(value) => Lookup::Found(f(value)),
            Lookup::Absent => Lookup::Absent,
            Lookup::Failed(e) => Lookup::Failed(e),
        }
    }

    /// Chain a fallible conversion of the found value
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Result<U, RegistryError>) -> Lookup<U> {
        match self {
            Lookup::Found(value) => match f(value) {
                Ok(mapped) => Lookup::Found(mapped),
                Err(e) => Lookup::Failed(e),
            },
            Lookup::Absent => Lookup::Absent,
            Lookup::Failed(e) => Lookup::Failed(e),
        }
    }
}

/// Outcome of comparing what each domain of a certificate has stored
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciled<T> {
    /// Every domain holds byte-identical content
    Shared(T),
    /// At least two domains disagree; the caller must rewrite all of them
    Diverged,
}

impl<T> Reconciled<T> {
    pub fn is_diverged(&self) -> bool {
        matches!(self, Reconciled::Diverged)
    }

    /// The shared value, if the domains agree
    pub fn shared(self) -> Option<T> {
        match self {
            Reconciled::Shared(value) => Some(value),
            Reconciled::Diverged => None,
        }
    }
}

impl Reconciled<KeyPair> {
    /// Flatten into a key pair, using the `null` material sentinel for divergence
    pub fn into_keypair(self) -> KeyPair {
        match self {
            Reconciled::Shared(keypair) => keypair,
            Reconciled::Diverged => KeyPair::diverged(),
        }
    }
}

/// Per-key outcome of a multi-key write
#[derive(Debug, Default)]
pub struct FanOutReport {
    /// Keys written successfully
    pub succeeded: Vec<StorageKey>,
    /// Keys whose write failed, with the cause
    pub failed: Vec<(StorageKey, StoreError)>,
}

impl FanOutReport {
    /// Total number of keys attempted
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Whether every write succeeded
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Keys that need to be written again
    pub fn failed_keys(&self) -> impl Iterator<Item = &StorageKey> {
        self.failed.iter().map(|(key, _)| key)
    }
}
