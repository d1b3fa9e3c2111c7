//! Object store backends.
//!
//! The registries only ever talk to the [`ObjectStore`] trait. Remote blob
//! services plug in by implementing it; retries, timeouts and durability
//! are the implementation's business.

mod fs;
mod memory;

pub use fs::FsObjectStore;
pub use memory::MemoryObjectStore;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreError;
use crate::keys::StorageKey;

/// Key/value blob store addressed by [`StorageKey`].
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `body` under `key`, replacing any previous object.
    async fn put(&self, key: &StorageKey, body: Bytes) -> Result<(), StoreError>;

    /// Fetch the object stored under `key`.
    ///
    /// Returns [`StoreError::NotFound`] when nothing is stored.
    async fn get(&self, key: &StorageKey) -> Result<Bytes, StoreError>;

    /// Short backend name used in log fields
    fn backend_name(&self) -> &'static str;
}
