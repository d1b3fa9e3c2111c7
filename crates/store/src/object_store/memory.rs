//! In-memory object store.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::trace;

use crate::error::StoreError;
use crate::keys::StorageKey;
use crate::object_store::ObjectStore;

/// Object store kept in a concurrent map.
///
/// Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<DashMap<String, Bytes>>,
}

impl MemoryObjectStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// All stored keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &StorageKey, body: Bytes) -> Result<(), StoreError> {
        trace!(key = %key, size = body.len(), "Storing object in memory");
        self.objects.insert(key.as_str().to_string(), body);
        Ok(())
    }

    async fn get(&self, key: &StorageKey) -> Result<Bytes, StoreError> {
        self.objects
            .get(key.as_str())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound { key: key.clone() })
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acme_store_common::DomainName;

    fn key(domain: &str) -> StorageKey {
        StorageKey::domain_key(&DomainName::new(domain).unwrap())
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let store = MemoryObjectStore::new();
        store.put(&key("a.com"), Bytes::from_static(b"{}")).await.unwrap();

        let body = store.get(&key("a.com")).await.unwrap();
        assert_eq!(&body[..], b"{}");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = MemoryObjectStore::new();
        let err = store.get(&key("missing.com")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = MemoryObjectStore::new();
        store.put(&key("a.com"), Bytes::from_static(b"one")).await.unwrap();
        store.put(&key("a.com"), Bytes::from_static(b"two")).await.unwrap();

        assert_eq!(&store.get(&key("a.com")).await.unwrap()[..], b"two");
        assert_eq!(store.keys(), vec!["certs/a.com/domain_key.json".to_string()]);
    }

    #[tokio::test]
    async fn test_clones_share_contents() {
        let store = MemoryObjectStore::new();
        let clone = store.clone();
        store.put(&key("a.com"), Bytes::from_static(b"x")).await.unwrap();
        assert!(clone.get(&key("a.com")).await.is_ok());
    }
}
