//! Directory-backed object store.
//!
//! Each bucket is a directory under the configured root; object keys map
//! one-to-one onto relative file paths:
//!
//! ```text
//! root/
//! └── bucket/
//!     ├── accounts/admin@example.com/private_key.json
//!     └── certs/example.com/{domain_key.json,cert.pem,privkey.pem,chain.pem}
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, trace};

use crate::error::StoreError;
use crate::keys::StorageKey;
use crate::object_store::ObjectStore;

/// Object store on the local filesystem
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    /// Bucket directory
    base_path: PathBuf,
}

impl FsObjectStore {
    /// Open (creating if needed) the bucket directory `root/bucket`
    ///
    /// The bucket directory gets restrictive permissions (0700 on Unix).
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket name is not a single path segment or
    /// the directory cannot be created.
    pub async fn open(root: &Path, bucket: &str) -> Result<Self, StoreError> {
        if bucket.is_empty() || bucket == "." || bucket == ".." || bucket.contains(['/', '\\']) {
            return Err(StoreError::Init(format!("invalid bucket name '{bucket}'")));
        }

        let base_path = root.join(bucket);
        fs::create_dir_all(&base_path)
            .await
            .map_err(|e| StoreError::Init(format!("{}: {e}", base_path.display())))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&base_path, std::fs::Permissions::from_mode(0o700))
                .await
                .map_err(|e| StoreError::Init(format!("{}: {e}", base_path.display())))?;
        }

        info!(
            storage_path = %base_path.display(),
            "Initialized filesystem object store"
        );

        Ok(Self { base_path })
    }

    /// Get the bucket directory
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn object_path(&self, key: &StorageKey) -> PathBuf {
        key.segments()
            .fold(self.base_path.clone(), |path, segment| path.join(segment))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &StorageKey, body: Bytes) -> Result<(), StoreError> {
        let path = self.object_path(key);
        let io_err = |source| StoreError::Io {
            key: key.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);

        // Key material is readable by the owner only, from the moment it exists
        #[cfg(unix)]
        {
            if key.is_secret() {
                options.mode(0o600);
            }
        }

        let mut file = options.open(&path).await.map_err(io_err)?;

        // The create mode is ignored for files that already exist
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if key.is_secret() {
                file.set_permissions(std::fs::Permissions::from_mode(0o600))
                    .await
                    .map_err(io_err)?;
            }
        }

        file.write_all(&body).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;

        debug!(key = %key, size = body.len(), "Wrote object to filesystem store");
        Ok(())
    }

    async fn get(&self, key: &StorageKey) -> Result<Bytes, StoreError> {
        let path = self.object_path(key);
        match fs::read(&path).await {
            Ok(content) => Ok(Bytes::from(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                trace!(key = %key, "Object not found in filesystem store");
                Err(StoreError::NotFound { key: key.clone() })
            }
            Err(source) => Err(StoreError::Io {
                key: key.clone(),
                source,
            }),
        }
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acme_store_common::{AccountEmail, DomainName};
    use crate::keys::CertArtifact;
    use tempfile::TempDir;

    async fn setup_store() -> (TempDir, FsObjectStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = FsObjectStore::open(temp_dir.path(), "bucket").await.unwrap();
        (temp_dir, store)
    }

    #[tokio::test]
    async fn test_store_creation() {
        let (temp_dir, store) = setup_store().await;
        assert!(store.base_path().exists());
        assert_eq!(store.base_path(), temp_dir.path().join("bucket"));
    }

    #[tokio::test]
    async fn test_rejects_bad_bucket() {
        let temp_dir = TempDir::new().unwrap();
        assert!(FsObjectStore::open(temp_dir.path(), "..").await.is_err());
        assert!(FsObjectStore::open(temp_dir.path(), "a/b").await.is_err());
        assert!(FsObjectStore::open(temp_dir.path(), "").await.is_err());
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let (_temp_dir, store) = setup_store().await;
        let key = StorageKey::account_key(&AccountEmail::new("a@x.com").unwrap());

        store.put(&key, Bytes::from_static(br#"{"kty":"EC"}"#)).await.unwrap();

        let body = store.get(&key).await.unwrap();
        assert_eq!(&body[..], br#"{"kty":"EC"}"#);
        assert!(store
            .base_path()
            .join("accounts/a@x.com/private_key.json")
            .exists());
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (_temp_dir, store) = setup_store().await;
        let key = StorageKey::domain_key(&DomainName::new("missing.com").unwrap());
        assert!(store.get(&key).await.unwrap_err().is_not_found());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_secret_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp_dir, store) = setup_store().await;
        let domain = DomainName::new("x.com").unwrap();
        let privkey = StorageKey::cert_artifact(&domain, CertArtifact::Privkey);
        let cert = StorageKey::cert_artifact(&domain, CertArtifact::Cert);

        let domain_key = StorageKey::domain_key(&domain);
        let mode = |rel: &str| {
            std::fs::metadata(store.base_path().join(rel))
                .unwrap()
                .permissions()
                .mode()
                & 0o777
        };

        store.put(&privkey, Bytes::from_static(b"key")).await.unwrap();
        store.put(&cert, Bytes::from_static(b"cert")).await.unwrap();
        store.put(&domain_key, Bytes::from_static(b"{}")).await.unwrap();

        assert_eq!(mode("certs/x.com/privkey.pem"), 0o600);
        assert_eq!(mode("certs/x.com/domain_key.json"), 0o600);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_overwrite_tightens_existing_secret() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp_dir, store) = setup_store().await;
        let key = StorageKey::domain_key(&DomainName::new("x.com").unwrap());
        let path = store.base_path().join("certs/x.com/domain_key.json");

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"old").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        store.put(&key, Bytes::from_static(b"new")).await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(std::fs::read(&path).unwrap(), b"new");
    }
}
