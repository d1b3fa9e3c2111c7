//! The `debug` configuration flag controls per-operation registry logging.

use std::io;
use std::sync::{Arc, Mutex};

use acme_store::{AcmeStore, KeyPair, MemoryObjectStore, StoreConfig};
use acme_store_common::{AccountEmail, DomainSet};
use serde_json::json;
use tracing::Level;

/// Collects formatted log output in memory
#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run a few registry operations and return everything logged at debug level
async fn logged_output(debug: bool) -> String {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(Level::DEBUG)
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let config = StoreConfig {
        debug,
        ..StoreConfig::memory("test")
    };
    let store = AcmeStore::new(config, Arc::new(MemoryObjectStore::new()));
    let email = AccountEmail::new("admin@example.com").unwrap();
    let domains = DomainSet::new(["example.com"]).unwrap();

    store
        .accounts()
        .set_keypair(&email, KeyPair::new(json!({"kty": "EC"})))
        .await
        .unwrap();
    assert!(store.accounts().check_keypair(&email).await.is_found());
    assert!(store.certificates().check_keypair(&domains).await.is_absent());

    capture.contents()
}

#[tokio::test]
async fn test_operations_quiet_without_debug() {
    let output = logged_output(false).await;

    assert!(output.contains("Initialized ACME store"));
    assert!(!output.contains("Setting account keypair"));
    assert!(!output.contains("Checking account keypair"));
    assert!(!output.contains("Cert keypair not found"));
}

#[tokio::test]
async fn test_operations_logged_with_debug() {
    let output = logged_output(true).await;

    assert!(output.contains("Setting account keypair"));
    assert!(output.contains("Checking account keypair"));
    assert!(output.contains("Account keypair found"));
    assert!(output.contains("Cert keypair not found"));
    assert!(output.contains("admin@example.com"));
}
