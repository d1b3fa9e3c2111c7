//! Records persisted and returned by the registries.

use acme_store_common::AccountEmail;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Asymmetric key material produced by the ACME client.
///
/// The JWK is opaque to this crate: it is serialized verbatim on write and
/// handed back verbatim on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPair {
    /// Private key in JWK form
    pub private_key_jwk: Value,
}

impl KeyPair {
    /// Wrap a JWK value
    pub fn new(private_key_jwk: Value) -> Self {
        Self { private_key_jwk }
    }

    /// Key pair whose material is explicitly `null`.
    ///
    /// Signals that the domains of a certificate disagree on their key and
    /// must be rewritten with a single shared key.
    pub fn diverged() -> Self {
        Self {
            private_key_jwk: Value::Null,
        }
    }

    /// Whether the key material is the `null` divergence sentinel
    pub fn is_null(&self) -> bool {
        self.private_key_jwk.is_null()
    }
}

/// Input to account registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub keypair: KeyPair,
    /// Registration receipt returned by the ACME server. Not persisted.
    #[serde(default)]
    pub receipt: Option<Value>,
}

/// An ACME account, identified by its contact email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub keypair: KeyPair,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<Value>,
}

impl Account {
    pub(crate) fn new(email: &AccountEmail, keypair: KeyPair, receipt: Option<Value>) -> Self {
        Self {
            id: email.to_string(),
            email: email.to_string(),
            keypair,
            receipt,
        }
    }
}

/// PEM artifacts of an issued certificate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateBundle {
    /// Leaf certificate
    pub cert: String,
    /// Certificate private key
    pub privkey: String,
    /// Issuer chain
    pub chain: String,
}

impl CertificateBundle {
    pub fn new(
        cert: impl Into<String>,
        privkey: impl Into<String>,
        chain: impl Into<String>,
    ) -> Self {
        Self {
            cert: cert.into(),
            privkey: privkey.into(),
            chain: chain.into(),
        }
    }
}
