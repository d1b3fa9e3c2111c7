//! Object-store key layout.
//!
//! ```text
//! accounts/
//! └── admin@example.com/
//!     └── private_key.json     # account key (JWK)
//! certs/
//! └── example.com/
//!     ├── domain_key.json      # certificate key (JWK), shared by all domains of a cert
//!     ├── cert.pem             # leaf certificate
//!     ├── privkey.pem          # certificate private key
//!     └── chain.pem            # issuer chain
//! ```
//!
//! Keys are only ever built from validated [`AccountEmail`] and
//! [`DomainName`] values, so every segment is a single safe path component.

use std::fmt;

use acme_store_common::{AccountEmail, DomainName};

const ACCOUNTS_PREFIX: &str = "accounts";
const CERTS_PREFIX: &str = "certs";
const ACCOUNT_KEY_FILE: &str = "private_key.json";
const DOMAIN_KEY_FILE: &str = "domain_key.json";

/// A string key addressing one object in the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey(String);

impl StorageKey {
    /// Key of an account's private key
    pub fn account_key(email: &AccountEmail) -> Self {
        Self(format!("{ACCOUNTS_PREFIX}/{email}/{ACCOUNT_KEY_FILE}"))
    }

    /// Key of a domain's certificate key
    pub fn domain_key(domain: &DomainName) -> Self {
        Self(format!("{CERTS_PREFIX}/{domain}/{DOMAIN_KEY_FILE}"))
    }

    /// Key of one certificate artifact for a domain
    pub fn cert_artifact(domain: &DomainName, artifact: CertArtifact) -> Self {
        Self(format!("{CERTS_PREFIX}/{domain}/{}", artifact.file_name()))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments of the key
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Whether the object holds private key material
    pub fn is_secret(&self) -> bool {
        self.0.ends_with(".json") || self.0.ends_with(CertArtifact::Privkey.file_name())
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The three PEM artifacts stored per domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CertArtifact {
    Cert,
    Privkey,
    Chain,
}

impl CertArtifact {
    /// All artifacts, in bundle order
    pub const ALL: [CertArtifact; 3] = [CertArtifact::Cert, CertArtifact::Privkey, CertArtifact::Chain];

    /// Object file name of the artifact
    pub fn file_name(self) -> &'static str {
        match self {
            CertArtifact::Cert => "cert.pem",
            CertArtifact::Privkey => "privkey.pem",
            CertArtifact::Chain => "chain.pem",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_key_layout() {
        let email = AccountEmail::new("a@x.com").unwrap();
        let key = StorageKey::account_key(&email);
        assert_eq!(key.as_str(), "accounts/a@x.com/private_key.json");
        assert!(key.is_secret());
    }

    #[test]
    fn test_domain_key_layout() {
        let domain = DomainName::new("www.x.com").unwrap();
        assert_eq!(
            StorageKey::domain_key(&domain).as_str(),
            "certs/www.x.com/domain_key.json"
        );
    }

    #[test]
    fn test_cert_artifact_layout() {
        let domain = DomainName::new("x.com").unwrap();
        let keys: Vec<_> = CertArtifact::ALL
            .iter()
            .map(|a| StorageKey::cert_artifact(&domain, *a))
            .collect();

        assert_eq!(keys[0].as_str(), "certs/x.com/cert.pem");
        assert_eq!(keys[1].as_str(), "certs/x.com/privkey.pem");
        assert_eq!(keys[2].as_str(), "certs/x.com/chain.pem");
        assert!(!keys[0].is_secret());
        assert!(keys[1].is_secret());
        assert!(!keys[2].is_secret());
    }

    #[test]
    fn test_segments() {
        let domain = DomainName::new("x.com").unwrap();
        let key = StorageKey::domain_key(&domain);
        assert_eq!(key.segments().collect::<Vec<_>>(), ["certs", "x.com", "domain_key.json"]);
    }
}
