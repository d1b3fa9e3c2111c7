//! Type-safe identifier newtypes for ACME storage.
//!
//! Every value that ends up inside an object-store key goes through one of
//! these types first, so a raw caller string can never smuggle a path
//! separator or a `..` segment into a storage path.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum length of a fully qualified domain name.
const MAX_DOMAIN_LEN: usize = 253;

/// Errors produced while validating identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The account email is malformed.
    #[error("invalid account email '{value}': {reason}")]
    InvalidEmail { value: String, reason: &'static str },

    /// A domain name is malformed.
    #[error("invalid domain '{value}': {reason}")]
    InvalidDomain { value: String, reason: &'static str },

    /// A certificate must cover at least one domain.
    #[error("domain set is empty")]
    EmptyDomainSet,
}

/// Checks that a value is usable as a single storage path segment.
fn check_segment(value: &str) -> Result<(), &'static str> {
    if value.is_empty() {
        return Err("must not be empty");
    }
    if value == "." || value == ".." {
        return Err("must not be a relative path segment");
    }
    if value.contains(['/', '\\']) {
        return Err("must not contain path separators");
    }
    if value.chars().any(char::is_control) {
        return Err("must not contain control characters");
    }
    Ok(())
}

// ============================================================================
// Account Email
// ============================================================================

/// Account identifier.
///
/// ACME accounts are identified by their contact email. The email is kept
/// exactly as supplied (minus surrounding whitespace) since the local part
/// is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountEmail(String);

impl AccountEmail {
    /// Parse and validate an account email
    pub fn new(value: impl AsRef<str>) -> Result<Self, KeyError> {
        let raw = value.as_ref();
        let email = raw.trim();
        let invalid = |reason| KeyError::InvalidEmail {
            value: raw.to_string(),
            reason,
        };

        check_segment(email).map_err(invalid)?;
        match email.split_once('@') {
            Some((local, host)) if !local.is_empty() && !host.is_empty() => {}
            _ => return Err(invalid("expected local@host")),
        }

        Ok(Self(email.to_string()))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for AccountEmail {
    type Error = KeyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&str> for AccountEmail {
    type Error = KeyError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<AccountEmail> for String {
    fn from(email: AccountEmail) -> Self {
        email.0
    }
}

// ============================================================================
// Domain Name
// ============================================================================

/// A single certificate domain.
///
/// Domains are normalized to lower case without a trailing dot. Wildcard
/// labels (`*.example.com`) are accepted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainName(String);

impl DomainName {
    /// Parse and normalize a domain name
    pub fn new(value: impl AsRef<str>) -> Result<Self, KeyError> {
        let raw = value.as_ref();
        let domain = raw.trim().trim_end_matches('.').to_ascii_lowercase();
        let invalid = |reason| KeyError::InvalidDomain {
            value: raw.to_string(),
            reason,
        };

        check_segment(&domain).map_err(invalid)?;
        if domain.len() > MAX_DOMAIN_LEN {
            return Err(invalid("longer than 253 characters"));
        }
        if !domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '*'))
        {
            return Err(invalid("contains characters not allowed in a hostname"));
        }
        if domain.split('.').any(str::is_empty) {
            return Err(invalid("contains an empty label"));
        }

        Ok(Self(domain))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for DomainName {
    type Error = KeyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&str> for DomainName {
    type Error = KeyError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<DomainName> for String {
    fn from(domain: DomainName) -> Self {
        domain.0
    }
}

// ============================================================================
// Domain Set
// ============================================================================

/// The canonical domain set of one certificate.
///
/// Domains are sorted and deduplicated on construction, so two requests
/// naming the same domains in a different order (or with repeats) resolve to
/// the same storage location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct DomainSet(Vec<DomainName>);

impl DomainSet {
    /// Build a canonical domain set
    ///
    /// # Errors
    ///
    /// Fails if any domain is invalid or if no domains are given.
    pub fn new<I, S>(domains: I) -> Result<Self, KeyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names = domains
            .into_iter()
            .map(DomainName::new)
            .collect::<Result<Vec<_>, _>>()?;

        if names.is_empty() {
            return Err(KeyError::EmptyDomainSet);
        }

        names.sort();
        names.dedup();
        Ok(Self(names))
    }

    /// First domain in canonical order
    pub fn primary(&self) -> &DomainName {
        // Construction guarantees at least one entry
        &self.0[0]
    }

    /// Iterate domains in canonical order
    pub fn iter(&self) -> impl Iterator<Item = &DomainName> {
        self.0.iter()
    }

    /// Number of distinct domains
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DomainSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, domain) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(domain.as_str())?;
        }
        Ok(())
    }
}

impl TryFrom<Vec<String>> for DomainSet {
    type Error = KeyError;

    fn try_from(domains: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(domains)
    }
}

impl From<DomainSet> for Vec<String> {
    fn from(set: DomainSet) -> Self {
        set.0.into_iter().map(String::from).collect()
    }
}

impl<'a> IntoIterator for &'a DomainSet {
    type Item = &'a DomainName;
    type IntoIter = std::slice::Iter<'a, DomainName>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_email_valid() {
        let email = AccountEmail::new("  admin@example.com ").unwrap();
        assert_eq!(email.as_str(), "admin@example.com");
    }

    #[test]
    fn test_email_rejects_path_tricks() {
        assert!(AccountEmail::new("").is_err());
        assert!(AccountEmail::new("no-at-sign").is_err());
        assert!(AccountEmail::new("@example.com").is_err());
        assert!(AccountEmail::new("a/../b@example.com").is_err());
        assert!(AccountEmail::new("a\\b@example.com").is_err());
    }

    #[test]
    fn test_domain_normalization() {
        let domain = DomainName::new("WWW.Example.COM.").unwrap();
        assert_eq!(domain.as_str(), "www.example.com");

        assert!(DomainName::new("*.example.com").is_ok());
        assert!(DomainName::new("..").is_err());
        assert!(DomainName::new("a..b").is_err());
        assert!(DomainName::new("exa mple.com").is_err());
        assert!(DomainName::new("example.com/evil").is_err());
    }

    #[test]
    fn test_domain_set_canonical_order() {
        let a = DomainSet::new(["www.x.com", "x.com"]).unwrap();
        let b = DomainSet::new(["x.com", "WWW.x.com", "x.com"]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.primary().as_str(), "www.x.com");
        assert_eq!(a.to_string(), "www.x.com,x.com");
    }

    #[test]
    fn test_domain_set_empty() {
        let empty: [&str; 0] = [];
        assert_eq!(DomainSet::new(empty), Err(KeyError::EmptyDomainSet));
    }

    #[test]
    fn test_domain_set_serde() {
        let set: DomainSet = serde_json::from_str(r#"["b.com","a.com"]"#).unwrap();
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["a.com","b.com"]"#);
        assert!(serde_json::from_str::<DomainSet>("[]").is_err());
    }

    proptest! {
        #[test]
        fn prop_domain_set_order_independent(
            mut labels in proptest::collection::vec("[a-z]{1,8}", 1..6)
        ) {
            let domains: Vec<String> = labels.iter().map(|l| format!("{l}.example.com")).collect();
            let forward = DomainSet::new(&domains).unwrap();
            labels.reverse();
            let reversed: Vec<String> = labels.iter().map(|l| format!("{l}.example.com")).collect();
            let backward = DomainSet::new(&reversed).unwrap();
            prop_assert_eq!(&forward, &backward);
            prop_assert!(forward.iter().zip(forward.iter().skip(1)).all(|(a, b)| a < b));
        }
    }
}
