//! Shared types for the ACME object-store adapter.
//!
//! - [`ids`] - validated account and domain identifiers
//! - [`logging`] - tracing subscriber bootstrap (feature `runtime`)

pub mod ids;

#[cfg(feature = "runtime")]
pub mod logging;

pub use ids::{AccountEmail, DomainName, DomainSet, KeyError};

#[cfg(feature = "runtime")]
pub use logging::{init_tracing, LogFormat};
