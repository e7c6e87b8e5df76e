//! # sshca
//!
//! An SSH certificate authority that issues short-lived OpenSSH user certificates.
//! Callers authenticate with a JWT and submit a public key; the issued certificate
//! is bound to one principal, one forced command and one source address.
//!
//! ## Architecture
//!
//! ```text
//! HTTP API → IssuanceService → CertificateSigner (local key | secrets engine)
//!                 ↓                    ↓
//!          CertificateStore     AuditEmitter → audit / log workers
//! ```
//!
//! The signer backend is picked once at startup from `ca.external`; the issuance
//! pipeline only sees the [`signer::CertificateSigner`] trait.

pub mod api;
pub mod audit;
pub mod auth;
pub mod certificate;
pub mod config;
pub mod errors;
pub mod issuance;
pub mod observability;
pub mod secrets;
pub mod signer;
pub mod startup;
pub mod storage;

#[cfg(test)]
mod test_support;

pub use config::AppConfig;
pub use errors::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_available() {
        assert!(!VERSION.is_empty());
        assert_eq!(APP_NAME, "sshca");
    }
}
