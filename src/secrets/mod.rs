//! Remote secrets management for the CA signing key.
//!
//! When the authority runs in external mode the CA private key is held by a
//! secrets engine and never loaded into this process. This module provides:
//!
//! - [`SshSecretsEngine`]: the backend-agnostic interface (read CA public key,
//!   sign a user key)
//! - [`VaultSshClient`]: HashiCorp Vault SSH secrets engine with AppRole login
//! - [`SecretString`]: redacting wrapper used for every secret in configuration
//!
//! # Security Considerations
//!
//! - Secrets are never logged or exposed in error messages
//! - The remote engine is the sole holder of the CA private key

pub mod client;
pub mod error;
pub mod types;
pub mod vault;

pub use client::{SshSecretsEngine, SshSignRequest};
pub use error::{Result, SecretsError};
pub use types::SecretString;
pub use vault::{VaultSshClient, VaultSshConfig};
