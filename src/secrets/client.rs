//! Secrets-engine trait used by the remote CA signer.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::Result;

/// Certificate fields submitted to a remote SSH signing engine.
///
/// The remote engine picks its own nonce, serial, and clock; it receives the
/// subject key and every restriction the local builder would have applied, plus
/// the requested lifetime expressed as a TTL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SshSignRequest {
    /// Subject public key in OpenSSH authorized-key form
    pub public_key: String,

    /// Always `"user"` for this authority
    pub cert_type: String,

    pub key_id: String,

    pub valid_principals: Vec<String>,

    /// Requested lifetime in seconds
    pub ttl_seconds: u64,

    pub critical_options: BTreeMap<String, String>,

    pub extensions: BTreeMap<String, String>,
}

/// Backend holding the CA private key on behalf of this service.
///
/// # Security Considerations
///
/// - Implementations MUST NOT log credentials or returned key material beyond the
///   public key
/// - The private key never leaves the backend
#[async_trait]
pub trait SshSecretsEngine: Send + Sync {
    /// Fetch the CA public key in OpenSSH authorized-key form.
    async fn read_ca_public_key(&self) -> Result<String>;

    /// Ask the engine to sign a user key; returns the signed certificate text verbatim.
    async fn sign_user_key(&self, request: &SshSignRequest) -> Result<String>;
}
