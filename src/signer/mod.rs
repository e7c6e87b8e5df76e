//! CA signing backends.
//!
//! Exactly one [`CertificateSigner`] is active per deployment, chosen at startup by
//! `ca.external`:
//!
//! - [`LocalKeySigner`]: CA private key held in configuration, parsed per call
//! - [`RemoteSecretsSigner`]: CA private key held by a secrets engine (Vault SSH)
//!
//! Issuance depends only on the trait; neither backend caches key material.

pub mod local;
pub mod remote;

use std::sync::Arc;

use async_trait::async_trait;
use ssh_key::PublicKey;

use crate::certificate::{fingerprint, UnsignedCertificate};
use crate::config::CaConfig;
use crate::errors::{Error, Result, SignerErrorKind};
use crate::secrets::VaultSshClient;

pub use local::LocalKeySigner;
pub use remote::RemoteSecretsSigner;

/// The CA public key in parsed and text form
#[derive(Debug, Clone)]
pub struct CaPublicKey {
    pub key: PublicKey,
    /// Authorized-key text as configured or fetched
    pub text: String,
    /// `SHA256:` fingerprint
    pub fingerprint: String,
}

impl CaPublicKey {
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let key = PublicKey::from_openssh(text)
            .map_err(|e| Error::signer(SignerErrorKind::CaKeyMalformed, e.to_string()))?;
        let fingerprint = fingerprint::sha256(&key);

        Ok(Self { key, text: text.to_string(), fingerprint })
    }
}

#[async_trait]
pub trait CertificateSigner: Send + Sync {
    /// Short backend name for logs
    fn backend(&self) -> &'static str;

    /// Resolve the CA public key this backend signs with
    async fn public_key(&self) -> Result<CaPublicKey>;

    /// Sign the certificate; returns authorized-key certificate text
    async fn sign(&self, certificate: &UnsignedCertificate) -> Result<String>;
}

/// Pick the backend; only the chosen factory runs.
pub fn select_signer<L, R>(external: bool, local: L, remote: R) -> Result<Arc<dyn CertificateSigner>>
where
    L: FnOnce() -> Result<Arc<dyn CertificateSigner>>,
    R: FnOnce() -> Result<Arc<dyn CertificateSigner>>,
{
    let signer = if external { remote()? } else { local()? };
    tracing::info!(backend = signer.backend(), "CA signer selected");
    Ok(signer)
}

/// Build the configured backend
pub fn signer_from_config(config: &CaConfig) -> Result<Arc<dyn CertificateSigner>> {
    select_signer(
        config.external,
        || {
            Ok(Arc::new(LocalKeySigner::new(config.private_key.clone(), config.public_key.clone()))
                as Arc<dyn CertificateSigner>)
        },
        || {
            let client = VaultSshClient::new(config.vault.clone())
                .map_err(|e| Error::config(format!("Invalid Vault configuration: {}", e)))?;
            Ok(Arc::new(RemoteSecretsSigner::new(client)) as Arc<dyn CertificateSigner>)
        },
    )
}
