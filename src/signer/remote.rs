//! Signing delegated to a remote secrets engine.

use async_trait::async_trait;
use tracing::{error, info};

use super::{CaPublicKey, CertificateSigner};
use crate::certificate::UnsignedCertificate;
use crate::errors::{Error, Result, SignerErrorKind};
use crate::secrets::SshSecretsEngine;

/// Signer whose CA private key never leaves the secrets engine.
///
/// Failures are not retried. Each carries a `retryable` hint in the logs so
/// operators can tell a sealed or unreachable engine from a rejected request.
pub struct RemoteSecretsSigner<E> {
    engine: E,
}

impl<E: SshSecretsEngine> RemoteSecretsSigner<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl<E: SshSecretsEngine> CertificateSigner for RemoteSecretsSigner<E> {
    fn backend(&self) -> &'static str {
        "remote"
    }

    async fn public_key(&self) -> Result<CaPublicKey> {
        let text = self.engine.read_ca_public_key().await.map_err(|e| {
            error!(error = %e, retryable = e.is_retryable(), "Failed to fetch CA public key from secrets engine");
            Error::signer(SignerErrorKind::CaKeyUnavailable, e.to_string())
        })?;

        CaPublicKey::parse(&text)
    }

    async fn sign(&self, certificate: &UnsignedCertificate) -> Result<String> {
        let request = certificate.to_sign_request()?;

        let signed = self.engine.sign_user_key(&request).await.map_err(|e| {
            error!(
                error = %e,
                retryable = e.is_retryable(),
                uid = %certificate.uid,
                "Secrets engine failed to sign certificate"
            );
            Error::signer(SignerErrorKind::RemoteRejected, e.to_string())
        })?;

        info!(uid = %certificate.uid, "Certificate signed by secrets engine");
        Ok(signed)
    }
}
