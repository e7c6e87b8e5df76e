//! Signing with a CA private key held in configuration.

use async_trait::async_trait;
use ssh_key::PrivateKey;

use super::{CaPublicKey, CertificateSigner};
use crate::certificate::UnsignedCertificate;
use crate::errors::{Error, Result, SignerErrorKind};
use crate::secrets::SecretString;

/// Signs with an OpenSSH private key.
///
/// The public key is configured separately and is not checked against the private
/// key; a mismatch yields certificates that SSH servers trusting the configured
/// public key will reject.
pub struct LocalKeySigner {
    private_key: SecretString,
    public_key: String,
}

impl LocalKeySigner {
    pub fn new(private_key: SecretString, public_key: String) -> Self {
        Self { private_key, public_key }
    }

    fn load_private_key(&self) -> Result<PrivateKey> {
        let key = PrivateKey::from_openssh(self.private_key.expose_secret().trim())
            .map_err(|e| Error::signer(SignerErrorKind::PrivateKeyMalformed, e.to_string()))?;

        if key.is_encrypted() {
            return Err(Error::signer(
                SignerErrorKind::PrivateKeyMalformed,
                "encrypted CA private keys are not supported",
            ));
        }

        Ok(key)
    }
}

#[async_trait]
impl CertificateSigner for LocalKeySigner {
    fn backend(&self) -> &'static str {
        "local"
    }

    async fn public_key(&self) -> Result<CaPublicKey> {
        CaPublicKey::parse(&self.public_key)
    }

    async fn sign(&self, certificate: &UnsignedCertificate) -> Result<String> {
        let ca_key = self.load_private_key()?;

        let signed = certificate
            .to_builder()?
            .sign(&ca_key)
            .map_err(|e| Error::signer(SignerErrorKind::SigningFailed, e.to_string()))?;

        signed
            .to_openssh()
            .map_err(|e| Error::signer(SignerErrorKind::SigningFailed, e.to_string()))
    }
}
