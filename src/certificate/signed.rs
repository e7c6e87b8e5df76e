//! Fields read back from a signed certificate.
//!
//! The remote engine applies its own role policy, so the validity window and key ID
//! it signs can differ from what was requested. Storage takes these values from the
//! returned certificate rather than from the request.

use chrono::{DateTime, Utc};
use ssh_key::Certificate;

use crate::errors::{Error, Result, SignerErrorKind};

/// A signed certificate and the fields the CA actually signed
#[derive(Debug, Clone)]
pub struct SignedCertificate {
    /// OpenSSH certificate text as returned by the signer
    pub text: String,
    pub key_id: String,
    pub serial: u64,
    pub valid_after: DateTime<Utc>,
    pub valid_before: DateTime<Utc>,
}

impl SignedCertificate {
    pub fn parse(text: String) -> Result<Self> {
        let certificate = Certificate::from_openssh(text.trim()).map_err(|e| {
            Error::signer(SignerErrorKind::SigningFailed, format!("unreadable certificate from signer: {}", e))
        })?;

        Ok(Self {
            key_id: certificate.key_id().to_string(),
            serial: certificate.serial(),
            valid_after: timestamp(certificate.valid_after())?,
            valid_before: timestamp(certificate.valid_before())?,
            text,
        })
    }
}

fn timestamp(secs: u64) -> Result<DateTime<Utc>> {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| {
            Error::signer(SignerErrorKind::SigningFailed, format!("certificate timestamp {} is out of range", secs))
        })
}
