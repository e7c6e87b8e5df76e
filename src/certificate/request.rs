//! Inbound issuance request: wire body and parsed form.

use serde::{Deserialize, Serialize};
use ssh_key::PublicKey;
use validator::Validate;

use super::fingerprint;
use crate::errors::{Error, Result};

/// Message attached to body decoding failures
pub const MALFORMED_BODY: &str = "malformed request body";

/// Message attached to caller key parse failures
pub const UNPARSEABLE_KEY: &str = "unparseable public key";

/// JSON body of `POST /certificates`
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CertRequestBody {
    /// Caller public key in authorized-key form
    #[validate(length(min = 1, message = "key is required"))]
    pub key: String,

    /// Login identity; becomes the only valid principal
    #[validate(length(min = 1, message = "remote_user is required"))]
    pub remote_user: String,

    #[serde(default)]
    pub remote_host: String,

    /// Becomes the `source-address` critical option
    #[serde(default)]
    pub user_ip: String,

    /// Becomes the `force-command` critical option
    #[serde(default)]
    pub command: String,

    /// Informational mirror of the header token; never used to authenticate
    #[serde(default, skip_serializing)]
    pub jwt: Option<String>,
}

impl CertRequestBody {
    /// Decode and validate a raw request body
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let body: CertRequestBody = serde_json::from_slice(bytes)
            .map_err(|e| Error::validation(MALFORMED_BODY, e.to_string()))?;

        body.validate().map_err(|e| Error::validation(MALFORMED_BODY, e.to_string()))?;

        Ok(body)
    }
}

/// Request with the caller key parsed and fingerprinted
#[derive(Debug, Clone)]
pub struct CertificateRequest {
    pub public_key: PublicKey,
    /// Legacy MD5 fingerprint of `public_key`
    pub user_fingerprint: String,
    pub remote_user: String,
    pub remote_host: String,
    pub user_ip: String,
    pub command: String,
}

impl CertificateRequest {
    /// Parse the caller key out of a decoded body
    pub fn from_body(body: &CertRequestBody) -> Result<Self> {
        let public_key = PublicKey::from_openssh(body.key.trim())
            .map_err(|e| Error::validation(UNPARSEABLE_KEY, e.to_string()))?;
        let user_fingerprint = fingerprint::legacy_md5(&public_key)?;

        Ok(Self {
            public_key,
            user_fingerprint,
            remote_user: body.remote_user.clone(),
            remote_host: body.remote_host.clone(),
            user_ip: body.user_ip.clone(),
            command: body.command.clone(),
        })
    }
}
