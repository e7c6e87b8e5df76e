//! Assembly of unsigned user certificates.
//!
//! Building is pure apart from the random UID: given the parsed request, the CA
//! fingerprint, the clock reading and the configured lifetime, it yields every field
//! of the certificate except the signature. Signers turn the result into either an
//! `ssh_key` builder (local key) or a sign request (remote engine).

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use ssh_key::certificate::{Builder, CertType};
use ssh_key::PublicKey;
use uuid::Uuid;

use super::request::CertificateRequest;
use crate::errors::{Error, Result, SignerErrorKind};
use crate::secrets::SshSignRequest;

/// `valid_after` is backdated by this much to tolerate client clock drift.
pub const CLOCK_SKEW: Duration = Duration::from_secs(30);

pub const FORCE_COMMAND: &str = "force-command";
pub const SOURCE_ADDRESS: &str = "source-address";
pub const PERMIT_PTY: &str = "permit-pty";

/// Every field of a user certificate except its signature
#[derive(Debug, Clone)]
pub struct UnsignedCertificate {
    /// Request identifier; its 16 bytes are the certificate nonce
    pub uid: Uuid,
    pub public_key: PublicKey,
    /// Legacy MD5 fingerprint of the subject key
    pub user_fingerprint: String,
    /// SHA-256 fingerprint of the CA key the certificate is issued under
    pub ca_fingerprint: String,
    pub serial: u64,
    pub key_id: String,
    pub principal: String,
    pub issued_at: DateTime<Utc>,
    pub valid_after: DateTime<Utc>,
    pub valid_before: DateTime<Utc>,
    pub critical_options: BTreeMap<String, String>,
    pub extensions: BTreeMap<String, String>,
}

impl UnsignedCertificate {
    pub fn nonce(&self) -> &[u8] {
        self.uid.as_bytes()
    }

    /// Seconds from issuance to expiry
    pub fn ttl_seconds(&self) -> u64 {
        (self.valid_before - self.issued_at).num_seconds().max(0) as u64
    }

    /// Load the fields into an `ssh_key` certificate builder, ready to sign.
    pub fn to_builder(&self) -> Result<Builder> {
        let build_error = |e: ssh_key::Error| Error::signer(SignerErrorKind::SigningFailed, e.to_string());

        let mut builder = Builder::new(
            self.nonce().to_vec(),
            self.public_key.key_data().clone(),
            unix_seconds(self.valid_after),
            unix_seconds(self.valid_before),
        )
        .map_err(build_error)?;

        builder.serial(self.serial).map_err(build_error)?;
        builder.cert_type(CertType::User).map_err(build_error)?;
        builder.key_id(&self.key_id).map_err(build_error)?;
        builder.valid_principal(&self.principal).map_err(build_error)?;

        for (name, data) in &self.critical_options {
            builder.critical_option(name, data).map_err(build_error)?;
        }
        for (name, data) in &self.extensions {
            builder.extension(name, data).map_err(build_error)?;
        }

        Ok(builder)
    }

    /// Fields submitted to a remote signing engine
    pub fn to_sign_request(&self) -> Result<SshSignRequest> {
        let public_key = self
            .public_key
            .to_openssh()
            .map_err(|e| Error::validation("unparseable public key", e.to_string()))?;

        Ok(SshSignRequest {
            public_key,
            cert_type: "user".to_string(),
            key_id: self.key_id.clone(),
            valid_principals: vec![self.principal.clone()],
            ttl_seconds: self.ttl_seconds(),
            critical_options: self.critical_options.clone(),
            extensions: self.extensions.clone(),
        })
    }
}

fn unix_seconds(time: DateTime<Utc>) -> u64 {
    time.timestamp().max(0) as u64
}

/// Builds unsigned certificates with a fixed lifetime
#[derive(Debug, Clone, Copy)]
pub struct CertificateBuilder {
    lifetime: Duration,
}

impl CertificateBuilder {
    pub fn new(lifetime: Duration) -> Self {
        Self { lifetime }
    }

    /// Build with a fresh random UID
    pub fn build(
        &self,
        request: &CertificateRequest,
        ca_fingerprint: &str,
        now: DateTime<Utc>,
    ) -> Result<UnsignedCertificate> {
        self.build_with_uid(request, ca_fingerprint, now, Uuid::new_v4())
    }

    /// `(valid_after, valid_before)` around `now`; fails when the lifetime overflows the clock.
    fn validity_window(&self, now: DateTime<Utc>) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        let out_of_range = || {
            Error::signer(
                SignerErrorKind::SigningFailed,
                format!("certificate lifetime of {}s is out of range", self.lifetime.as_secs()),
            )
        };

        let skew = chrono::Duration::try_seconds(CLOCK_SKEW.as_secs() as i64).ok_or_else(out_of_range)?;
        let lifetime = i64::try_from(self.lifetime.as_secs())
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(out_of_range)?;

        let valid_after = now.checked_sub_signed(skew).ok_or_else(out_of_range)?;
        let valid_before = now.checked_add_signed(lifetime).ok_or_else(out_of_range)?;

        Ok((valid_after, valid_before))
    }

    pub fn build_with_uid(
        &self,
        request: &CertificateRequest,
        ca_fingerprint: &str,
        now: DateTime<Utc>,
        uid: Uuid,
    ) -> Result<UnsignedCertificate> {
        let (valid_after, valid_before) = self.validity_window(now)?;

        let key_id = format!(
            "user[{}] from[{}] command[{}] sshKey[{}] ca[{}] valid to[{}] uid[{}]",
            request.remote_user,
            request.user_ip,
            request.command,
            request.user_fingerprint,
            ca_fingerprint,
            valid_before.to_rfc3339_opts(SecondsFormat::Secs, true),
            uid,
        );

        let mut critical_options = BTreeMap::new();
        critical_options.insert(FORCE_COMMAND.to_string(), request.command.clone());
        critical_options.insert(SOURCE_ADDRESS.to_string(), request.user_ip.clone());

        let mut extensions = BTreeMap::new();
        extensions.insert(PERMIT_PTY.to_string(), String::new());

        Ok(UnsignedCertificate {
            uid,
            public_key: request.public_key.clone(),
            user_fingerprint: request.user_fingerprint.clone(),
            ca_fingerprint: ca_fingerprint.to_string(),
            serial: 0,
            key_id,
            principal: request.remote_user.clone(),
            issued_at: now,
            valid_after,
            valid_before,
            critical_options,
            extensions,
        })
    }
}
