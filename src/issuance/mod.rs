//! Certificate issuance pipeline.
//!
//! A request moves strictly forward through
//! `decode → authenticate → parse key → resolve CA → build → sign → persist → audit`,
//! and any failure ends it. Decoding and authentication failures are reported on
//! the log channel before the caller sees the error; later failures only reach the
//! tracing output. The audit record is handed off only after the certificate is
//! stored.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::audit::{AuditEmitter, AuditRecord, LogEntry, CERT_CREATE};
use crate::auth::{extract_token, Claims, TokenVerifier};
use crate::certificate::{CertRequestBody, CertificateBuilder, CertificateRequest, SignedCertificate};
use crate::errors::{Error, Result};
use crate::signer::{CaPublicKey, CertificateSigner};
use crate::storage::{CertificateRecord, CertificateStore, NewCertificateRecord};

/// Per-request correlation data
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub real_ip: String,
    pub started_at: DateTime<Utc>,
    started: Instant,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>, real_ip: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            real_ip: real_ip.into(),
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    pub fn elapsed_nanos(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

/// Successful issuance
#[derive(Debug, Clone)]
pub struct IssuedCertificate {
    pub uid: Uuid,
    pub record_id: i64,
    pub key_id: String,
    pub certificate: String,
}

pub struct IssuanceService {
    verifier: Arc<dyn TokenVerifier>,
    signer: Arc<dyn CertificateSigner>,
    store: Arc<dyn CertificateStore>,
    emitter: AuditEmitter,
    builder: CertificateBuilder,
}

impl IssuanceService {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        signer: Arc<dyn CertificateSigner>,
        store: Arc<dyn CertificateStore>,
        emitter: AuditEmitter,
        builder: CertificateBuilder,
    ) -> Self {
        Self { verifier, signer, store, emitter, builder }
    }

    /// Run one issuance request end to end.
    #[instrument(skip(self, ctx, auth_header, body), fields(request_id = %ctx.request_id, real_ip = %ctx.real_ip))]
    pub async fn issue(
        &self,
        ctx: &RequestContext,
        auth_header: Option<&str>,
        body: &[u8],
    ) -> Result<IssuedCertificate> {
        let body = match CertRequestBody::decode(body) {
            Ok(body) => body,
            Err(e) => return Err(self.report_rejection(ctx, e).await),
        };

        let claims = match self.authenticate(auth_header) {
            Ok(claims) => claims,
            Err(e) => return Err(self.report_rejection(ctx, e).await),
        };

        self.issue_authenticated(ctx, &claims, &body).await.map_err(|e| {
            warn!(
                error = %e,
                status = e.status_code(),
                subject = %claims.sub,
                duration_ns = ctx.elapsed_nanos(),
                "Certificate issuance failed"
            );
            e
        })
    }

    async fn issue_authenticated(
        &self,
        ctx: &RequestContext,
        claims: &Claims,
        body: &CertRequestBody,
    ) -> Result<IssuedCertificate> {
        let request = CertificateRequest::from_body(body)?;

        let ca = self.signer.public_key().await?;

        let unsigned = self.builder.build(&request, &ca.fingerprint, Utc::now())?;

        let signed = SignedCertificate::parse(self.signer.sign(&unsigned).await?)?;

        let record = NewCertificateRecord {
            uid: unsigned.uid,
            key_id: signed.key_id.clone(),
            remote_user: request.remote_user.clone(),
            remote_host: request.remote_host.clone(),
            user_ip: request.user_ip.clone(),
            command: request.command.clone(),
            public_key: body.key.trim().to_string(),
            user_fingerprint: request.user_fingerprint.clone(),
            ca_fingerprint: ca.fingerprint.clone(),
            certificate: signed.text.clone(),
            valid_after: signed.valid_after,
            valid_before: signed.valid_before,
        };
        let record_id = self.store.save(&record).await?;

        // Detached; the response does not wait for channel capacity.
        self.emitter.emit_audit(AuditRecord::certificate_created(
            unsigned.uid,
            record_id,
            ctx.started_at,
            Utc::now(),
        ));

        info!(
            uid = %unsigned.uid,
            record_id,
            subject = %claims.sub,
            remote_user = %request.remote_user,
            user_fingerprint = %request.user_fingerprint,
            ca_fingerprint = %ca.fingerprint,
            backend = self.signer.backend(),
            serial = signed.serial,
            valid_before = %signed.valid_before,
            "Issued SSH user certificate"
        );

        Ok(IssuedCertificate { uid: unsigned.uid, record_id, key_id: signed.key_id, certificate: signed.text })
    }

    /// Check the `Authorization` header and return the verified claims
    pub fn authenticate(&self, auth_header: Option<&str>) -> Result<Claims> {
        let token = extract_token(auth_header)?;
        self.verifier.verify(&token)
    }

    /// CA public key from the active backend
    pub async fn public_key(&self) -> Result<CaPublicKey> {
        self.signer.public_key().await
    }

    /// Fetch a stored issuance by UID
    #[instrument(skip(self, auth_header))]
    pub async fn lookup(&self, auth_header: Option<&str>, uid: Uuid) -> Result<CertificateRecord> {
        self.authenticate(auth_header)?;

        self.store
            .find_by_uid(&uid)
            .await?
            .ok_or_else(|| Error::not_found("certificate", uid.to_string()))
    }

    /// Stored issuances for a user key, by its MD5 fingerprint, newest first
    #[instrument(skip(self, auth_header))]
    pub async fn search(&self, auth_header: Option<&str>, fingerprint: &str) -> Result<Vec<CertificateRecord>> {
        self.authenticate(auth_header)?;

        let fingerprint = fingerprint.trim();
        if fingerprint.is_empty() {
            return Err(Error::validation("missing fingerprint", "query parameter 'fingerprint' is required"));
        }

        self.store.list_by_user_fingerprint(fingerprint).await
    }

    /// Put a rejection on the log channel, waiting for capacity, then hand it back.
    async fn report_rejection(&self, ctx: &RequestContext, error: Error) -> Error {
        let entry = LogEntry::new()
            .with("_rid", ctx.request_id.clone())
            .with("_real-ip", ctx.real_ip.clone())
            .with("_action", CERT_CREATE)
            .with("_result", "fail")
            .with("_status", error.status_code())
            .with("_duration", ctx.elapsed_nanos())
            .with("_details", error.details())
            .with("short_message", error.message());

        self.emitter.log(entry).await;

        warn!(error = %error, status = error.status_code(), "Certificate request rejected");
        error
    }
}
