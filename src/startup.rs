//! Startup wiring for the certificate authority.
//!
//! Builds every long-lived component from a validated [`AppConfig`]: the database
//! pool, the signer backend, the token verifier, the audit channels with their
//! workers, and finally the HTTP router.

use std::sync::Arc;

use axum::Router;
use tracing::info;

use crate::api::{build_router, ApiState};
use crate::audit::{spawn_workers, AuditEmitter, TracingLogSink, WorkerHandle};
use crate::auth::JwtVerifier;
use crate::certificate::CertificateBuilder;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::issuance::IssuanceService;
use crate::signer::signer_from_config;
use crate::storage::{create_pool, DbPool, SqlxAuditLogRepository, SqlxCertificateRepository};

/// A fully wired service, ready to serve
pub struct Application {
    pub router: Router,
    pub pool: DbPool,
    pub workers: WorkerHandle,
}

impl Application {
    /// Stop the audit workers after draining their queues, then close the pool.
    pub async fn shutdown(self) {
        self.workers.shutdown();
        self.workers.join().await;
        self.pool.close().await;
        info!("Certificate authority stopped");
    }
}

pub async fn build_application(config: AppConfig) -> Result<Application> {
    config.validate()?;

    // Fail on bad key or token settings before any task is spawned.
    let signer = signer_from_config(&config.ca)?;
    let verifier = JwtVerifier::from_config(&config.auth)?;

    let pool = create_pool(&config.database).await?;

    let (emitter, receivers) = AuditEmitter::channel(config.channels.channel_size);
    let workers = spawn_workers(
        receivers,
        Arc::new(SqlxAuditLogRepository::new(pool.clone())),
        Arc::new(TracingLogSink),
    );

    let issuance = Arc::new(IssuanceService::new(
        Arc::new(verifier),
        signer,
        Arc::new(SqlxCertificateRepository::new(pool.clone())),
        emitter,
        CertificateBuilder::new(config.ca.cert_duration()),
    ));

    info!(
        backend = if config.ca.external { "remote" } else { "local" },
        cert_duration_seconds = config.ca.cert_duration_seconds,
        "Issuance service ready"
    );

    let router = build_router(ApiState { issuance, pool: pool.clone(), config: Arc::new(config) });

    Ok(Application { router, pool, workers })
}
