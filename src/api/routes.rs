use std::sync::Arc;

use axum::{
    extract::Request,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::issuance::IssuanceService;
use crate::storage::DbPool;

use super::handlers::{
    config_handler, create_certificate_handler, get_certificate_handler, liveness_handler,
    public_key_handler, readiness_handler, search_certificates_handler, REQUEST_ID_HEADER,
};

#[derive(Clone)]
pub struct ApiState {
    pub issuance: Arc<IssuanceService>,
    pub pool: DbPool,
    pub config: Arc<AppConfig>,
}

pub fn build_router(state: ApiState) -> Router {
    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");

        tracing::info_span!(
            "http_request",
            method = %request.method(),
            path = %request.uri().path(),
            request_id = %request_id,
        )
    });

    Router::new()
        .route("/certificates", post(create_certificate_handler).get(search_certificates_handler))
        .route("/certificates/{uid}", get(get_certificate_handler))
        .route("/publickey", get(public_key_handler))
        .route("/status/live", get(liveness_handler))
        .route("/status/ready", get(readiness_handler))
        .route("/status/config", get(config_handler))
        .with_state(state)
        .layer(trace_layer)
}
