//! HTTP handlers for issuance, CA key distribution, lookup, search and status.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use super::error::ApiError;
use super::routes::ApiState;
use crate::errors::Error;
use crate::issuance::RequestContext;
use crate::storage::{self, CertificateRecord};

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const REAL_IP_HEADER: &str = "x-real-ip";
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Placeholder when the caller's address cannot be determined
pub const UNKNOWN_IP: &str = "unknown";

#[derive(Debug, Serialize)]
pub struct CertificateResponse {
    pub result: &'static str,
    pub certificate: String,
}

#[derive(Debug, Serialize)]
pub struct PublicKeyResponse {
    pub result: &'static str,
    pub public_key: String,
}

#[derive(Debug, Serialize)]
pub struct LookupResponse {
    pub result: &'static str,
    pub certificate: CertificateRecord,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub result: &'static str,
    pub certificates: Vec<CertificateRecord>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// MD5 fingerprint of the user key, as `ssh-keygen -E md5 -l` prints it
    #[serde(default)]
    pub fingerprint: String,
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok()).map(str::trim).filter(|v| !v.is_empty())
}

/// Caller address from `X-Real-IP`, then the first `X-Forwarded-For` hop.
pub fn real_ip(headers: &HeaderMap) -> String {
    if let Some(ip) = header_str(headers, REAL_IP_HEADER) {
        return ip.to_string();
    }

    header_str(headers, FORWARDED_FOR_HEADER)
        .and_then(|value| value.split(',').map(str::trim).find(|hop| !hop.is_empty()))
        .unwrap_or(UNKNOWN_IP)
        .to_string()
}

/// Correlation data for one request; a fresh id is generated when the caller sends none.
pub fn request_context(headers: &HeaderMap) -> RequestContext {
    let request_id = header_str(headers, REQUEST_ID_HEADER)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    RequestContext::new(request_id, real_ip(headers))
}

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok())
}

#[instrument(skip_all, name = "create_certificate")]
pub async fn create_certificate_handler(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CertificateResponse>, ApiError> {
    let ctx = request_context(&headers);

    let issued = state.issuance.issue(&ctx, authorization(&headers), &body).await?;

    Ok(Json(CertificateResponse { result: "success", certificate: issued.certificate }))
}

#[instrument(skip_all, name = "get_public_key")]
pub async fn public_key_handler(State(state): State<ApiState>) -> Result<Json<PublicKeyResponse>, ApiError> {
    let public_key = state.issuance.public_key().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to resolve CA public key");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.message(), e.details())
    })?;

    Ok(Json(PublicKeyResponse { result: "success", public_key: public_key.text }))
}

#[instrument(skip(state, headers), name = "get_certificate")]
pub async fn get_certificate_handler(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(uid): Path<String>,
) -> Result<Json<LookupResponse>, ApiError> {
    let uid = Uuid::parse_str(&uid)
        .map_err(|e| Error::validation("malformed certificate uid", e.to_string()))?;

    let record = state.issuance.lookup(authorization(&headers), uid).await?;

    Ok(Json(LookupResponse { result: "success", certificate: record }))
}

#[instrument(skip(state, headers), name = "search_certificates")]
pub async fn search_certificates_handler(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let certificates = state.issuance.search(authorization(&headers), &query.fingerprint).await?;

    Ok(Json(SearchResponse { result: "success", certificates }))
}

pub async fn liveness_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "result": "success" }))
}

pub async fn readiness_handler(State(state): State<ApiState>) -> Result<Json<serde_json::Value>, ApiError> {
    storage::check_connection(&state.pool).await.map_err(|e| {
        tracing::warn!(error = %e, "Readiness check failed");
        ApiError::service_unavailable(e.details())
    })?;

    Ok(Json(serde_json::json!({ "result": "success", "database": "ok" })))
}

pub async fn config_handler(State(state): State<ApiState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "result": "success", "config": state.config.redacted() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn test_real_ip_prefers_x_real_ip() {
        let headers = headers(&[(REAL_IP_HEADER, "198.51.100.7"), (FORWARDED_FOR_HEADER, "203.0.113.1")]);
        assert_eq!(real_ip(&headers), "198.51.100.7");
    }

    #[test]
    fn test_real_ip_uses_first_forwarded_hop() {
        let headers = headers(&[(FORWARDED_FOR_HEADER, "203.0.113.1, 10.0.0.1")]);
        assert_eq!(real_ip(&headers), "203.0.113.1");
    }

    #[test]
    fn test_real_ip_unknown() {
        assert_eq!(real_ip(&HeaderMap::new()), UNKNOWN_IP);
        assert_eq!(real_ip(&headers(&[(FORWARDED_FOR_HEADER, " , ")])), UNKNOWN_IP);
    }

    #[test]
    fn test_request_id_passthrough_and_generation() {
        let ctx = request_context(&headers(&[(REQUEST_ID_HEADER, "abc-123")]));
        assert_eq!(ctx.request_id, "abc-123");

        let generated = request_context(&HeaderMap::new());
        assert!(Uuid::parse_str(&generated.request_id).is_ok());
    }
}
