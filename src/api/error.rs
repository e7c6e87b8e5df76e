use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::errors::Error;

/// Failure returned by an HTTP handler
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    details: String,
}

impl ApiError {
    pub fn new<M: Into<String>, D: Into<String>>(status: StatusCode, message: M, details: D) -> Self {
        Self { status, message: message.into(), details: details.into() }
    }

    pub fn service_unavailable<D: Into<String>>(details: D) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "service unavailable", details)
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }
}

#[derive(Serialize)]
struct FailureBody {
    result: &'static str,
    message: String,
    details: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = FailureBody { result: "fail", message: self.message, details: self.details };
        (self.status, Json(body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, err.message(), err.details())
    }
}
