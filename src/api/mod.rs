//! # REST API
//!
//! Axum router exposing certificate issuance, the CA public key, issuance lookup and
//! the status probes.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use routes::{build_router, ApiState};
pub use server::{serve, shutdown_signal, start_api_server};
