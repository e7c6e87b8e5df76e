//! # Observability
//!
//! Structured logging through `tracing`. Per-request spans are added by the HTTP
//! layer; the diagnostic log channel ships through [`crate::audit::TracingLogSink`].

pub mod logging;

pub use logging::{build_filter, init_logging, log_config_info};
