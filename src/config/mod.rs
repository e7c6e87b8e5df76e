//! # Configuration Management
//!
//! Layered configuration for the certificate authority:
//!
//! 1. Built-in defaults (`#[serde(default)]` on every section)
//! 2. An optional TOML/YAML/JSON file
//! 3. Environment variables prefixed with `SSHCA_`, nested with `__`
//!    (e.g. `SSHCA_CA__EXTERNAL=true`, `SSHCA_CHANNELS__CHANNEL_SIZE=500`)
//!
//! The merged result is validated before it is handed to the rest of the service.

pub mod settings;

pub use settings::{
    AppConfig, AuthConfig, CaConfig, ChannelConfig, DatabaseConfig, ObservabilityConfig,
    ServerConfig,
};

use crate::errors::Result;
use std::path::Path;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "SSHCA";

/// Environment variable naming an optional configuration file
pub const CONFIG_FILE_ENV: &str = "SSHCA_CONFIG_FILE";

impl AppConfig {
    /// Load configuration from an optional file and `SSHCA_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// Load configuration using a custom environment prefix.
    pub fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path.to_path_buf()).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        tracing::debug!(
            external = config.ca.external,
            cert_duration_seconds = config.ca.cert_duration_seconds,
            channel_size = config.channels.channel_size,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Configuration view safe to expose over HTTP; secrets serialize as `[REDACTED]`.
    pub fn redacted(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
