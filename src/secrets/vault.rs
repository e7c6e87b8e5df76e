//! HashiCorp Vault SSH secrets engine backend.
//!
//! The CA private key lives in Vault's SSH secrets engine; this service only ever
//! sees the CA public key and the certificates Vault signs. Every call logs in
//! with AppRole (`role_id` + `secret_id`) and uses the resulting short-lived
//! token for that single operation, so no Vault session outlives a request.
//!
//! # Configuration
//!
//! - Vault server address (HTTPS recommended)
//! - AppRole `role_id` and `secret_id`, and the AppRole auth mount (default: "approle")
//! - SSH engine mount (default: "ssh-client-signer") and signing role name
//! - Optional namespace for Vault Enterprise
//!
//! # Example
//!
//! ```rust,ignore
//! use sshca::secrets::{SshSecretsEngine, VaultSshConfig, VaultSshClient};
//!
//! let client = VaultSshClient::new(config)?;
//! let ca_key = client.read_ca_public_key().await?;
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vaultrs::api::ssh::requests::SignSSHKeyRequestBuilder;
use vaultrs::client::{Client, VaultClient, VaultClientSettingsBuilder};
use vaultrs::error::ClientError;

use super::client::{SshSecretsEngine, SshSignRequest};
use super::error::{Result, SecretsError};
use super::types::SecretString;

/// Configuration for the Vault SSH signer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultSshConfig {
    /// Vault server address (e.g., "https://vault.example.com:8200")
    pub address: String,

    /// AppRole role id
    pub role_id: String,

    /// AppRole secret id (redacted in logs)
    pub secret_id: SecretString,

    /// AppRole auth method mount path
    #[serde(default = "default_approle_mount")]
    pub approle_mount: String,

    /// SSH secrets engine mount path
    #[serde(default = "default_ssh_mount")]
    pub mount: String,

    /// SSH secrets engine role used for signing
    #[serde(default = "default_ssh_role")]
    pub role: String,

    /// Vault namespace (for Enterprise multi-tenancy)
    pub namespace: Option<String>,
}

fn default_approle_mount() -> String {
    "approle".to_string()
}

fn default_ssh_mount() -> String {
    "ssh-client-signer".to_string()
}

fn default_ssh_role() -> String {
    "sshca".to_string()
}

impl Default for VaultSshConfig {
    fn default() -> Self {
        Self {
            address: "http://127.0.0.1:8200".to_string(),
            role_id: String::new(),
            secret_id: SecretString::default(),
            approle_mount: default_approle_mount(),
            mount: default_ssh_mount(),
            role: default_ssh_role(),
            namespace: None,
        }
    }
}

/// Vault-backed [`SshSecretsEngine`].
///
/// This client is `Send + Sync` and can be shared across request tasks.
pub struct VaultSshClient {
    config: VaultSshConfig,
}

impl VaultSshClient {
    /// Creates a client; no network traffic happens until the first call.
    ///
    /// # Errors
    ///
    /// - [`SecretsError::ConfigError`] if the address or AppRole credentials are empty
    pub fn new(config: VaultSshConfig) -> Result<Self> {
        if config.address.is_empty() {
            return Err(SecretsError::config_error("Vault address cannot be empty"));
        }
        if config.role_id.is_empty() || config.secret_id.is_empty() {
            return Err(SecretsError::config_error("Vault AppRole role_id and secret_id are required"));
        }

        Ok(Self { config })
    }

    /// Build a client and exchange the AppRole credentials for a token.
    async fn login(&self) -> Result<VaultClient> {
        let mut settings_builder = VaultClientSettingsBuilder::default();
        settings_builder.address(&self.config.address);

        if let Some(namespace) = self.config.namespace.clone() {
            settings_builder.namespace(Some(namespace));
        }

        let settings = settings_builder.build().map_err(|e| {
            SecretsError::config_error(format!("Invalid Vault configuration: {}", e))
        })?;

        let mut client = VaultClient::new(settings).map_err(|e| {
            SecretsError::connection_failed(format!("Failed to create Vault client: {}", e))
        })?;

        let auth = vaultrs::auth::approle::login(
            &client,
            &self.config.approle_mount,
            &self.config.role_id,
            self.config.secret_id.expose_secret(),
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, address = %self.config.address, "Vault AppRole login failed");
            match classify(e) {
                SecretsError::BackendError { message, .. } => {
                    SecretsError::authentication_failed(message)
                }
                other => other,
            }
        })?;

        client.set_token(&auth.client_token);
        Ok(client)
    }
}

/// Map a vaultrs error onto the secrets taxonomy, keeping the HTTP status when Vault answered.
fn classify(error: ClientError) -> SecretsError {
    match error {
        ClientError::APIError { code, errors } => {
            SecretsError::backend_error(format!("Vault returned {}: {}", code, errors.join("; ")), Some(code))
        }
        other => SecretsError::connection_failed(other.to_string()),
    }
}

#[async_trait]
impl SshSecretsEngine for VaultSshClient {
    async fn read_ca_public_key(&self) -> Result<String> {
        let client = self.login().await?;

        let response = vaultrs::ssh::ca::read(&client, &self.config.mount).await.map_err(|e| {
            tracing::error!(error = %e, mount = %self.config.mount, "Failed to read SSH CA public key from Vault");
            classify(e)
        })?;

        Ok(response.public_key)
    }

    async fn sign_user_key(&self, request: &SshSignRequest) -> Result<String> {
        let client = self.login().await?;

        let mut opts = SignSSHKeyRequestBuilder::default();
        opts.cert_type(request.cert_type.clone())
            .key_id(request.key_id.clone())
            .valid_principals(request.valid_principals.join(","))
            .ttl(format!("{}s", request.ttl_seconds))
            .critical_options(request.critical_options.clone().into_iter().collect::<HashMap<_, _>>())
            .extensions(request.extensions.clone().into_iter().collect::<HashMap<_, _>>());

        let response = vaultrs::ssh::ca::sign(
            &client,
            &self.config.mount,
            &self.config.role,
            &request.public_key,
            Some(&mut opts),
        )
        .await
        .map_err(|e| {
            tracing::error!(
                error = %e,
                mount = %self.config.mount,
                role = %self.config.role,
                key_id = %request.key_id,
                "Vault refused to sign SSH user key"
            );
            classify(e)
        })?;

        tracing::info!(
            serial_number = %response.serial_number,
            key_id = %request.key_id,
            "Vault signed SSH user certificate"
        );

        Ok(response.signed_key)
    }
}
