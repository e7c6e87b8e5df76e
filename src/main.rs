use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use sshca::{
    api::{shutdown_signal, start_api_server},
    config::{AppConfig, CONFIG_FILE_ENV},
    observability::{init_logging, log_config_info},
    startup::build_application,
    APP_NAME, VERSION,
};

/// SSH certificate authority
#[derive(Parser, Debug)]
#[command(name = "sshca", version, about)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, env = CONFIG_FILE_ENV)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists; must happen before config is read
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    init_logging(&config.observability).context("failed to initialize logging")?;

    info!(app_name = APP_NAME, version = VERSION, "Starting SSH certificate authority");
    log_config_info(&config);

    let server_config = config.server.clone();
    let app = build_application(config).await.context("failed to start certificate authority")?;

    let result = start_api_server(&server_config, app.router.clone(), shutdown_signal()).await;
    if let Err(e) = &result {
        error!(error = %e, "API server terminated with error");
    }

    app.shutdown().await;
    result.context("API server failed")
}
