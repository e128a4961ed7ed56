//! Krishi application binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize tracing
//! 3. Either chat in the terminal (`--repl`) or serve the REST API

mod cli;
mod repl;

use clap::Parser;

use krishi_api::{start_server, AppState};
use krishi_core::config::KrishiConfig;

use crate::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing starts so its log level can apply.
    let config_file = args.resolve_config_path();
    let loaded = KrishiConfig::load(&config_file);

    let file_level = loaded
        .as_ref()
        .map(|c| c.general.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    let log_level = args.resolve_log_level().unwrap_or(file_level);

    // Tracing goes to stderr so terminal chat output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Krishi v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match loaded {
        Ok(config) => {
            tracing::info!(path = %config_file.display(), "Configuration loaded");
            config
        }
        Err(e) if config_file.exists() => {
            tracing::warn!(path = %config_file.display(), error = %e, "Invalid config, using defaults");
            KrishiConfig::default()
        }
        Err(_) => {
            tracing::info!(path = %config_file.display(), "No config file, using defaults");
            KrishiConfig::default()
        }
    };

    config.general.port = args.resolve_port(config.general.port);
    config.general.log_level = log_level;
    config.general.default_locale = args.resolve_locale(config.general.default_locale)?;

    if args.repl {
        return repl::run(&config).await;
    }

    let state = AppState::new(config.clone())?;
    tracing::info!(
        session_id = %state.engine().session_id(),
        locale = %config.general.default_locale,
        "Conversation ready"
    );

    start_server(&config, state).await?;
    tracing::info!("Krishi stopped");
    Ok(())
}
