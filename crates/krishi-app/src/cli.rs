//! CLI argument definitions for the Krishi application.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use krishi_core::error::KrishiError;
use krishi_core::types::Locale;

/// Krishi: a bilingual farming assistant for Kerala.
#[derive(Parser, Debug)]
#[command(name = "krishi", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Conversation language to start in (en, ml).
    #[arg(long = "locale")]
    pub locale: Option<String>,

    /// Chat in the terminal instead of serving the API.
    #[arg(long = "repl")]
    pub repl: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > KRISHI_CONFIG env var > ~/.krishi/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("KRISHI_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the API server port.
    ///
    /// Priority: --port flag > KRISHI_PORT env var > config file value > 3040.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        if let Some(p) = self.port {
            return p;
        }
        if let Ok(val) = std::env::var("KRISHI_PORT") {
            if let Ok(p) = val.parse::<u16>() {
                return p;
            }
        }
        if config_port != 0 {
            return config_port;
        }
        3040
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    /// Returns `None` if not overridden.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }

    /// Resolve the starting locale.
    ///
    /// Priority: --locale flag > KRISHI_LOCALE env var > config file value.
    /// An unsupported code is an error rather than a silent fallback.
    pub fn resolve_locale(&self, config_locale: Locale) -> Result<Locale, KrishiError> {
        if let Some(ref code) = self.locale {
            return code.parse();
        }
        if let Ok(code) = std::env::var("KRISHI_LOCALE") {
            return code.parse();
        }
        Ok(config_locale)
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".krishi").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".krishi").join("config.toml");
    }
    PathBuf::from("config.toml")
}
