use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{KrishiError, Result};
use crate::types::Locale;

/// Top-level configuration for the Krishi assistant.
///
/// Loaded from `~/.krishi/config.toml` by default. Missing sections and
/// fields fall back to their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KrishiConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

impl KrishiConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: KrishiConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let chat = &self.chat;
        if chat.min_latency_ms > chat.max_latency_ms {
            return Err(KrishiError::Config(format!(
                "chat.min_latency_ms ({}) exceeds chat.max_latency_ms ({})",
                chat.min_latency_ms, chat.max_latency_ms
            )));
        }
        if chat.response_timeout_ms == 0 {
            return Err(KrishiError::Config(
                "chat.response_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if chat.max_message_chars == 0 {
            return Err(KrishiError::Config(
                "chat.max_message_chars must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// API server port.
    pub port: u16,
    /// Locale active when a conversation starts.
    pub default_locale: Locale,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            port: 3040,
            default_locale: Locale::English,
        }
    }
}

/// Conversation engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Lower bound of the simulated reply delay.
    pub min_latency_ms: u64,
    /// Upper bound of the simulated reply delay. Equal bounds give a fixed delay.
    pub max_latency_ms: u64,
    /// Replies slower than this are replaced with the fallback response.
    pub response_timeout_ms: u64,
    /// Push a welcome message when a conversation starts.
    pub seed_welcome: bool,
    /// Longest message accepted over the API, in characters.
    pub max_message_chars: usize,
    /// Optional TOML rule catalog replacing the built-in one.
    pub rules_path: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            min_latency_ms: 2000,
            max_latency_ms: 2000,
            response_timeout_ms: 10_000,
            seed_welcome: true,
            max_message_chars: 2000,
            rules_path: None,
        }
    }
}
