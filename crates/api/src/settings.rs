//! Service Settings
//!
//! Layered from built-in defaults, an optional TOML file (`emi.toml`, or the
//! path in `EMI_CONFIG`) and `EMI__`-prefixed environment variables, e.g.
//! `EMI__SERVER__BIND_ADDR=127.0.0.1:9000`.

use crate::rate_limit::RateLimitConfig;
use config::{Config, Environment, File};
use data_validator::ValidationConfig;
use inference_engine::ModelConfig;
use serde::{Deserialize, Serialize};

/// Default settings file
pub const DEFAULT_CONFIG_PATH: &str = "emi.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub models: ModelConfig,
    pub validation: ValidationConfig,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    pub rate_limit: RateLimitConfig,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Maximum level: trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Load from `EMI_CONFIG` (or `emi.toml`) and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var("EMI_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load from a specific file, which may be absent, and the environment
    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("EMI").separator("__"))
            .build()?
            .try_deserialize()
    }
}
