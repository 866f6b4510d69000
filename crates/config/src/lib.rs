//! Configuration management for the SonoCare chatbot
//!
//! Supports loading configuration from:
//! - YAML/TOML files under `config/`
//! - Environment variables (`SONOCARE__` prefix, `__` separator)
//! - The provider key in `GEMINI_API_KEY`

pub mod agent;
pub mod constants;
pub mod settings;

pub use agent::{AgentConfig, SafetyConfig};
pub use settings::{
    load_settings, load_settings_from, LlmSettings, ObservabilityConfig, RuntimeEnvironment,
    SearchConfig, ServerConfig, Settings, TtsConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(path) => ConfigError::FileNotFound(path),
            other => ConfigError::ParseError(other.to_string()),
        }
    }
}

impl From<ConfigError> for sonocare_core::Error {
    fn from(err: ConfigError) -> Self {
        sonocare_core::Error::Config(err.to_string())
    }
}
