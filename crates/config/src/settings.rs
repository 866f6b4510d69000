//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{endpoints, env, models, timeouts};
use crate::{AgentConfig, ConfigError};

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - missing API key is only a warning
    #[default]
    Development,
    /// Staging mode
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if strict validation should be applied
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Chat model configuration
    #[serde(default)]
    pub llm: LlmSettings,

    /// Agent runtime configuration
    #[serde(default)]
    pub agent: AgentConfig,

    /// Web search configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Text-to-speech configuration
    #[serde(default)]
    pub tts: TtsConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_llm()?;
        self.validate_agent()?;
        self.validate_search()?;
        self.validate_tts()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        let server = &self.server;

        if server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if self.environment.is_production() && server.cors_enabled && server.cors_origins.is_empty()
        {
            tracing::warn!(
                "CORS is enabled in production but no origins are configured. \
                 This may block legitimate requests."
            );
        }

        Ok(())
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        let llm = &self.llm;

        if !llm.endpoint.starts_with("http://") && !llm.endpoint.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "llm.endpoint".to_string(),
                message: format!("Must be an http(s) URL, got '{}'", llm.endpoint),
            });
        }

        if llm.model.trim().is_empty() {
            return Err(ConfigError::MissingField("llm.model".to_string()));
        }

        if !(0.0..=2.0).contains(&llm.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "llm.temperature".to_string(),
                message: format!("Must be between 0.0 and 2.0, got {}", llm.temperature),
            });
        }

        if llm.max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.max_tokens".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if llm.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if llm.api_key().is_none() {
            if self.environment.is_strict() {
                return Err(ConfigError::MissingField(format!(
                    "llm.api_key (or {})",
                    env::API_KEY
                )));
            }
            tracing::warn!(
                "{} is not set; chat requests will fail until an API key is configured",
                env::API_KEY
            );
        }

        Ok(())
    }

    fn validate_agent(&self) -> Result<(), ConfigError> {
        if self.agent.max_turns == 0 {
            return Err(ConfigError::InvalidValue {
                field: "agent.max_turns".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if self.agent.safety.enabled && self.agent.safety.apology.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "agent.safety.apology".to_string(),
                message: "Apology text cannot be empty when the filter is enabled".to_string(),
            });
        }

        Ok(())
    }

    fn validate_search(&self) -> Result<(), ConfigError> {
        if !(1..=10).contains(&self.search.max_results) {
            return Err(ConfigError::InvalidValue {
                field: "search.max_results".to_string(),
                message: format!("Must be between 1 and 10, got {}", self.search.max_results),
            });
        }

        if self.search.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }

    fn validate_tts(&self) -> Result<(), ConfigError> {
        if self.tts.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "tts.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if self.tts.enabled && self.tts.voice.trim().is_empty() {
            return Err(ConfigError::MissingField("tts.voice".to_string()));
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: default_true(),
            cors_origins: Vec::new(),
        }
    }
}

/// Chat model configuration (OpenAI-compatible endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Base URL of the chat completions API
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// API key; falls back to GEMINI_API_KEY
    #[serde(default = "default_api_key", skip_serializing)]
    pub api_key: Option<String>,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate per call
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,

    /// Retries for transient network / 5xx failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl LlmSettings {
    /// Non-empty API key, if any
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

fn default_llm_endpoint() -> String {
    endpoints::GEMINI_OPENAI_COMPAT.to_string()
}
fn default_llm_model() -> String {
    models::CHAT_DEFAULT.to_string()
}
fn default_api_key() -> Option<String> {
    std::env::var(env::API_KEY).ok().filter(|k| !k.is_empty())
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> usize {
    1024
}
fn default_llm_timeout() -> u64 {
    timeouts::LLM_REQUEST_SECS
}
fn default_max_retries() -> u32 {
    2
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            api_key: default_api_key(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_llm_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

/// Web search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search API endpoint
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Maximum results included in a tool answer
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Request timeout in seconds
    #[serde(default = "default_search_timeout")]
    pub timeout_seconds: u64,
}

fn default_search_endpoint() -> String {
    endpoints::DUCKDUCKGO_API.to_string()
}
fn default_max_results() -> usize {
    3
}
fn default_search_timeout() -> u64 {
    timeouts::SEARCH_SECS
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            max_results: default_max_results(),
            timeout_seconds: default_search_timeout(),
        }
    }
}

/// Text-to-speech configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    /// Allow clients to request audio
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Gemini REST base URL
    #[serde(default = "default_tts_endpoint")]
    pub endpoint: String,

    /// TTS model
    #[serde(default = "default_tts_model")]
    pub model: String,

    /// Prebuilt voice name
    #[serde(default = "default_tts_voice")]
    pub voice: String,

    /// API key; falls back to GEMINI_API_KEY
    #[serde(default = "default_api_key", skip_serializing)]
    pub api_key: Option<String>,

    /// Fixed request timeout in seconds
    #[serde(default = "default_tts_timeout")]
    pub timeout_seconds: u64,

    /// When set, every synthesized clip is also written here as WAV
    #[serde(default)]
    pub debug_audio_path: Option<String>,
}

impl TtsConfig {
    /// Non-empty API key, if any
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

fn default_tts_endpoint() -> String {
    endpoints::GEMINI_NATIVE.to_string()
}
fn default_tts_model() -> String {
    models::TTS_DEFAULT.to_string()
}
fn default_tts_voice() -> String {
    models::TTS_VOICE_DEFAULT.to_string()
}
fn default_tts_timeout() -> u64 {
    timeouts::TTS_SECS
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_tts_endpoint(),
            model: default_tts_model(),
            voice: default_tts_voice(),
            api_key: default_api_key(),
            timeout_seconds: default_tts_timeout(),
            debug_audio_path: None,
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Expose Prometheus metrics at /metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (SONOCARE__ prefix, `__` separator)
/// 2. config/{env}.yaml (if env specified)
/// 3. config/default.yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings with an explicit config directory
pub fn load_settings_from(config_dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    let default_path = config_dir.join("default");
    builder = builder.add_source(File::with_name(&default_path.to_string_lossy()).required(false));

    if let Some(env_name) = env {
        let env_path = config_dir.join(env_name);
        builder = builder.add_source(File::with_name(&env_path.to_string_lossy()).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix(env::PREFIX)
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
