//! Chat model integration
//!
//! Features:
//! - `LlmBackend` trait over chat-completion style models
//! - OpenAI-compatible backend (Gemini, OpenAI, local servers) with native tool calls
//! - Retry with exponential backoff for transient failures
//! - Prompt and tool-definition builders

pub mod backend;
pub mod prompt;

pub use backend::{LlmBackend, LlmConfig, OpenAIBackend};
pub use prompt::{PromptBuilder, ToolBuilder};
pub use sonocare_core::llm_types::{
    FinishReason, GenerateResponse, Message, Role, TokenUsage, ToolCall, ToolDefinition,
};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for sonocare_core::Error {
    fn from(err: LlmError) -> Self {
        sonocare_core::Error::Llm(err.to_string())
    }
}
