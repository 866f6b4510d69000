//! Agent runtime for the SonoCare chatbot
//!
//! Features:
//! - Agent definitions: the router agent and the information agent
//! - Handoffs presented to the model as `transfer_to_*` tools
//! - `Runner`: bounded model/tool loop for one chat turn
//! - Output safety filter
//! - `ChatService`: the per-turn entry point that never fails

pub mod definition;
pub mod runner;
pub mod safety;
pub mod service;

pub use definition::{
    handoff_tool_name, information_guide_agent, ultrasound_agent, AgentDefinition,
    INFORMATION_AGENT_NAME, ROUTER_AGENT_NAME,
};
pub use runner::{RunResult, Runner};
pub use safety::{check_output_for_safety, SafetyFilter};
pub use service::{ChatReply, ChatService};

use thiserror::Error;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Max turns ({0}) exceeded")]
    MaxTurnsExceeded(u32),

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),
}

impl From<sonocare_llm::LlmError> for AgentError {
    fn from(err: sonocare_llm::LlmError) -> Self {
        AgentError::Llm(err.to_string())
    }
}

impl From<sonocare_tools::ToolError> for AgentError {
    fn from(err: sonocare_tools::ToolError) -> Self {
        AgentError::Tool(err.to_string())
    }
}
