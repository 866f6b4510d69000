//! Core types for the SonoCare chatbot
//!
//! This crate provides foundational types used across all other crates:
//! - LLM message, tool definition and tool call types
//! - Chat history held by the front end
//! - Synthesized speech audio
//! - Error types

pub mod audio;
pub mod conversation;
pub mod error;
pub mod llm_types;

pub use audio::SpeechAudio;
pub use conversation::{ChatHistory, ChatMessage, ChatRole};
pub use error::{Error, Result};
pub use llm_types::{
    FinishReason, GenerateResponse, Message, Role, TokenUsage, ToolCall, ToolDefinition,
};
