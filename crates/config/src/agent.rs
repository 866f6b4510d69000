//! Agent configuration
//!
//! Runtime limits for the router/information agents, the output safety filter
//! and the booking link handed out by the booking tool.

use serde::{Deserialize, Serialize};

use crate::constants::{agent, texts};

/// Agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum model calls per chat request
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,

    /// Maximum prior history messages replayed to the model
    #[serde(default = "default_max_history")]
    pub max_history_messages: usize,

    /// Appointment booking form URL
    #[serde(default = "default_booking_form_link")]
    pub booking_form_link: String,

    /// Output safety filter
    #[serde(default)]
    pub safety: SafetyConfig,
}

fn default_max_turns() -> u32 {
    agent::MAX_TURNS
}
fn default_max_history() -> usize {
    agent::MAX_HISTORY_MESSAGES
}
fn default_booking_form_link() -> String {
    texts::BOOKING_FORM_LINK.to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            max_history_messages: default_max_history(),
            booking_form_link: default_booking_form_link(),
            safety: SafetyConfig::default(),
        }
    }
}

/// Output safety filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyConfig {
    /// Disable to pass model output through untouched
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Substrings that cause the response to be replaced
    #[serde(default = "default_undesired_phrases")]
    pub undesired_phrases: Vec<String>,

    /// Replacement text
    #[serde(default = "default_apology")]
    pub apology: String,
}

fn default_true() -> bool {
    true
}
fn default_undesired_phrases() -> Vec<String> {
    texts::UNDESIRED_PHRASES
        .iter()
        .map(|p| p.to_string())
        .collect()
}
fn default_apology() -> String {
    texts::SAFETY_APOLOGY.to_string()
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            undesired_phrases: default_undesired_phrases(),
            apology: default_apology(),
        }
    }
}
