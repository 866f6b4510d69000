//! Prompt Building
//!
//! Assembles the message list for a model call and builds JSON Schema tool
//! definitions.

use sonocare_core::conversation::ChatHistory;
use sonocare_core::llm_types::{Message, ToolDefinition};

/// Builder for creating ToolDefinition with JSON Schema parameters
///
/// # Example
/// ```ignore
/// let tool = ToolBuilder::new("preparation_guide_tool", "Preparation steps for a scan")
///     .param("query", "string", "Scan type, e.g. 'pelvic'", true)
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ToolBuilder {
    name: String,
    description: String,
    properties: serde_json::Map<String, serde_json::Value>,
    required: Vec<String>,
}

impl ToolBuilder {
    /// Create a new tool builder
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            properties: serde_json::Map::new(),
            required: Vec::new(),
        }
    }

    /// Add a parameter with type and description
    pub fn param(
        mut self,
        name: impl Into<String>,
        param_type: &str,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        let name = name.into();
        let mut prop = serde_json::Map::new();
        prop.insert("type".to_string(), serde_json::Value::String(param_type.to_string()));
        prop.insert("description".to_string(), serde_json::Value::String(description.into()));

        self.properties.insert(name.clone(), serde_json::Value::Object(prop));

        if required {
            self.required.push(name);
        }
        self
    }

    /// Build the ToolDefinition
    pub fn build(self) -> ToolDefinition {
        let parameters = serde_json::json!({
            "type": "object",
            "properties": self.properties,
            "required": self.required,
        });

        ToolDefinition::new(self.name, self.description, parameters)
    }
}

/// Builds the message list for one model call
#[derive(Debug, Default)]
pub struct PromptBuilder {
    messages: Vec<Message>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the agent's instructions as the system message
    pub fn system_prompt(mut self, instructions: &str) -> Self {
        self.messages.push(Message::system(instructions));
        self
    }

    /// Replay at most `max_messages` of the most recent history
    pub fn with_history(mut self, history: &ChatHistory, max_messages: usize) -> Self {
        self.messages
            .extend(history.last_n(max_messages).iter().map(Message::from));
        self
    }

    /// Add the current user input
    pub fn user_message(mut self, content: &str) -> Self {
        self.messages.push(Message::user(content));
        self
    }

    /// Append already-built messages (e.g. tool exchanges of this turn)
    pub fn extend(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    pub fn build(self) -> Vec<Message> {
        self.messages
    }
}
