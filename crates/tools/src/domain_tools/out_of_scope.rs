//! Out-of-scope Guardrail Tool

use async_trait::async_trait;
use serde_json::Value;

use crate::mcp::{InputSchema, PropertySchema, Tool, ToolError, ToolOutput, ToolSchema};

/// Fixed refusal for requests outside ultrasound information and booking
pub const OUT_OF_SCOPE_REPLY: &str = "I am sorry, but I can only assist with questions about ultrasound information and appointment booking. Please ask me about those topics.";

/// Out-of-scope guardrail tool
///
/// The `query` argument is accepted for the model's benefit and ignored.
pub struct OutOfScopeGuardrailTool;

#[async_trait]
impl Tool for OutOfScopeGuardrailTool {
    fn name(&self) -> &str {
        "outofscope_guardrail_tool"
    }

    fn description(&self) -> &str {
        "Politely declines requests unrelated to ultrasound information or appointment booking."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object().property(
                "query",
                PropertySchema::string("The user's request"),
                true,
            ),
        }
    }

    async fn execute(&self, _input: Value) -> Result<ToolOutput, ToolError> {
        Ok(ToolOutput::text(OUT_OF_SCOPE_REPLY))
    }
}
