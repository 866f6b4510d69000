//! Agent definitions
//!
//! An agent is a named set of instructions plus the tools and handoff targets
//! the model may use while that agent is in control.

pub const ROUTER_AGENT_NAME: &str = "Ultrasound Assistant";
pub const INFORMATION_AGENT_NAME: &str = "Information guide Assistant";

/// Agent definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDefinition {
    pub name: String,
    pub instructions: String,
    /// Registry names of the tools this agent may call
    pub tools: Vec<String>,
    /// Names of agents this agent may hand off to
    pub handoffs: Vec<String>,
}

impl AgentDefinition {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            tools: Vec::new(),
            handoffs: Vec::new(),
        }
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tools.push(tool.into());
        self
    }

    pub fn with_handoff(mut self, agent: impl Into<String>) -> Self {
        self.handoffs.push(agent.into());
        self
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t == name)
    }
}

/// Tool name under which a handoff to `agent_name` is offered to the model
///
/// `"Information guide Assistant"` becomes `transfer_to_information_guide_assistant`.
pub fn handoff_tool_name(agent_name: &str) -> String {
    let mut snake = String::with_capacity(agent_name.len());
    for c in agent_name.chars() {
        if c.is_ascii_alphanumeric() {
            snake.push(c.to_ascii_lowercase());
        } else if !snake.ends_with('_') && !snake.is_empty() {
            snake.push('_');
        }
    }
    format!("transfer_to_{}", snake.trim_end_matches('_'))
}

/// Answers ultrasound questions with web search and the preparation guides
pub fn information_guide_agent() -> AgentDefinition {
    AgentDefinition::new(
        INFORMATION_AGENT_NAME,
        "You will provide the information of ultrasound to the users according to their queries",
    )
    .with_tool("search_info_tool")
    .with_tool("preparation_guide_tool")
}

/// Entry agent that decides intent and routes
pub fn ultrasound_agent() -> AgentDefinition {
    let instructions = format!(
        "You are the central assistant for SonoCare. Your role is to determine the user's intent and hand off the conversation to the correct specialized agent.\n\
         - If the user is asking for information or a preparation guide about ultrasound, hand off the conversation to the '{}' agent.\n\
         - If the user is trying to book an appointment, you must provide the booking form link by calling the 'appointment_booking_tool'.\n\
         - If the user's request is not related to these two topics, you must hand off to the outofscope_guardrail_tool.",
        INFORMATION_AGENT_NAME
    );

    AgentDefinition::new(ROUTER_AGENT_NAME, instructions)
        .with_tool("appointment_booking_tool")
        .with_tool("outofscope_guardrail_tool")
        .with_handoff(INFORMATION_AGENT_NAME)
}
