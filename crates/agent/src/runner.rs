//! Agent runner
//!
//! Drives one chat turn: call the model with the current agent's
//! instructions and tools, execute the tool calls it asks for, switch agent on
//! a handoff, and repeat until the model answers in text or `max_turns` model
//! calls have been made.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use sonocare_core::conversation::ChatHistory;
use sonocare_core::llm_types::{Message, ToolCall, ToolDefinition};
use sonocare_llm::{LlmBackend, PromptBuilder, ToolBuilder};
use sonocare_tools::{ToolError, ToolExecutor, ToolOutput, ToolRegistry};

use crate::definition::{handoff_tool_name, AgentDefinition};
use crate::AgentError;

/// Outcome of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// Final text produced by the model
    pub final_output: String,
    /// Agent in control when the run finished
    pub last_agent: String,
    /// Model calls made
    pub turns: u32,
}

/// Agent runner
pub struct Runner {
    llm: Arc<dyn LlmBackend>,
    tools: Arc<ToolRegistry>,
    agents: HashMap<String, AgentDefinition>,
    max_turns: u32,
    max_history_messages: usize,
}

impl Runner {
    pub fn new(llm: Arc<dyn LlmBackend>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            llm,
            tools,
            agents: HashMap::new(),
            max_turns: sonocare_config::constants::agent::MAX_TURNS,
            max_history_messages: sonocare_config::constants::agent::MAX_HISTORY_MESSAGES,
        }
    }

    /// Register an agent (replaces one with the same name)
    pub fn with_agent(mut self, agent: AgentDefinition) -> Self {
        self.agents.insert(agent.name.clone(), agent);
        self
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_max_history(mut self, max_history_messages: usize) -> Self {
        self.max_history_messages = max_history_messages;
        self
    }

    pub fn agent(&self, name: &str) -> Result<&AgentDefinition, AgentError> {
        self.agents
            .get(name)
            .ok_or_else(|| AgentError::UnknownAgent(name.to_string()))
    }

    /// Tool and handoff definitions offered while `agent` is in control
    fn definitions_for(&self, agent: &AgentDefinition) -> Vec<ToolDefinition> {
        let mut defs = self.tools.definitions(&agent.tools);

        for target in &agent.handoffs {
            defs.push(
                ToolBuilder::new(
                    handoff_tool_name(target),
                    format!("Handoff to the {} agent to handle the request.", target),
                )
                .build(),
            );
        }

        defs
    }

    /// Handoff target named by a tool call, if the call is a handoff
    fn handoff_target<'a>(&self, agent: &'a AgentDefinition, tool_name: &str) -> Option<&'a str> {
        agent
            .handoffs
            .iter()
            .find(|target| handoff_tool_name(target) == tool_name)
            .map(String::as_str)
    }

    /// Run one user input to completion, starting with `starting_agent`
    pub async fn run(
        &self,
        starting_agent: &str,
        input: &str,
        history: &ChatHistory,
    ) -> Result<RunResult, AgentError> {
        let mut current = self.agent(starting_agent)?;
        // Tool exchanges of this run, replayed after the user input
        let mut exchanges: Vec<Message> = Vec::new();

        for turn in 1..=self.max_turns {
            let messages = PromptBuilder::new()
                .system_prompt(&current.instructions)
                .with_history(history, self.max_history_messages)
                .user_message(input)
                .extend(exchanges.iter().cloned())
                .build();
            let tools = self.definitions_for(current);

            let start = Instant::now();
            let response = self.llm.generate(&messages, &tools).await?;
            metrics::histogram!("sonocare_llm_latency_seconds").record(start.elapsed().as_secs_f64());

            tracing::debug!(
                agent = %current.name,
                turn,
                tool_calls = response.tool_calls.len(),
                finish_reason = ?response.finish_reason,
                "Model responded"
            );

            if !response.has_tool_calls() {
                return Ok(RunResult {
                    final_output: response.text,
                    last_agent: current.name.clone(),
                    turns: turn,
                });
            }

            exchanges.push(Message::assistant_tool_calls(
                response.text.clone(),
                response.tool_calls.clone(),
            ));

            let mut next_agent = None;
            for call in &response.tool_calls {
                if let Some(target) = self.handoff_target(current, &call.name) {
                    // First handoff in a batch wins
                    if next_agent.is_none() {
                        next_agent = Some(self.agent(target)?);
                    }
                    let ack = serde_json::json!({ "assistant": target }).to_string();
                    exchanges.push(Message::tool(ack, call.id.clone()));
                    continue;
                }

                let output = self.execute_tool(current, call).await?;
                exchanges.push(Message::tool(output.as_text(), call.id.clone()));
            }

            if let Some(next) = next_agent {
                tracing::info!(from = %current.name, to = %next.name, "Agent handoff");
                current = next;
            }
        }

        tracing::warn!(max_turns = self.max_turns, "Agent run exceeded max turns");
        Err(AgentError::MaxTurnsExceeded(self.max_turns))
    }

    /// Execute a tool call for the current agent
    ///
    /// Calling a tool the agent does not own is an error; failures inside a
    /// tool are reported back to the model as the tool's output.
    async fn execute_tool(
        &self,
        agent: &AgentDefinition,
        call: &ToolCall,
    ) -> Result<ToolOutput, AgentError> {
        if !agent.has_tool(&call.name) {
            return Err(ToolError::not_found(format!(
                "Tool {} not found in agent {}",
                call.name, agent.name
            ))
            .into());
        }

        tracing::info!(agent = %agent.name, tool = %call.name, "Calling tool");

        let output = self
            .tools
            .execute(&call.name, call.arguments_value())
            .await
            .unwrap_or_else(|e| {
                ToolOutput::error(format!("An error occurred while running the tool. Error: {}", e))
            });
        if output.is_error {
            tracing::warn!(tool = %call.name, output = %output.as_text(), "Tool execution failed");
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{information_guide_agent, ultrasound_agent};
    use sonocare_core::llm_types::GenerateResponse;
    use sonocare_llm::LlmError;
    use sonocare_tools::{OutOfScopeGuardrailTool, PreparationGuideTool};

    struct NeverCalled;

    #[async_trait::async_trait]
    impl LlmBackend for NeverCalled {
        async fn generate(&self, _: &[Message], _: &[ToolDefinition]) -> Result<GenerateResponse, LlmError> {
            Err(LlmError::Api("unexpected call".to_string()))
        }

        fn model_name(&self) -> &str {
            "never"
        }
    }

    fn runner() -> Runner {
        let mut registry = ToolRegistry::new();
        registry.register(PreparationGuideTool);
        registry.register(OutOfScopeGuardrailTool);

        Runner::new(Arc::new(NeverCalled), Arc::new(registry))
            .with_agent(ultrasound_agent())
            .with_agent(information_guide_agent())
    }

    #[test]
    fn test_router_definitions_include_handoff() {
        let runner = runner();
        let router = runner.agent("Ultrasound Assistant").unwrap();
        let names: Vec<String> = runner
            .definitions_for(router)
            .into_iter()
            .map(|d| d.name)
            .collect();

        // appointment_booking_tool is not registered in this runner
        assert_eq!(
            names,
            vec![
                "outofscope_guardrail_tool".to_string(),
                "transfer_to_information_guide_assistant".to_string(),
            ]
        );
    }

    #[test]
    fn test_handoff_target() {
        let runner = runner();
        let router = runner.agent("Ultrasound Assistant").unwrap();
        assert_eq!(
            runner.handoff_target(router, "transfer_to_information_guide_assistant"),
            Some("Information guide Assistant")
        );
        assert_eq!(runner.handoff_target(router, "search_info_tool"), None);
    }

    #[tokio::test]
    async fn test_unknown_starting_agent() {
        let result = runner().run("Nobody", "hi", &ChatHistory::new()).await;
        assert!(matches!(result, Err(AgentError::UnknownAgent(_))));
    }

    #[tokio::test]
    async fn test_tool_outside_agent_is_rejected() {
        let runner = runner();
        let router = runner.agent("Ultrasound Assistant").unwrap();
        let call = ToolCall::new("c1", "preparation_guide_tool", HashMap::new());
        let result = runner.execute_tool(router, &call).await;
        assert!(matches!(result, Err(AgentError::Tool(_))));
    }

    #[tokio::test]
    async fn test_tool_failure_is_reported_to_model() {
        let runner = runner();
        let info = runner.agent("Information guide Assistant").unwrap();
        // missing required `query`
        let call = ToolCall::new("c1", "preparation_guide_tool", HashMap::new());
        let output = runner.execute_tool(info, &call).await.unwrap();
        assert!(output.is_error);
        assert!(output.as_text().starts_with("An error occurred while running the tool."));
    }

    #[tokio::test]
    async fn test_llm_error_propagates() {
        let result = runner()
            .run("Ultrasound Assistant", "hi", &ChatHistory::new())
            .await;
        assert!(matches!(result, Err(AgentError::Llm(_))));
    }
}
