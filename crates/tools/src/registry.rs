//! Tool Registry
//!
//! Manages tool registration, discovery, and execution.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use sonocare_config::Settings;
use sonocare_core::llm_types::ToolDefinition;

use crate::domain_tools::{
    AppointmentBookingTool, OutOfScopeGuardrailTool, PreparationGuideTool, SearchInfoTool,
};
use crate::mcp::{Tool, ToolError, ToolOutput};
use crate::search::SearchProvider;

/// Tool executor trait
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute a tool by name
    async fn execute(&self, name: &str, arguments: Value) -> Result<ToolOutput, ToolError>;
}

/// Tool registry
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        self.tools.insert(name, Arc::new(tool));
    }

    /// Check if tool exists
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get all tool names, sorted
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Model-facing definitions for the named tools, in the given order
    ///
    /// Names that are not registered are skipped.
    pub fn definitions(&self, names: &[String]) -> Vec<ToolDefinition> {
        names
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.schema().to_definition())
            .collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolExecutor for ToolRegistry {
    /// Execute a tool with timeout protection
    async fn execute(&self, name: &str, arguments: Value) -> Result<ToolOutput, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::not_found(format!("Tool not found: {}", name)))?;

        tool.validate(&arguments)?;

        let timeout_secs = tool.timeout_secs();
        let timeout_duration = Duration::from_secs(timeout_secs);

        tracing::trace!(
            tool = name,
            timeout_secs = timeout_secs,
            "Executing tool with timeout"
        );

        match tokio::time::timeout(timeout_duration, tool.execute(arguments)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(ToolError::timeout(name, timeout_secs)),
        }
    }
}

/// Create the registry holding the four SonoCare tools
pub fn create_registry(settings: &Settings, search: Arc<dyn SearchProvider>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(PreparationGuideTool);
    registry.register(SearchInfoTool::new(search, settings.search.max_results));
    registry.register(AppointmentBookingTool::new(
        settings.agent.booking_form_link.clone(),
    ));
    registry.register(OutOfScopeGuardrailTool);

    tracing::info!(tool_count = registry.len(), "Created tool registry");

    registry
}
