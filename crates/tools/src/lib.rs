//! MCP Tools for the SonoCare chatbot
//!
//! Implements an MCP (Model Context Protocol) compatible tool interface with
//! the domain tools the agents call, plus the web search provider behind
//! `search_info_tool`.

pub mod domain_tools;
pub mod mcp;
pub mod registry;
pub mod search;

pub use domain_tools::{
    preparation_guide, AppointmentBookingTool, OutOfScopeGuardrailTool, PreparationGuideTool,
    SearchInfoTool, OUT_OF_SCOPE_REPLY, PREPARATION_NOT_AVAILABLE,
};
pub use mcp::{
    ContentBlock, ErrorCode, InputSchema, PropertySchema, Tool, ToolError, ToolOutput, ToolSchema,
};
pub use registry::{create_registry, ToolExecutor, ToolRegistry};
pub use search::{
    format_results, DuckDuckGoSearch, SearchError, SearchProvider, SearchResult, NO_RESULTS,
};
