//! Tool trait — the abstraction over agent capabilities.
//!
//! Tools are what let the agent act on data: load a CSV, inspect a
//! dataframe, run generated analysis code, render a chart. The orchestrator
//! never inspects tool internals — only the [`ToolResult`] union that every
//! invocation returns.

use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A tool's machine-readable contract, enumerated in every prompt.
///
/// Immutable after registration. The parameter schema is JSON-schema-shaped
/// and serves as prompt documentation only — the registry does not validate
/// arguments against it; mismatches surface as handler-level errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Unique name across the registry (e.g., "inspect_dataset").
    pub name: String,

    /// Description of what the tool does (sent to the LLM).
    pub description: String,

    /// JSON Schema describing the tool's parameters.
    pub parameters: serde_json::Value,
}

/// The outcome of one tool invocation.
///
/// Failure is a first-class, inspectable value rather than a fault crossing
/// the dispatch boundary — tool-level errors are recoverable and the loop
/// continues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ToolResult {
    Success {
        /// Human-readable output, fed back to the model as an observation.
        payload: String,

        /// Optional structured data (e.g., a chart filepath).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
    Error {
        message: String,
    },
}

impl ToolResult {
    pub fn success(payload: impl Into<String>) -> Self {
        Self::Success {
            payload: payload.into(),
            metadata: None,
        }
    }

    pub fn success_with(payload: impl Into<String>, metadata: serde_json::Value) -> Self {
        Self::Success {
            payload: payload.into(),
            metadata: Some(metadata),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Structured data attached to a successful result, if any.
    pub fn metadata(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Success { metadata, .. } => metadata.as_ref(),
            Self::Error { .. } => None,
        }
    }

    /// A length-bounded summary for the conversation memory.
    ///
    /// Keeps prompts small: success payloads are truncated to `budget`
    /// characters, errors are prefixed so the model can recognize them.
    pub fn summary(&self, budget: usize) -> String {
        match self {
            Self::Success { payload, .. } => {
                if payload.chars().count() > budget {
                    let truncated: String = payload.chars().take(budget).collect();
                    format!("{truncated}...")
                } else {
                    payload.clone()
                }
            }
            Self::Error { message } => format!("Error: {message}"),
        }
    }
}

/// The core Tool trait.
///
/// Each tool (load_csv, list_datasets, inspect_dataset, analyze, visualize)
/// implements this trait. Tools are registered in the ToolRegistry and made
/// available to the orchestration loop.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "list_datasets").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given parameters.
    ///
    /// A returned `Err` is converted into `ToolResult::Error` at the
    /// registry boundary; handlers may use either channel for failures.
    async fn execute(&self, params: serde_json::Value)
    -> std::result::Result<ToolResult, ToolError>;

    /// Convert this tool into a ToolSpec for prompt documentation.
    fn to_spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools.
///
/// The orchestration loop uses this to:
/// 1. Enumerate tool specs for the prompt assembler
/// 2. Dispatch the model's chosen action by name
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// All tool specs, sorted by name for deterministic prompts.
    pub fn specs(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self.tools.values().map(|t| t.to_spec()).collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Dispatch a tool by name. Never fails: an unknown name or a handler
    /// fault comes back as `ToolResult::Error` — the orchestrator feeds it to
    /// the model as an observation and the loop continues.
    pub async fn invoke(&self, name: &str, params: serde_json::Value) -> ToolResult {
        let Some(tool) = self.tools.get(name) else {
            return ToolResult::error(format!("Tool '{name}' not found"));
        };

        match tool.execute(params).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "tool handler failed");
                ToolResult::error(e.to_string())
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                },
                "required": ["text"]
            })
        }
        async fn execute(
            &self,
            params: serde_json::Value,
        ) -> std::result::Result<ToolResult, ToolError> {
            let text = params["text"].as_str().unwrap_or("").to_string();
            Ok(ToolResult::success(text))
        }
    }

    /// A tool whose handler always returns Err.
    struct FaultyTool;

    #[async_trait]
    impl Tool for FaultyTool {
        fn name(&self) -> &str {
            "faulty"
        }
        fn description(&self) -> &str {
            "Always fails"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({"type": "object", "properties": {}})
        }
        async fn execute(
            &self,
            _params: serde_json::Value,
        ) -> std::result::Result<ToolResult, ToolError> {
            Err(ToolError::ExecutionFailed {
                tool_name: "faulty".into(),
                reason: "boom".into(),
            })
        }
    }

    #[test]
    fn registry_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn specs_are_sorted_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(FaultyTool));
        registry.register(Box::new(EchoTool));
        let specs = registry.specs();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "echo");
        assert_eq!(specs[1].name, "faulty");
    }

    #[tokio::test]
    async fn invoke_dispatches_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));

        let result = registry
            .invoke("echo", serde_json::json!({"text": "hello world"}))
            .await;
        assert_eq!(result, ToolResult::success("hello world"));
    }

    #[tokio::test]
    async fn invoke_unknown_tool_is_an_error_value() {
        let registry = ToolRegistry::new();
        let result = registry.invoke("nonexistent", serde_json::json!({})).await;
        assert_eq!(result, ToolResult::error("Tool 'nonexistent' not found"));
    }

    #[tokio::test]
    async fn invoke_unknown_tool_is_idempotent() {
        let registry = ToolRegistry::new();
        let first = registry.invoke("ghost", serde_json::json!({})).await;
        let second = registry.invoke("ghost", serde_json::json!({})).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn handler_fault_becomes_error_result() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(FaultyTool));

        let result = registry.invoke("faulty", serde_json::json!({})).await;
        match result {
            ToolResult::Error { message } => assert!(message.contains("boom")),
            other => panic!("expected error result, got {other:?}"),
        }
    }

    #[test]
    fn summary_truncates_long_payloads() {
        let result = ToolResult::success("x".repeat(600));
        let summary = result.summary(500);
        assert_eq!(summary.chars().count(), 503);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn summary_prefixes_errors() {
        let result = ToolResult::error("column not found");
        assert_eq!(result.summary(500), "Error: column not found");
    }

    #[test]
    fn tool_spec_from_tool() {
        let spec = EchoTool.to_spec();
        assert_eq!(spec.name, "echo");
        assert!(spec.parameters["properties"]["text"].is_object());
    }
}
