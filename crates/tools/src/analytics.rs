//! Analytics tools — generate analysis/chart code with the model, execute
//! it via the execution service.
//!
//! These are thin wrappers: the model writes the code, the sidecar runs it.
//! Their LLM calls go through the same rate-limit classification and backoff
//! schedule as the gateway's decision calls.

use crate::executor::ExecutionService;
use crate::store::DatasetStore;
use async_trait::async_trait;
use chrono::Utc;
use dataloom_core::error::ToolError;
use dataloom_core::provider::{GenerateRequest, Provider};
use dataloom_core::retry::RetryPolicy;
use dataloom_core::tool::{Tool, ToolResult};
use std::sync::Arc;
use tracing::warn;

/// Generate and execute analysis code for a data question.
pub struct AnalyzeTool {
    provider: Arc<dyn Provider>,
    executor: Arc<dyn ExecutionService>,
    store: Arc<DatasetStore>,
    policy: RetryPolicy,
}

impl AnalyzeTool {
    pub fn new(
        provider: Arc<dyn Provider>,
        executor: Arc<dyn ExecutionService>,
        store: Arc<DatasetStore>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            executor,
            store,
            policy,
        }
    }

    fn build_prompt(&self, query: &str, aliases: &[String]) -> String {
        format!(
            "Generate pandas code: {query}\n\n\
             Datasets:\n{}\n\n\
             Requirements:\n\
             - Store the final value in a variable named 'result'\n\
             - Use pandas/numpy only\n\
             - Return ONLY code\n\n\
             Example:\n\
             Query: \"Average price\"\n\
             Code: result = df['price'].mean()\n\n\
             Your code:",
            dataset_lines(&self.store, aliases)
        )
    }
}

#[async_trait]
impl Tool for AnalyzeTool {
    fn name(&self) -> &str {
        "analyze"
    }

    fn description(&self) -> &str {
        "Generate and execute analysis code to answer a data question with numbers."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "What to compute" },
                "dataset_aliases": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Datasets the code may use"
                }
            },
            "required": ["query", "dataset_aliases"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = require_str(&params, "query")?;
        let aliases = require_aliases(&params)?;

        let prompt = self.build_prompt(query, &aliases);
        let code = match generate_code(self.provider.as_ref(), &self.policy, &prompt).await {
            Ok(code) => code,
            Err(message) => return Ok(ToolResult::error(message)),
        };
        if code.is_empty() {
            return Ok(ToolResult::error("Failed to generate code"));
        }

        match self.executor.run(&code, &aliases).await {
            Ok(output) => Ok(ToolResult::success_with(
                output.result,
                serde_json::json!({ "generated_code": code, "stdout": output.stdout }),
            )),
            Err(e) => Ok(ToolResult::error(e.to_string())),
        }
    }
}

/// Generate and execute chart code, saving the figure to a file.
pub struct VisualizeTool {
    provider: Arc<dyn Provider>,
    executor: Arc<dyn ExecutionService>,
    store: Arc<DatasetStore>,
    policy: RetryPolicy,
}

impl VisualizeTool {
    pub fn new(
        provider: Arc<dyn Provider>,
        executor: Arc<dyn ExecutionService>,
        store: Arc<DatasetStore>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            executor,
            store,
            policy,
        }
    }

    fn build_prompt(&self, query: &str, aliases: &[String], chart_type: Option<&str>) -> String {
        let hint = match chart_type {
            Some(kind) => format!("\nChart type: {kind}"),
            None => String::new(),
        };
        format!(
            "Generate matplotlib code: {query}\n\n\
             Datasets:\n{}{hint}\n\n\
             Requirements:\n\
             - Use matplotlib/seaborn\n\
             - Add a title and axis labels\n\
             - Do NOT call plt.show()\n\
             - Return ONLY code\n\n\
             Your code:",
            dataset_lines(&self.store, aliases)
        )
    }
}

#[async_trait]
impl Tool for VisualizeTool {
    fn name(&self) -> &str {
        "visualize"
    }

    fn description(&self) -> &str {
        "Generate and execute chart code; saves the figure to a PNG file."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "What to plot" },
                "dataset_aliases": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Datasets the chart may use"
                },
                "chart_type": { "type": "string", "description": "Optional chart kind (bar, line, ...)" }
            },
            "required": ["query", "dataset_aliases"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = require_str(&params, "query")?;
        let aliases = require_aliases(&params)?;
        let chart_type = params["chart_type"].as_str();

        let prompt = self.build_prompt(query, &aliases, chart_type);
        let code = match generate_code(self.provider.as_ref(), &self.policy, &prompt).await {
            Ok(code) => code,
            Err(message) => return Ok(ToolResult::error(message)),
        };
        if code.is_empty() {
            return Ok(ToolResult::error("Failed to generate code"));
        }

        let filepath = format!("plot_{}.png", Utc::now().timestamp());
        match self.executor.render_chart(&code, &aliases, &filepath).await {
            Ok(()) => Ok(ToolResult::success_with(
                format!("Saved chart to '{filepath}'"),
                serde_json::json!({
                    "filepath": filepath,
                    "chart_type": chart_type.unwrap_or("chart"),
                }),
            )),
            Err(e) => Ok(ToolResult::error(e.to_string())),
        }
    }
}

// ── Shared helpers ────────────────────────────────────────────────────────

/// One line per known alias: `- alias: [col, col, ...]`. Unknown aliases are
/// skipped; the execution service reports its own missing-dataset errors.
fn dataset_lines(store: &DatasetStore, aliases: &[String]) -> String {
    let lines: Vec<String> = aliases
        .iter()
        .filter_map(|alias| {
            store.with(alias, |dataset| {
                format!("- {}: [{}]", alias, dataset.column_names.join(", "))
            })
        })
        .collect();
    lines.join("\n")
}

/// Call the model for code, retrying rate limits on the shared schedule.
/// Returns the extracted code, or an error message for the observation.
async fn generate_code(
    provider: &dyn Provider,
    policy: &RetryPolicy,
    prompt: &str,
) -> Result<String, String> {
    for attempt in 0..policy.max_retries {
        match provider.generate(GenerateRequest::new(prompt)).await {
            Ok(response) => return Ok(extract_code(&response.text)),
            Err(e) => {
                let message = e.to_string();
                if policy.should_retry(&message, attempt) {
                    let delay = policy.delay_for(attempt);
                    warn!(
                        attempt = attempt + 1,
                        delay_secs = delay.as_secs_f64(),
                        "code generation rate limited, backing off"
                    );
                    tokio::time::sleep(delay).await;
                } else {
                    return Err(message);
                }
            }
        }
    }
    Err("Failed to generate code after retries".into())
}

/// Strip a markdown fence from generated code, preferring a ```python fence.
fn extract_code(text: &str) -> String {
    if let Some(start) = text.find("```python") {
        let rest = &text[start + "```python".len()..];
        if let Some(end) = rest.find("```") {
            return rest[..end].trim().to_string();
        }
    }
    if let Some(start) = text.find("```") {
        let rest = &text[start + 3..];
        if let Some(end) = rest.find("```") {
            return rest[..end].trim().to_string();
        }
    }
    text.trim().to_string()
}

fn require_str<'a>(params: &'a serde_json::Value, key: &str) -> Result<&'a str, ToolError> {
    params[key]
        .as_str()
        .ok_or_else(|| ToolError::InvalidArguments(format!("Missing '{key}' parameter")))
}

fn require_aliases(params: &serde_json::Value) -> Result<Vec<String>, ToolError> {
    let array = params["dataset_aliases"].as_array().ok_or_else(|| {
        ToolError::InvalidArguments("Missing 'dataset_aliases' parameter".into())
    })?;
    Ok(array
        .iter()
        .filter_map(|v| v.as_str().map(String::from))
        .collect())
}
