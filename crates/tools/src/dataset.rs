//! Dataset tools — load, list, and inspect tabular data.

use crate::store::{Dataset, DatasetStore};
use async_trait::async_trait;
use dataloom_core::error::ToolError;
use dataloom_core::tool::{Tool, ToolResult};
use std::sync::Arc;
use tracing::info;

/// Load a CSV file into the dataset store under an alias.
pub struct LoadCsvTool {
    store: Arc<DatasetStore>,
}

impl LoadCsvTool {
    pub fn new(store: Arc<DatasetStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for LoadCsvTool {
    fn name(&self) -> &str {
        "load_csv"
    }

    fn description(&self) -> &str {
        "Load a CSV file into memory with an alias for reference."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "filepath": { "type": "string", "description": "Path to the CSV file" },
                "alias": { "type": "string", "description": "Name to refer to the dataset by" }
            },
            "required": ["filepath", "alias"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, ToolError> {
        let filepath = require_str(&params, "filepath")?;
        let alias = require_str(&params, "alias")?;

        match Dataset::from_csv_path(filepath) {
            Ok(dataset) => {
                let message = format!(
                    "Loaded '{}' as '{}' with {} rows, {} columns. Columns: [{}]",
                    filepath,
                    alias,
                    dataset.row_count(),
                    dataset.column_count(),
                    dataset.column_names.join(", ")
                );
                info!(alias, rows = dataset.row_count(), "dataset loaded");
                self.store.insert(alias, dataset);
                Ok(ToolResult::success(message))
            }
            Err(e) => Ok(ToolResult::error(format!(
                "Failed to load '{filepath}': {e}"
            ))),
        }
    }
}

/// List every loaded dataset with its shape.
pub struct ListDatasetsTool {
    store: Arc<DatasetStore>,
}

impl ListDatasetsTool {
    pub fn new(store: Arc<DatasetStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ListDatasetsTool {
    fn name(&self) -> &str {
        "list_datasets"
    }

    fn description(&self) -> &str {
        "List all loaded datasets."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object", "properties": {}, "required": [] })
    }

    async fn execute(&self, _params: serde_json::Value) -> Result<ToolResult, ToolError> {
        if self.store.is_empty() {
            return Ok(ToolResult::success("No datasets loaded."));
        }

        let mut lines = vec!["Loaded datasets:".to_string()];
        for alias in self.store.aliases() {
            if let Some(line) = self.store.with(&alias, |dataset| {
                format!(
                    "- '{}': {} rows, {} cols [{}]",
                    alias,
                    dataset.row_count(),
                    dataset.column_count(),
                    dataset.column_names.join(", ")
                )
            }) {
                lines.push(line);
            }
        }

        Ok(ToolResult::success(lines.join("\n")))
    }
}

/// Detailed information about one dataset: shape, column kinds, null
/// counts, and the first rows.
pub struct InspectDatasetTool {
    store: Arc<DatasetStore>,
}

impl InspectDatasetTool {
    pub fn new(store: Arc<DatasetStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for InspectDatasetTool {
    fn name(&self) -> &str {
        "inspect_dataset"
    }

    fn description(&self) -> &str {
        "Get detailed info about a dataset: shape, columns, null counts, first rows."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "alias": { "type": "string", "description": "Alias of the dataset to inspect" }
            },
            "required": ["alias"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, ToolError> {
        let alias = require_str(&params, "alias")?;

        let report = self.store.with(alias, |dataset| {
            let mut info = vec![
                format!("Dataset: {alias}"),
                format!(
                    "Shape: {} rows x {} cols",
                    dataset.row_count(),
                    dataset.column_count()
                ),
                String::new(),
                "Columns:".to_string(),
            ];

            for (i, column) in dataset.column_names.iter().enumerate() {
                info.push(format!(
                    "  - {}: {} ({} nulls)",
                    column,
                    dataset.column_kind(i),
                    dataset.null_count(i)
                ));
            }

            info.push(String::new());
            info.push("First 5 rows:".to_string());
            info.push(dataset.head(5));
            info.join("\n")
        });

        match report {
            Some(report) => Ok(ToolResult::success(report)),
            None => Ok(ToolResult::error(format!("Dataset '{alias}' not found"))),
        }
    }
}

/// Pull a required string parameter out of the arguments object.
fn require_str<'a>(params: &'a serde_json::Value, key: &str) -> Result<&'a str, ToolError> {
    params[key]
        .as_str()
        .ok_or_else(|| ToolError::InvalidArguments(format!("Missing '{key}' parameter")))
}
