//! Built-in tool implementations for Dataloom.
//!
//! Tools give the agent the ability to work with data: load CSV files,
//! list and inspect loaded datasets, run generated analysis code, and
//! render charts. Code execution happens in an external sidecar — the
//! [`executor::ExecutionService`] trait is the boundary.

pub mod analytics;
pub mod dataset;
pub mod executor;
pub mod store;

pub use executor::{ExecutionError, ExecutionOutput, ExecutionService, HttpExecutionService};
pub use store::{Dataset, DatasetStore};

use dataloom_core::provider::Provider;
use dataloom_core::retry::RetryPolicy;
use dataloom_core::tool::ToolRegistry;
use std::sync::Arc;

/// Create the default tool registry: load_csv, list_datasets,
/// inspect_dataset, analyze, visualize.
pub fn default_registry(
    store: Arc<DatasetStore>,
    provider: Arc<dyn Provider>,
    executor: Arc<dyn ExecutionService>,
    policy: RetryPolicy,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(dataset::LoadCsvTool::new(store.clone())));
    registry.register(Box::new(dataset::ListDatasetsTool::new(store.clone())));
    registry.register(Box::new(dataset::InspectDatasetTool::new(store.clone())));
    registry.register(Box::new(analytics::AnalyzeTool::new(
        provider.clone(),
        executor.clone(),
        store.clone(),
        policy.clone(),
    )));
    registry.register(Box::new(analytics::VisualizeTool::new(
        provider, executor, store, policy,
    )));
    registry
}
