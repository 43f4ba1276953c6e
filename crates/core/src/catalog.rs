//! Dataset catalog — the read-only view of loaded data that feeds prompts.
//!
//! The concrete store of dataframes lives with the tools; the orchestration
//! loop only sees shape descriptors, pulled fresh once per iteration through
//! the [`CatalogSource`] collaborator injected at agent construction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shape descriptor for one loaded dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetShape {
    pub row_count: usize,
    pub column_names: Vec<String>,
}

/// Alias → shape, ordered so prompt rendering is deterministic.
pub type CatalogSnapshot = BTreeMap<String, DatasetShape>;

/// Supplier of catalog snapshots.
///
/// Tools may mutate the underlying store mid-run (e.g., load_csv); the
/// orchestrator re-synchronizes by pulling a snapshot each iteration rather
/// than being pushed updates.
pub trait CatalogSource: Send + Sync {
    fn snapshot(&self) -> CatalogSnapshot;
}

/// An always-empty catalog, for tests and catalog-free setups.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyCatalog;

impl CatalogSource for EmptyCatalog {
    fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot::new()
    }
}
