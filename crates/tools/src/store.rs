//! In-memory dataset store — the long-lived home of loaded dataframes.
//!
//! The store is shared between the tools (which mutate it) and the
//! orchestrator (which pulls read-only [`CatalogSnapshot`]s from it once per
//! iteration via the [`CatalogSource`] trait).

use dataloom_core::catalog::{CatalogSnapshot, CatalogSource, DatasetShape};
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

/// A loaded tabular dataset. Fields are kept as raw strings; an empty field
/// counts as a null.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub column_names: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Parse a CSV file with a header row.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, csv::Error> {
        let mut reader = csv::Reader::from_path(path)?;

        let column_names: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|f| f.to_string()).collect());
        }

        Ok(Self { column_names, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_names.len()
    }

    pub fn shape(&self) -> DatasetShape {
        DatasetShape {
            row_count: self.row_count(),
            column_names: self.column_names.clone(),
        }
    }

    /// Number of empty fields in the given column.
    pub fn null_count(&self, column_index: usize) -> usize {
        self.rows
            .iter()
            .filter(|row| row.get(column_index).is_none_or(|f| f.trim().is_empty()))
            .count()
    }

    /// Rough column kind: "number" if every non-null field parses as f64,
    /// otherwise "string".
    pub fn column_kind(&self, column_index: usize) -> &'static str {
        let mut saw_value = false;
        for row in &self.rows {
            let Some(field) = row.get(column_index) else {
                continue;
            };
            let field = field.trim();
            if field.is_empty() {
                continue;
            }
            saw_value = true;
            if field.parse::<f64>().is_err() {
                return "string";
            }
        }
        if saw_value { "number" } else { "string" }
    }

    /// Render the first `n` rows as an aligned text table.
    pub fn head(&self, n: usize) -> String {
        let rows: Vec<&Vec<String>> = self.rows.iter().take(n).collect();

        let mut widths: Vec<usize> = self.column_names.iter().map(|c| c.len()).collect();
        for row in &rows {
            for (i, field) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(field.len());
                }
            }
        }

        let mut out = String::new();
        let header: Vec<String> = self
            .column_names
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:width$}", c, width = widths[i]))
            .collect();
        out.push_str(&header.join("  "));
        out.push('\n');

        for row in rows {
            let line: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, f)| format!("{:width$}", f, width = widths.get(i).copied().unwrap_or(0)))
                .collect();
            out.push_str(&line.join("  "));
            out.push('\n');
        }

        out
    }
}

/// Thread-safe alias → dataset map, injected wherever data access is needed.
#[derive(Default)]
pub struct DatasetStore {
    inner: RwLock<HashMap<String, Dataset>>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a dataset under the given alias.
    pub fn insert(&self, alias: impl Into<String>, dataset: Dataset) {
        self.inner.write().unwrap().insert(alias.into(), dataset);
    }

    /// Run a closure against the named dataset, if present.
    pub fn with<R>(&self, alias: &str, f: impl FnOnce(&Dataset) -> R) -> Option<R> {
        self.inner.read().unwrap().get(alias).map(f)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.inner.read().unwrap().contains_key(alias)
    }

    /// All aliases, sorted.
    pub fn aliases(&self) -> Vec<String> {
        let mut aliases: Vec<String> = self.inner.read().unwrap().keys().cloned().collect();
        aliases.sort();
        aliases
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }
}

impl CatalogSource for DatasetStore {
    fn snapshot(&self) -> CatalogSnapshot {
        self.inner
            .read()
            .unwrap()
            .iter()
            .map(|(alias, dataset)| (alias.clone(), dataset.shape()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_csv() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "city,population,area").unwrap();
        writeln!(file, "Tokyo,13960000,2194").unwrap();
        writeln!(file, "Osaka,,225").unwrap();
        writeln!(file, "Kyoto,1460000,828").unwrap();
        file
    }

    #[test]
    fn csv_parse_shape() {
        let file = sample_csv();
        let dataset = Dataset::from_csv_path(file.path()).unwrap();
        assert_eq!(dataset.row_count(), 3);
        assert_eq!(dataset.column_count(), 3);
        assert_eq!(dataset.column_names, vec!["city", "population", "area"]);
    }

    #[test]
    fn null_counting() {
        let file = sample_csv();
        let dataset = Dataset::from_csv_path(file.path()).unwrap();
        assert_eq!(dataset.null_count(0), 0);
        assert_eq!(dataset.null_count(1), 1);
    }

    #[test]
    fn column_kind_inference() {
        let file = sample_csv();
        let dataset = Dataset::from_csv_path(file.path()).unwrap();
        assert_eq!(dataset.column_kind(0), "string");
        assert_eq!(dataset.column_kind(1), "number");
        assert_eq!(dataset.column_kind(2), "number");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Dataset::from_csv_path("/nonexistent/data.csv").is_err());
    }

    #[test]
    fn head_renders_rows() {
        let file = sample_csv();
        let dataset = Dataset::from_csv_path(file.path()).unwrap();
        let head = dataset.head(2);
        assert!(head.contains("city"));
        assert!(head.contains("Tokyo"));
        assert!(!head.contains("Kyoto"));
    }

    #[test]
    fn store_snapshot_reflects_inserts() {
        let store = DatasetStore::new();
        assert!(store.snapshot().is_empty());

        let file = sample_csv();
        store.insert("cities", Dataset::from_csv_path(file.path()).unwrap());

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot["cities"].row_count, 3);
        assert_eq!(snapshot["cities"].column_names.len(), 3);
    }

    #[test]
    fn store_aliases_sorted() {
        let store = DatasetStore::new();
        let file = sample_csv();
        let dataset = Dataset::from_csv_path(file.path()).unwrap();
        store.insert("beta", dataset.clone());
        store.insert("alpha", dataset);
        assert_eq!(store.aliases(), vec!["alpha", "beta"]);
    }

    #[test]
    fn insert_replaces_same_alias() {
        let store = DatasetStore::new();
        let file = sample_csv();
        store.insert("d", Dataset::from_csv_path(file.path()).unwrap());
        store.insert(
            "d",
            Dataset {
                column_names: vec!["x".into()],
                rows: vec![],
            },
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.snapshot()["d"].row_count, 0);
    }
}
