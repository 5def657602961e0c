//! In-memory registries for loaded tables and active validator pipelines.
//!
//! This is the state boundary for `inquest-session`:
//! - hold immutable table handles and mutable pipelines
//! - expose deterministic id-keyed lookups
//! - avoid evaluation concerns (interrogation lives in `inquest-rules`)

use crate::error::SessionError;
use chrono::{DateTime, Utc};
use inquest_rules::{Interrogation, Validator};
use inquest_table::SourceFormat;
use polars::prelude::DataFrame;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A loaded table. Immutable once registered; rules never mutate the frame.
#[derive(Debug, Clone)]
pub struct TableHandle {
    pub id: String,
    pub frame: DataFrame,
    pub source: PathBuf,
    pub format: SourceFormat,
    pub loaded_at: DateTime<Utc>,
}

/// A validation pipeline bound to one registered table.
///
/// The binding (`table_id`) never changes after creation. `interrogation`
/// is `None` until the first run; re-interrogation overwrites it.
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub id: String,
    pub table_id: String,
    pub validator: Validator,
    pub interrogation: Option<Interrogation>,
    pub created_at: DateTime<Utc>,
}

impl Pipeline {
    pub fn is_interrogated(&self) -> bool {
        self.interrogation.is_some()
    }
}

/// Id-keyed store of loaded tables.
#[derive(Debug, Clone, Default)]
pub struct TableRegistry {
    tables: BTreeMap<String, TableHandle>,
}

impl TableRegistry {
    /// Whether an id is already taken.
    pub fn contains(&self, id: &str) -> bool {
        self.tables.contains_key(id)
    }

    /// Register a handle under its id. Duplicate ids are rejected.
    pub fn insert(&mut self, handle: TableHandle) -> Result<(), SessionError> {
        if self.contains(&handle.id) {
            return Err(SessionError::DuplicateTableId {
                table_id: handle.id,
            });
        }
        self.tables.insert(handle.id.clone(), handle);
        Ok(())
    }

    /// Lookup one table by id.
    pub fn get(&self, id: &str) -> Option<&TableHandle> {
        self.tables.get(id)
    }

    /// Total number of loaded tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no tables are loaded.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// All registered ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }
}

/// Id-keyed store of validator pipelines.
#[derive(Debug, Clone, Default)]
pub struct ValidatorRegistry {
    pipelines: BTreeMap<String, Pipeline>,
}

impl ValidatorRegistry {
    /// Whether an id is already taken.
    pub fn contains(&self, id: &str) -> bool {
        self.pipelines.contains_key(id)
    }

    /// Register a pipeline under its id. Duplicate ids are rejected.
    pub fn insert(&mut self, pipeline: Pipeline) -> Result<(), SessionError> {
        if self.contains(&pipeline.id) {
            return Err(SessionError::DuplicateValidatorId {
                validator_id: pipeline.id,
            });
        }
        self.pipelines.insert(pipeline.id.clone(), pipeline);
        Ok(())
    }

    /// Lookup one pipeline by id.
    pub fn get(&self, id: &str) -> Option<&Pipeline> {
        self.pipelines.get(id)
    }

    /// Lookup one pipeline by id (mutable).
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Pipeline> {
        self.pipelines.get_mut(id)
    }

    /// Total number of pipelines.
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    /// Whether no pipelines exist.
    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    /// All registered ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        self.pipelines.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inquest_rules::Thresholds;
    use polars::prelude::df;

    fn handle(id: &str) -> TableHandle {
        TableHandle {
            id: id.to_string(),
            frame: df!("x" => [1i64]).unwrap(),
            source: PathBuf::from("data.csv"),
            format: SourceFormat::Csv,
            loaded_at: Utc::now(),
        }
    }

    fn pipeline(id: &str, table_id: &str) -> Pipeline {
        Pipeline {
            id: id.to_string(),
            table_id: table_id.to_string(),
            validator: Validator::new(
                format!("table_for_{table_id}"),
                format!("Validation for table_for_{table_id}"),
                Thresholds::default(),
                false,
                None,
                None,
            ),
            interrogation: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn duplicate_table_ids_are_rejected() {
        let mut registry = TableRegistry::default();
        registry.insert(handle("tbl_one")).unwrap();
        let err = registry.insert(handle("tbl_one")).unwrap_err();
        assert!(matches!(err, SessionError::DuplicateTableId { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn pipeline_lookup_is_by_id() {
        let mut registry = ValidatorRegistry::default();
        registry.insert(pipeline("vld_a", "tbl_one")).unwrap();
        registry.insert(pipeline("vld_b", "tbl_one")).unwrap();

        assert_eq!(registry.ids(), vec!["vld_a", "vld_b"]);
        assert!(registry.get("vld_a").is_some());
        assert!(registry.get("vld_missing").is_none());
        assert!(!registry.get("vld_b").unwrap().is_interrogated());
    }
}
