//! The session: every operation a caller can perform, keyed by stable ids.
//!
//! Operations mediate between the registries and the rule engine. Lookup and
//! shape failures stop an operation before any registry mutation; the one
//! deliberate asymmetry is persistence, where a report save during
//! interrogation fails softly (recorded in the outcome) while an extraction
//! write fails hard (the file is the entire point of that call).

use crate::error::SessionError;
use crate::registry::{Pipeline, TableHandle, TableRegistry, ValidatorRegistry};
use chrono::Utc;
use inquest_rules::{
    Interrogation, SunderedKind, ThresholdSpec, Thresholds, Validator, interrogate, report_frame,
    step_summaries,
};
use inquest_table::{ensure_csv_destination, read_table, write_csv};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// Shape and column metadata returned by a successful load.
#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    pub table_id: String,
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
}

/// Request for `Session::create_validator`. Only `table_id` is required.
#[derive(Debug, Clone, Default)]
pub struct CreateValidator {
    pub table_id: String,
    pub validator_id: Option<String>,
    pub table_name: Option<String>,
    pub label: Option<String>,
    pub thresholds: Option<ThresholdSpec>,
    pub brief: bool,
    pub lang: Option<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorInfo {
    pub validator_id: String,
    pub table_id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    pub validator_id: String,
    pub step_index: usize,
    pub step_count: usize,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct InterrogateOutcome {
    pub validator_id: String,
    /// One wire-shaped entry per step, in step order.
    pub summary: Vec<Value>,
    pub all_passed: bool,
    pub report_saved_to: Option<PathBuf>,
    pub report_save_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOutcome {
    pub message: String,
    /// `None` when there was nothing to write (no-op success).
    pub output_path: Option<PathBuf>,
}

/// How extraction resolves row evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    Step(usize),
    Sundered(SunderedKind),
}

impl ExtractMode {
    /// Resolve the two optional request fields. `step_index` wins when both
    /// are given; the default is the failing union.
    pub fn resolve(
        step_index: Option<i64>,
        sundered: Option<SunderedKind>,
    ) -> Result<Self, SessionError> {
        match (step_index, sundered) {
            (Some(index), _) => {
                let index =
                    usize::try_from(index).map_err(|_| SessionError::InvalidArgument {
                        message: format!("step_index must be non-negative, got {index}"),
                    })?;
                Ok(ExtractMode::Step(index))
            }
            (None, Some(kind)) => Ok(ExtractMode::Sundered(kind)),
            (None, None) => Ok(ExtractMode::Sundered(SunderedKind::Fail)),
        }
    }
}

/// Process-lifetime state: one table registry, one validator registry.
///
/// Explicitly constructed and passed in; there are no globals. Serving
/// layers that need sharing wrap it in `Arc<Mutex<Session>>`.
#[derive(Debug, Default)]
pub struct Session {
    tables: TableRegistry,
    validators: ValidatorRegistry,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tables(&self) -> &TableRegistry {
        &self.tables
    }

    pub fn validators(&self) -> &ValidatorRegistry {
        &self.validators
    }

    /// Load a table from `source` and register it under `table_id` (or a
    /// synthesized `tbl_{8 hex}` id).
    pub fn load_table(
        &mut self,
        source: &str,
        table_id: Option<String>,
    ) -> Result<TableInfo, SessionError> {
        let path = Path::new(source);
        let (frame, format) = read_table(path)?;

        let table_id = match table_id {
            Some(id) if self.tables.contains(&id) => {
                return Err(SessionError::DuplicateTableId { table_id: id });
            }
            Some(id) => id,
            None => self.fresh_table_id(),
        };

        let rows = frame.height();
        let columns = frame.width();
        let column_names: Vec<String> = frame
            .get_columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect();

        self.tables.insert(TableHandle {
            id: table_id.clone(),
            frame,
            source: path.to_path_buf(),
            format,
            loaded_at: Utc::now(),
        })?;
        info!(%table_id, rows, columns, "table loaded");

        Ok(TableInfo {
            table_id,
            rows,
            columns,
            column_names,
        })
    }

    /// Create a pipeline bound to an already-loaded table.
    pub fn create_validator(
        &mut self,
        request: CreateValidator,
    ) -> Result<ValidatorInfo, SessionError> {
        if self.tables.get(&request.table_id).is_none() {
            return Err(SessionError::TableNotFound {
                table_id: request.table_id,
            });
        }

        let validator_id = match request.validator_id {
            Some(id) if self.validators.contains(&id) => {
                return Err(SessionError::DuplicateValidatorId { validator_id: id });
            }
            Some(id) => id,
            None => self.fresh_validator_id(),
        };

        let thresholds = match request.thresholds {
            Some(spec) => Thresholds::from_spec(spec)?,
            None => Thresholds::default(),
        };
        let table_name = request
            .table_name
            .unwrap_or_else(|| format!("table_for_{}", request.table_id));
        let label = request
            .label
            .unwrap_or_else(|| format!("Validation for {table_name}"));

        let validator = Validator::new(
            table_name,
            label.clone(),
            thresholds,
            request.brief,
            request.lang,
            request.locale,
        );
        self.validators.insert(Pipeline {
            id: validator_id.clone(),
            table_id: request.table_id.clone(),
            validator,
            interrogation: None,
            created_at: Utc::now(),
        })?;
        info!(%validator_id, table_id = %request.table_id, "validator created");

        Ok(ValidatorInfo {
            validator_id,
            table_id: request.table_id,
            label,
        })
    }

    /// Append one validation step to a pipeline.
    pub fn add_step(
        &mut self,
        validator_id: &str,
        validation_type: &str,
        params: Map<String, Value>,
    ) -> Result<StepInfo, SessionError> {
        let pipeline = self.validators.get_mut(validator_id).ok_or_else(|| {
            SessionError::ValidatorNotFound {
                validator_id: validator_id.to_string(),
            }
        })?;
        let step_index = pipeline.validator.append_step(validation_type, params)?;
        let step_count = pipeline.validator.step_count();
        info!(validator_id, validation_type, step_index, "validation step appended");

        Ok(StepInfo {
            validator_id: validator_id.to_string(),
            step_index,
            step_count,
            status: format!("Validation step '{validation_type}' added successfully."),
        })
    }

    /// Run every accumulated step and store the results on the pipeline.
    ///
    /// `report_path` (a `.csv` destination) persists the flattened report;
    /// a save failure lands in `report_save_error` rather than discarding
    /// the computed summary.
    pub fn interrogate(
        &mut self,
        validator_id: &str,
        report_path: Option<&str>,
    ) -> Result<InterrogateOutcome, SessionError> {
        let run = self.run_and_store(validator_id)?;
        let summary = step_summaries(&run);
        let all_passed = run.all_passed();
        info!(validator_id, steps = run.steps.len(), all_passed, "interrogation complete");

        let mut outcome = InterrogateOutcome {
            validator_id: validator_id.to_string(),
            summary,
            all_passed,
            report_saved_to: None,
            report_save_error: None,
        };
        if let Some(raw) = report_path {
            match save_report(&run, raw) {
                Ok(resolved) => outcome.report_saved_to = Some(resolved),
                Err(error) => {
                    warn!(validator_id, %error, "report save failed");
                    outcome.report_save_error = Some(error.to_string());
                }
            }
        }
        Ok(outcome)
    }

    /// Write row-level evidence to `output_path` as CSV.
    ///
    /// Runs an implicit interrogation first when none has happened yet. An
    /// empty result is a no-op success: an explanatory message, no file.
    pub fn extract(
        &mut self,
        validator_id: &str,
        output_path: &str,
        step_index: Option<i64>,
        sundered: Option<SunderedKind>,
    ) -> Result<ExtractOutcome, SessionError> {
        let out_path = Path::new(output_path);
        ensure_csv_destination(out_path).map_err(|_| SessionError::ExportFormat {
            path: out_path.to_path_buf(),
        })?;
        let mode = ExtractMode::resolve(step_index, sundered)?;

        let interrogated = self
            .validators
            .get(validator_id)
            .ok_or_else(|| SessionError::ValidatorNotFound {
                validator_id: validator_id.to_string(),
            })?
            .is_interrogated();
        let mut preamble = "";
        if !interrogated {
            warn!(validator_id, "extraction requested before interrogation; running it now");
            self.run_and_store(validator_id)?;
            preamble = "Pipeline had not been interrogated; interrogation was run first. ";
        }

        let run = self
            .validators
            .get(validator_id)
            .and_then(|pipeline| pipeline.interrogation.as_ref())
            .ok_or_else(|| SessionError::Engine {
                message: "interrogation results missing after run".to_string(),
            })?;

        let mut frame = match mode {
            ExtractMode::Step(index) => match run.step_evidence(index) {
                Some(frame) => frame.clone(),
                None => {
                    return Ok(ExtractOutcome {
                        message: format!(
                            "{preamble}No data extract available for step {index}. \
                             This may mean all rows passed this validation step."
                        ),
                        output_path: None,
                    });
                }
            },
            ExtractMode::Sundered(kind) => {
                let frame = run.sundered(kind);
                if frame.height() == 0 {
                    return Ok(ExtractOutcome {
                        message: format!(
                            "{preamble}No sundered data available for type '{}'.",
                            kind.as_str()
                        ),
                        output_path: None,
                    });
                }
                frame.clone()
            }
        };

        write_csv(&mut frame, out_path).map_err(|error| SessionError::Persistence {
            path: out_path.to_path_buf(),
            message: error.to_string(),
        })?;
        let resolved = resolved_path(out_path);
        info!(validator_id, rows = frame.height(), path = %resolved.display(), "extract written");

        Ok(ExtractOutcome {
            message: format!("{preamble}Data extract saved to {}", resolved.display()),
            output_path: Some(resolved),
        })
    }

    /// Interrogate and overwrite the pipeline's stored results.
    fn run_and_store(&mut self, validator_id: &str) -> Result<Interrogation, SessionError> {
        let run = {
            let pipeline = self.validators.get(validator_id).ok_or_else(|| {
                SessionError::ValidatorNotFound {
                    validator_id: validator_id.to_string(),
                }
            })?;
            let table = self.tables.get(&pipeline.table_id).ok_or_else(|| {
                SessionError::TableNotFound {
                    table_id: pipeline.table_id.clone(),
                }
            })?;
            interrogate(&pipeline.validator, &table.frame)?
        };
        if let Some(pipeline) = self.validators.get_mut(validator_id) {
            pipeline.interrogation = Some(run.clone());
        }
        Ok(run)
    }

    fn fresh_table_id(&self) -> String {
        loop {
            let id = format!("tbl_{}", short_hex());
            if !self.tables.contains(&id) {
                return id;
            }
        }
    }

    fn fresh_validator_id(&self) -> String {
        loop {
            let id = format!("vld_{}", short_hex());
            if !self.validators.contains(&id) {
                return id;
            }
        }
    }
}

fn short_hex() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

fn save_report(run: &Interrogation, raw: &str) -> Result<PathBuf, SessionError> {
    let path = Path::new(raw);
    ensure_csv_destination(path).map_err(|_| SessionError::ExportFormat {
        path: path.to_path_buf(),
    })?;
    let mut frame = report_frame(run)?;
    write_csv(&mut frame, path).map_err(|error| SessionError::Persistence {
        path: path.to_path_buf(),
        message: error.to_string(),
    })?;
    Ok(resolved_path(path))
}

/// Absolute form of a just-written path; falls back to the given path if
/// canonicalization fails.
fn resolved_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
