//! A validation pipeline: display metadata, thresholds, and the ordered,
//! append-only step sequence. Steps are never reordered or removed.

use crate::error::RuleError;
use crate::rule::{Rule, RuleKind};
use crate::thresholds::Thresholds;
use serde_json::{Map, Value};

/// One appended rule instance. `index` is the 0-based insertion order and
/// is the `step_index` callers use for evidence extraction.
#[derive(Debug, Clone)]
pub struct Step {
    pub index: usize,
    pub kind: RuleKind,
    pub rule: Rule,
    /// Raw parameters as supplied, retained for report echo.
    pub params: Map<String, Value>,
}

/// The engine-side pipeline object.
#[derive(Debug, Clone)]
pub struct Validator {
    pub table_name: String,
    pub label: String,
    pub thresholds: Thresholds,
    pub brief: bool,
    pub lang: Option<String>,
    pub locale: Option<String>,
    steps: Vec<Step>,
}

impl Validator {
    pub fn new(
        table_name: String,
        label: String,
        thresholds: Thresholds,
        brief: bool,
        lang: Option<String>,
        locale: Option<String>,
    ) -> Self {
        Validator {
            table_name,
            label,
            thresholds,
            brief,
            lang,
            locale,
            steps: Vec::new(),
        }
    }

    /// Parse, validate, and append one step. Returns the new step's index.
    ///
    /// On any error nothing is appended and the sequence is unchanged.
    pub fn append_step(
        &mut self,
        validation_type: &str,
        params: Map<String, Value>,
    ) -> Result<usize, RuleError> {
        let kind: RuleKind = validation_type.parse()?;
        let rule = Rule::parse(kind, &params)?;
        let index = self.steps.len();
        self.steps.push(Step {
            index,
            kind,
            rule,
            params,
        });
        Ok(index)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}
