//! Severity thresholds. Each level maps to a trigger magnitude: values in
//! `(0, 1)` are failure fractions, values `>= 1` are absolute failure
//! counts, and exactly `0` means any failure at all triggers the level.

use crate::error::RuleError;
use serde::{Deserialize, Serialize};

/// Unvalidated threshold input as supplied by a caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSpec {
    #[serde(default)]
    pub warning: Option<f64>,
    #[serde(default)]
    pub error: Option<f64>,
    #[serde(default)]
    pub critical: Option<f64>,
}

/// Validated severity thresholds attached to a pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Thresholds {
    warning: Option<f64>,
    error: Option<f64>,
    critical: Option<f64>,
}

impl Thresholds {
    pub fn from_spec(spec: ThresholdSpec) -> Result<Self, RuleError> {
        Ok(Thresholds {
            warning: validate_level("warning", spec.warning)?,
            error: validate_level("error", spec.error)?,
            critical: validate_level("critical", spec.critical)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.warning.is_none() && self.error.is_none() && self.critical.is_none()
    }

    /// Per-level status for one step: `Some(true)` triggered, `Some(false)`
    /// configured but quiet, `None` not configured.
    pub fn classify(
        &self,
        n_failed: usize,
        n: usize,
    ) -> (Option<bool>, Option<bool>, Option<bool>) {
        (
            self.warning.map(|level| triggered(level, n_failed, n)),
            self.error.map(|level| triggered(level, n_failed, n)),
            self.critical.map(|level| triggered(level, n_failed, n)),
        )
    }
}

fn validate_level(name: &str, level: Option<f64>) -> Result<Option<f64>, RuleError> {
    match level {
        None => Ok(None),
        Some(value) if value.is_finite() && value >= 0.0 => Ok(Some(value)),
        Some(value) => Err(RuleError::InvalidConfig {
            message: format!("{name} threshold must be a finite non-negative number, got {value}"),
        }),
    }
}

fn triggered(level: f64, n_failed: usize, n: usize) -> bool {
    if level == 0.0 {
        n_failed > 0
    } else if level >= 1.0 {
        n_failed as f64 >= level
    } else {
        n > 0 && n_failed as f64 / n as f64 >= level
    }
}
