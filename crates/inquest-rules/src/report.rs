//! Report shaping: one JSON entry per step for tool payloads, and a flat
//! frame of the same numbers for CSV persistence.

use crate::error::RuleError;
use crate::interrogate::{Interrogation, StepResult};
use polars::prelude::*;
use serde_json::{Value, json};

/// Wire-shaped summary of every step, in step order.
pub fn step_summaries(run: &Interrogation) -> Vec<Value> {
    run.steps.iter().map(step_summary).collect()
}

fn step_summary(step: &StepResult) -> Value {
    json!({
        "i": step.index,
        "type": step.validation_type,
        "columns": step.columns,
        "values": step.values,
        "n": step.n,
        "nPassed": step.n_passed,
        "nFailed": step.n_failed,
        "fPassed": step.f_passed,
        "fFailed": step.f_failed,
        "warning": step.warning,
        "error": step.error,
        "critical": step.critical,
        "evalError": step.eval_error,
        "allPassed": step.all_passed,
    })
}

/// Flatten the run into one row per step for `write_csv`.
pub fn report_frame(run: &Interrogation) -> Result<DataFrame, RuleError> {
    let steps = &run.steps;
    let indexes: Vec<i64> = steps.iter().map(|s| s.index as i64).collect();
    let types: Vec<String> = steps.iter().map(|s| s.validation_type.clone()).collect();
    let columns: Vec<String> = steps.iter().map(|s| s.columns.join(", ")).collect();
    let values: Vec<String> = steps.iter().map(|s| s.values.clone()).collect();
    let n: Vec<i64> = steps.iter().map(|s| s.n as i64).collect();
    let n_passed: Vec<i64> = steps.iter().map(|s| s.n_passed as i64).collect();
    let n_failed: Vec<i64> = steps.iter().map(|s| s.n_failed as i64).collect();
    let f_passed: Vec<f64> = steps.iter().map(|s| s.f_passed).collect();
    let f_failed: Vec<f64> = steps.iter().map(|s| s.f_failed).collect();
    let warning: Vec<Option<bool>> = steps.iter().map(|s| s.warning).collect();
    let error: Vec<Option<bool>> = steps.iter().map(|s| s.error).collect();
    let critical: Vec<Option<bool>> = steps.iter().map(|s| s.critical).collect();
    let eval_error: Vec<Option<String>> = steps.iter().map(|s| s.eval_error.clone()).collect();

    DataFrame::new(vec![
        Column::new("i".into(), indexes),
        Column::new("type".into(), types),
        Column::new("columns".into(), columns),
        Column::new("values".into(), values),
        Column::new("n".into(), n),
        Column::new("n_passed".into(), n_passed),
        Column::new("n_failed".into(), n_failed),
        Column::new("f_passed".into(), f_passed),
        Column::new("f_failed".into(), f_failed),
        Column::new("warning".into(), warning),
        Column::new("error".into(), error),
        Column::new("critical".into(), critical),
        Column::new("eval_error".into(), eval_error),
    ])
    .map_err(|e| RuleError::Eval {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interrogate::interrogate;
    use crate::thresholds::{ThresholdSpec, Thresholds};
    use crate::validator::Validator;
    use serde_json::json;

    fn run_two_steps() -> Interrogation {
        let thresholds = Thresholds::from_spec(ThresholdSpec {
            warning: Some(0.0),
            error: None,
            critical: None,
        })
        .unwrap();
        let mut validator = Validator::new(
            "table_for_tbl_report".to_string(),
            "Validation for table_for_tbl_report".to_string(),
            thresholds,
            false,
            None,
            None,
        );
        let params = |value: serde_json::Value| match value {
            serde_json::Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        };
        validator
            .append_step("col_vals_gt", params(json!({"columns": "x", "value": 0})))
            .unwrap();
        validator
            .append_step("col_vals_lt", params(json!({"columns": "gone", "value": 1})))
            .unwrap();
        let frame = df!("x" => [1i64, -2, 3]).unwrap();
        interrogate(&validator, &frame).unwrap()
    }

    #[test]
    fn summaries_echo_counts_and_severity() {
        let run = run_two_steps();
        let entries = step_summaries(&run);
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first["i"], json!(0));
        assert_eq!(first["type"], json!("col_vals_gt"));
        assert_eq!(first["nPassed"], json!(2));
        assert_eq!(first["nFailed"], json!(1));
        assert_eq!(first["warning"], json!(true));
        assert_eq!(first["evalError"], json!(null));
        assert_eq!(first["allPassed"], json!(false));

        let second = &entries[1];
        assert_eq!(second["n"], json!(0));
        assert!(second["evalError"].is_string());
    }

    #[test]
    fn report_frame_has_one_row_per_step() {
        let run = run_two_steps();
        let frame = report_frame(&run).unwrap();
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.width(), 13);

        let types = frame.column("type").unwrap();
        assert_eq!(
            types.as_materialized_series().str().unwrap().get(1),
            Some("col_vals_lt")
        );
        let warning = frame.column("warning").unwrap();
        assert_eq!(
            warning.as_materialized_series().bool().unwrap().get(1),
            None
        );
    }

    #[test]
    fn empty_run_yields_an_empty_frame_with_headers() {
        let validator = Validator::new(
            "table_for_tbl_empty".to_string(),
            "Validation for table_for_tbl_empty".to_string(),
            Thresholds::default(),
            false,
            None,
            None,
        );
        let frame = df!("x" => [1i64]).unwrap();
        let run = interrogate(&validator, &frame).unwrap();
        let report = report_frame(&run).unwrap();
        assert_eq!(report.height(), 0);
        assert_eq!(report.width(), 13);
        assert!(report.column("eval_error").is_ok());
    }
}
