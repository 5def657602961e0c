//! Interrogation: evaluate every accumulated step against the bound frame.
//!
//! Row-level rules produce a per-row boolean pass mask (nulls fail unless
//! `na_pass`); table-level rules produce a single pass/fail unit. A step
//! that cannot be evaluated at all (missing column, type mismatch) is
//! recorded as an evaluation error on that step and never aborts the run.

use crate::error::RuleError;
use crate::rule::{CompareOp, Rule};
use crate::scalar::ScalarValue;
use crate::thresholds::Thresholds;
use crate::validator::{Step, Validator};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::str::FromStr;

const MASK_NAME: &str = "__inquest_pass";

/// Which half of the sundered row split to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SunderedKind {
    Pass,
    Fail,
}

impl SunderedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SunderedKind::Pass => "pass",
            SunderedKind::Fail => "fail",
        }
    }
}

impl FromStr for SunderedKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pass" => Ok(SunderedKind::Pass),
            "fail" => Ok(SunderedKind::Fail),
            other => Err(format!(
                "sundered type must be \"pass\" or \"fail\", got `{other}`"
            )),
        }
    }
}

/// Rolled-up outcome of one step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub index: usize,
    pub validation_type: String,
    pub columns: Vec<String>,
    pub values: String,
    /// Test units: row count for row-level rules, 1 for table-level rules,
    /// 0 when evaluation failed.
    pub n: usize,
    pub n_passed: usize,
    pub n_failed: usize,
    pub f_passed: f64,
    pub f_failed: f64,
    pub warning: Option<bool>,
    pub error: Option<bool>,
    pub critical: Option<bool>,
    pub eval_error: Option<String>,
    pub all_passed: bool,
}

/// Everything one interrogation run produced.
#[derive(Debug, Clone)]
pub struct Interrogation {
    pub steps: Vec<StepResult>,
    /// Failing rows per row-level step, keyed by step index. Steps with no
    /// failures (and table-level steps) have no entry.
    pub extracts: BTreeMap<usize, DataFrame>,
    pub sundered_pass: DataFrame,
    pub sundered_fail: DataFrame,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl Interrogation {
    pub fn all_passed(&self) -> bool {
        self.steps.iter().all(|step| step.all_passed)
    }

    pub fn step_evidence(&self, index: usize) -> Option<&DataFrame> {
        self.extracts.get(&index)
    }

    pub fn sundered(&self, kind: SunderedKind) -> &DataFrame {
        match kind {
            SunderedKind::Pass => &self.sundered_pass,
            SunderedKind::Fail => &self.sundered_fail,
        }
    }
}

/// Run the full step sequence. Recomputes everything from scratch; prior
/// results are the caller's to discard.
pub fn interrogate(validator: &Validator, frame: &DataFrame) -> Result<Interrogation, RuleError> {
    let started_at = Utc::now();
    let mut steps = Vec::with_capacity(validator.step_count());
    let mut extracts = BTreeMap::new();
    // Vacuously all-true: with zero row-level steps every row "passes".
    let mut pass_union = BooleanChunked::full(MASK_NAME.into(), true, frame.height());

    for step in validator.steps() {
        let result = match eval_step(frame, &step.rule) {
            StepOutcome::Rows(mask) => {
                let n = frame.height();
                let n_passed = count_true(&mask);
                let n_failed = n - n_passed;
                if n_failed > 0 {
                    let evidence = frame.filter(&!mask.clone()).map_err(eval_err)?;
                    extracts.insert(step.index, evidence);
                }
                pass_union = &pass_union & &mask;
                row_result(step, &validator.thresholds, n, n_passed, n_failed)
            }
            StepOutcome::Table(passed) => table_result(step, &validator.thresholds, passed),
            StepOutcome::Error(message) => error_result(step, message),
        };
        steps.push(result);
    }

    let sundered_pass = frame.filter(&pass_union).map_err(eval_err)?;
    let sundered_fail = frame.filter(&!pass_union).map_err(eval_err)?;

    Ok(Interrogation {
        steps,
        extracts,
        sundered_pass,
        sundered_fail,
        started_at,
        completed_at: Utc::now(),
    })
}

enum StepOutcome {
    Rows(BooleanChunked),
    Table(bool),
    Error(String),
}

fn eval_step(frame: &DataFrame, rule: &Rule) -> StepOutcome {
    match rule {
        Rule::Compare {
            op,
            columns,
            value,
            na_pass,
        } => mask_outcome(frame, compare_expr(*op, columns, value, *na_pass)),
        Rule::Between {
            columns,
            left,
            right,
            inclusive,
            na_pass,
            negate,
        } => mask_outcome(
            frame,
            between_expr(columns, left, right, *inclusive, *na_pass, *negate),
        ),
        Rule::InSet {
            columns,
            set,
            na_pass,
            negate,
        } => mask_outcome(frame, set_expr(columns, set, *na_pass, *negate)),
        Rule::Null { columns, negate } => mask_outcome(
            frame,
            and_over(columns, |c| {
                if *negate { c.is_not_null() } else { c.is_null() }
            }),
        ),
        Rule::Regex {
            columns,
            pattern,
            na_pass,
        } => mask_outcome(
            frame,
            and_over(columns, |c| {
                c.str()
                    .contains(lit(pattern.as_str()), true)
                    .fill_null(lit(*na_pass))
            }),
        ),
        Rule::Expr { expr } => match sql_predicate(expr) {
            Ok(pred) => mask_outcome(frame, pred),
            Err(message) => StepOutcome::Error(message),
        },
        Rule::Conjointly { exprs } => match conjoint_predicate(exprs) {
            Ok(pred) => mask_outcome(frame, pred),
            Err(message) => StepOutcome::Error(message),
        },
        Rule::RowsDistinct { columns_subset } => {
            match rows_distinct_mask(frame, columns_subset.as_deref()) {
                Ok(mask) => StepOutcome::Rows(mask),
                Err(message) => StepOutcome::Error(message),
            }
        }
        Rule::RowsComplete { columns_subset } => {
            match rows_complete_mask(frame, columns_subset.as_deref()) {
                Ok(mask) => StepOutcome::Rows(mask),
                Err(message) => StepOutcome::Error(message),
            }
        }
        Rule::ColCountMatch { count } => StepOutcome::Table(frame.width() == *count),
        Rule::ColExists { columns } => {
            StepOutcome::Table(columns.iter().all(|name| frame.column(name).is_ok()))
        }
        Rule::RowCountMatch { count } => StepOutcome::Table(frame.height() == *count),
        Rule::ColSchemaMatch { expected } => StepOutcome::Table(schema_matches(frame, expected)),
    }
}

fn compare_expr(op: CompareOp, columns: &[String], value: &ScalarValue, na_pass: bool) -> Expr {
    and_over(columns, |c| {
        let pred = match op {
            CompareOp::Lt => c.lt(value.to_expr()),
            CompareOp::Gt => c.gt(value.to_expr()),
            CompareOp::Lte => c.lt_eq(value.to_expr()),
            CompareOp::Gte => c.gt_eq(value.to_expr()),
            CompareOp::Eq => c.eq(value.to_expr()),
            CompareOp::Ne => c.neq(value.to_expr()),
        };
        pred.fill_null(lit(na_pass))
    })
}

fn between_expr(
    columns: &[String],
    left: &ScalarValue,
    right: &ScalarValue,
    inclusive: (bool, bool),
    na_pass: bool,
    negate: bool,
) -> Expr {
    and_over(columns, |c| {
        let lower = if inclusive.0 {
            c.clone().gt_eq(left.to_expr())
        } else {
            c.clone().gt(left.to_expr())
        };
        let upper = if inclusive.1 {
            c.lt_eq(right.to_expr())
        } else {
            c.lt(right.to_expr())
        };
        let within = lower.and(upper);
        let pred = if negate { within.not() } else { within };
        pred.fill_null(lit(na_pass))
    })
}

fn set_expr(columns: &[String], set: &[ScalarValue], na_pass: bool, negate: bool) -> Expr {
    and_over(columns, |c| {
        // An or-chain of equalities keeps integer sets integer and string
        // sets string; null propagates through and is settled by fill_null.
        let membership = set
            .iter()
            .map(|value| c.clone().eq(value.to_expr()))
            .reduce(|a, b| a.or(b))
            .unwrap_or_else(|| lit(false));
        let pred = if negate { membership.not() } else { membership };
        pred.fill_null(lit(na_pass))
    })
}

fn and_over(columns: &[String], make: impl Fn(Expr) -> Expr) -> Expr {
    columns
        .iter()
        .map(|name| make(col(name.as_str())))
        .reduce(|a, b| a.and(b))
        .unwrap_or_else(|| lit(true))
}

fn sql_predicate(expr: &str) -> Result<Expr, String> {
    polars::sql::sql_expr(expr)
        .map(|pred| pred.fill_null(lit(false)))
        .map_err(|e| format!("invalid expression `{expr}`: {e}"))
}

fn conjoint_predicate(exprs: &[String]) -> Result<Expr, String> {
    exprs
        .iter()
        .map(|expr| sql_predicate(expr))
        .collect::<Result<Vec<_>, _>>()
        .map(|preds| {
            preds
                .into_iter()
                .reduce(|a, b| a.and(b))
                .unwrap_or_else(|| lit(true))
        })
}

fn mask_outcome(frame: &DataFrame, expr: Expr) -> StepOutcome {
    match collect_mask(frame, expr) {
        Ok(mask) => StepOutcome::Rows(mask),
        Err(message) => StepOutcome::Error(message),
    }
}

fn collect_mask(frame: &DataFrame, expr: Expr) -> Result<BooleanChunked, String> {
    let out = frame
        .clone()
        .lazy()
        .select([expr.alias(MASK_NAME)])
        .collect()
        .map_err(|e| e.to_string())?;
    let mask = out
        .column(MASK_NAME)
        .map_err(|e| e.to_string())?
        .as_materialized_series()
        .bool()
        .map_err(|e| e.to_string())?
        .clone();
    // A pure-literal predicate collects to a single value; broadcast it.
    if mask.len() == 1 && frame.height() != 1 {
        let value = mask.get(0).unwrap_or(false);
        return Ok(BooleanChunked::full(MASK_NAME.into(), value, frame.height()));
    }
    Ok(mask)
}

fn rows_complete_mask(frame: &DataFrame, subset: Option<&[String]>) -> Result<BooleanChunked, String> {
    let names = subset_names(frame, subset);
    let mut mask = BooleanChunked::full(MASK_NAME.into(), true, frame.height());
    for name in &names {
        let column = frame.column(name).map_err(|e| e.to_string())?;
        let not_null = !column.as_materialized_series().is_null();
        mask = &mask & &not_null;
    }
    Ok(mask)
}

fn rows_distinct_mask(frame: &DataFrame, subset: Option<&[String]>) -> Result<BooleanChunked, String> {
    let names = subset_names(frame, subset);
    let mut series = Vec::with_capacity(names.len());
    for name in &names {
        let column = frame.column(name).map_err(|e| e.to_string())?;
        series.push(column.as_materialized_series());
    }

    // Row keys on the debug rendering of each cell: distinguishes 1 from
    // "1" and null from "null".
    let mut keys = Vec::with_capacity(frame.height());
    for row in 0..frame.height() {
        let mut key = String::new();
        for values in &series {
            let value = values.get(row).map_err(|e| e.to_string())?;
            write!(key, "{value:?}\u{1f}").map_err(|e| e.to_string())?;
        }
        keys.push(key);
    }

    let mut counts: HashMap<&str, usize> = HashMap::with_capacity(keys.len());
    for key in &keys {
        *counts.entry(key.as_str()).or_insert(0) += 1;
    }
    let distinct: Vec<bool> = keys
        .iter()
        .map(|key| counts.get(key.as_str()).copied().unwrap_or(0) == 1)
        .collect();
    Ok(BooleanChunked::from_slice(MASK_NAME.into(), &distinct))
}

fn subset_names(frame: &DataFrame, subset: Option<&[String]>) -> Vec<String> {
    match subset {
        Some(names) => names.to_vec(),
        None => frame
            .get_columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect(),
    }
}

fn schema_matches(frame: &DataFrame, expected: &[(String, String)]) -> bool {
    let actual = frame.get_columns();
    if actual.len() != expected.len() {
        return false;
    }
    expected
        .iter()
        .zip(actual.iter())
        .all(|((name, dtype), column)| {
            column.name().as_str() == name && dtype_matches(dtype, column.dtype())
        })
}

fn dtype_matches(expected: &str, actual: &DataType) -> bool {
    let canonical = format!("{actual:?}").to_ascii_lowercase();
    let expected = expected.to_ascii_lowercase();
    let normalized = match expected.as_str() {
        "str" | "utf8" | "text" => "string",
        "int" | "i64" => "int64",
        "float" | "f64" | "double" => "float64",
        "bool" => "boolean",
        other => other,
    };
    canonical == normalized || canonical.starts_with(normalized)
}

fn count_true(mask: &BooleanChunked) -> usize {
    mask.into_iter().flatten().filter(|value| *value).count()
}

fn fractions(n_passed: usize, n_failed: usize, n: usize) -> (f64, f64) {
    if n == 0 {
        (0.0, 0.0)
    } else {
        (n_passed as f64 / n as f64, n_failed as f64 / n as f64)
    }
}

fn row_result(
    step: &Step,
    thresholds: &Thresholds,
    n: usize,
    n_passed: usize,
    n_failed: usize,
) -> StepResult {
    let (f_passed, f_failed) = fractions(n_passed, n_failed, n);
    let (warning, error, critical) = thresholds.classify(n_failed, n);
    StepResult {
        index: step.index,
        validation_type: step.kind.as_str().to_string(),
        columns: step.rule.columns(),
        values: step.rule.values_summary(),
        n,
        n_passed,
        n_failed,
        f_passed,
        f_failed,
        warning,
        error,
        critical,
        eval_error: None,
        all_passed: n_failed == 0,
    }
}

fn table_result(step: &Step, thresholds: &Thresholds, passed: bool) -> StepResult {
    let n_failed = usize::from(!passed);
    row_result(step, thresholds, 1, usize::from(passed), n_failed)
}

fn error_result(step: &Step, message: String) -> StepResult {
    StepResult {
        index: step.index,
        validation_type: step.kind.as_str().to_string(),
        columns: step.rule.columns(),
        values: step.rule.values_summary(),
        n: 0,
        n_passed: 0,
        n_failed: 0,
        f_passed: 0.0,
        f_failed: 0.0,
        warning: None,
        error: None,
        critical: None,
        eval_error: Some(message),
        all_passed: false,
    }
}

fn eval_err(error: PolarsError) -> RuleError {
    RuleError::Eval {
        message: error.to_string(),
    }
}
