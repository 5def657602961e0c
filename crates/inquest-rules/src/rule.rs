//! The closed validation vocabulary.
//!
//! `RuleKind` is the wire-level tag; `Rule` is the validated form a step
//! carries. Parsing is the only place loose JSON parameters are accepted,
//! and unknown tags fail here with the full vocabulary in the message.
//! There is deliberately no reflective dispatch anywhere.

use crate::error::RuleError;
use crate::scalar::ScalarValue;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Wire names for every supported validation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    ColValsLt,
    ColValsGt,
    ColValsLte,
    ColValsGte,
    ColValsEqual,
    ColValsNotEqual,
    ColValsBetween,
    ColValsNotBetween,
    ColValsInSet,
    ColValsNotInSet,
    ColValsNull,
    ColValsNotNull,
    ColValsRegex,
    ColValsExpr,
    ColCountMatch,
    ColExists,
    RowsDistinct,
    RowsComplete,
    RowCountMatch,
    Conjointly,
    ColSchemaMatch,
}

impl RuleKind {
    pub const ALL: [RuleKind; 21] = [
        RuleKind::ColValsLt,
        RuleKind::ColValsGt,
        RuleKind::ColValsLte,
        RuleKind::ColValsGte,
        RuleKind::ColValsEqual,
        RuleKind::ColValsNotEqual,
        RuleKind::ColValsBetween,
        RuleKind::ColValsNotBetween,
        RuleKind::ColValsInSet,
        RuleKind::ColValsNotInSet,
        RuleKind::ColValsNull,
        RuleKind::ColValsNotNull,
        RuleKind::ColValsRegex,
        RuleKind::ColValsExpr,
        RuleKind::ColCountMatch,
        RuleKind::ColExists,
        RuleKind::RowsDistinct,
        RuleKind::RowsComplete,
        RuleKind::RowCountMatch,
        RuleKind::Conjointly,
        RuleKind::ColSchemaMatch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::ColValsLt => "col_vals_lt",
            RuleKind::ColValsGt => "col_vals_gt",
            RuleKind::ColValsLte => "col_vals_lte",
            RuleKind::ColValsGte => "col_vals_gte",
            RuleKind::ColValsEqual => "col_vals_equal",
            RuleKind::ColValsNotEqual => "col_vals_not_equal",
            RuleKind::ColValsBetween => "col_vals_between",
            RuleKind::ColValsNotBetween => "col_vals_not_between",
            RuleKind::ColValsInSet => "col_vals_in_set",
            RuleKind::ColValsNotInSet => "col_vals_not_in_set",
            RuleKind::ColValsNull => "col_vals_null",
            RuleKind::ColValsNotNull => "col_vals_not_null",
            RuleKind::ColValsRegex => "col_vals_regex",
            RuleKind::ColValsExpr => "col_vals_expr",
            RuleKind::ColCountMatch => "col_count_match",
            RuleKind::ColExists => "col_exists",
            RuleKind::RowsDistinct => "rows_distinct",
            RuleKind::RowsComplete => "rows_complete",
            RuleKind::RowCountMatch => "row_count_match",
            RuleKind::Conjointly => "conjointly",
            RuleKind::ColSchemaMatch => "col_schema_match",
        }
    }

    /// The whole vocabulary as one comma-separated string, for error
    /// messages a caller can correct from.
    pub fn vocabulary() -> String {
        RuleKind::ALL
            .iter()
            .map(RuleKind::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for RuleKind {
    type Err = RuleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "col_vals_lt" => Ok(RuleKind::ColValsLt),
            "col_vals_gt" => Ok(RuleKind::ColValsGt),
            "col_vals_lte" => Ok(RuleKind::ColValsLte),
            "col_vals_gte" => Ok(RuleKind::ColValsGte),
            "col_vals_equal" => Ok(RuleKind::ColValsEqual),
            "col_vals_not_equal" => Ok(RuleKind::ColValsNotEqual),
            "col_vals_between" => Ok(RuleKind::ColValsBetween),
            "col_vals_not_between" => Ok(RuleKind::ColValsNotBetween),
            "col_vals_in_set" => Ok(RuleKind::ColValsInSet),
            "col_vals_not_in_set" => Ok(RuleKind::ColValsNotInSet),
            "col_vals_null" => Ok(RuleKind::ColValsNull),
            "col_vals_not_null" => Ok(RuleKind::ColValsNotNull),
            "col_vals_regex" => Ok(RuleKind::ColValsRegex),
            "col_vals_expr" => Ok(RuleKind::ColValsExpr),
            "col_count_match" => Ok(RuleKind::ColCountMatch),
            "col_exists" => Ok(RuleKind::ColExists),
            "rows_distinct" => Ok(RuleKind::RowsDistinct),
            "rows_complete" => Ok(RuleKind::RowsComplete),
            "row_count_match" => Ok(RuleKind::RowCountMatch),
            "conjointly" => Ok(RuleKind::Conjointly),
            "col_schema_match" => Ok(RuleKind::ColSchemaMatch),
            other => Err(RuleError::UnknownType {
                requested: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `columns` accepts a single name or a list of names.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ColumnSpec {
    One(String),
    Many(Vec<String>),
}

impl ColumnSpec {
    fn into_columns(self) -> Vec<String> {
        match self {
            ColumnSpec::One(name) => vec![name],
            ColumnSpec::Many(names) => names,
        }
    }
}

/// Comparison operators for the single-bound value rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Gt,
    Lte,
    Gte,
    Eq,
    Ne,
}

// Parameter shapes, one struct per family. `deny_unknown_fields` is what
// turns a misspelled parameter into an actionable InvalidParams error
// instead of a silently ignored key.

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CompareParams {
    columns: ColumnSpec,
    value: ScalarValue,
    #[serde(default)]
    na_pass: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BetweenParams {
    columns: ColumnSpec,
    left: ScalarValue,
    right: ScalarValue,
    #[serde(default = "default_inclusive")]
    inclusive: (bool, bool),
    #[serde(default)]
    na_pass: bool,
}

fn default_inclusive() -> (bool, bool) {
    (true, true)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SetParams {
    columns: ColumnSpec,
    // The original engine spells this parameter `set_`; accept both.
    #[serde(alias = "set_")]
    set: Vec<ScalarValue>,
    #[serde(default)]
    na_pass: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ColumnsParams {
    columns: ColumnSpec,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegexParams {
    columns: ColumnSpec,
    pattern: String,
    #[serde(default)]
    na_pass: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExprParams {
    expr: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CountParams {
    count: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SubsetParams {
    #[serde(default)]
    columns_subset: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConjointlyParams {
    exprs: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaParams {
    columns: Vec<String>,
}

/// A validated rule, ready to evaluate.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Compare {
        op: CompareOp,
        columns: Vec<String>,
        value: ScalarValue,
        na_pass: bool,
    },
    Between {
        columns: Vec<String>,
        left: ScalarValue,
        right: ScalarValue,
        inclusive: (bool, bool),
        na_pass: bool,
        negate: bool,
    },
    InSet {
        columns: Vec<String>,
        set: Vec<ScalarValue>,
        na_pass: bool,
        negate: bool,
    },
    Null {
        columns: Vec<String>,
        negate: bool,
    },
    Regex {
        columns: Vec<String>,
        pattern: String,
        na_pass: bool,
    },
    Expr {
        expr: String,
    },
    ColCountMatch {
        count: usize,
    },
    ColExists {
        columns: Vec<String>,
    },
    RowsDistinct {
        columns_subset: Option<Vec<String>>,
    },
    RowsComplete {
        columns_subset: Option<Vec<String>>,
    },
    RowCountMatch {
        count: usize,
    },
    Conjointly {
        exprs: Vec<String>,
    },
    ColSchemaMatch {
        expected: Vec<(String, String)>,
    },
}

impl Rule {
    /// Parse and validate loose JSON parameters for `kind`.
    ///
    /// Everything that can be rejected without the table is rejected here:
    /// parameter shape, empty column lists, empty sets, unparseable regex
    /// patterns and expressions, malformed schema entries, negative counts.
    pub fn parse(kind: RuleKind, params: &Map<String, Value>) -> Result<Self, RuleError> {
        match kind {
            RuleKind::ColValsLt => parse_compare(kind, params, CompareOp::Lt),
            RuleKind::ColValsGt => parse_compare(kind, params, CompareOp::Gt),
            RuleKind::ColValsLte => parse_compare(kind, params, CompareOp::Lte),
            RuleKind::ColValsGte => parse_compare(kind, params, CompareOp::Gte),
            RuleKind::ColValsEqual => parse_compare(kind, params, CompareOp::Eq),
            RuleKind::ColValsNotEqual => parse_compare(kind, params, CompareOp::Ne),
            RuleKind::ColValsBetween => parse_between(kind, params, false),
            RuleKind::ColValsNotBetween => parse_between(kind, params, true),
            RuleKind::ColValsInSet => parse_set(kind, params, false),
            RuleKind::ColValsNotInSet => parse_set(kind, params, true),
            RuleKind::ColValsNull => parse_null(kind, params, false),
            RuleKind::ColValsNotNull => parse_null(kind, params, true),
            RuleKind::ColValsRegex => {
                let parsed: RegexParams = parse_params(kind, params)?;
                let columns = validated_columns(kind, params, parsed.columns)?;
                regex::Regex::new(&parsed.pattern)
                    .map_err(|e| invalid(kind, params, format!("invalid pattern: {e}")))?;
                Ok(Rule::Regex {
                    columns,
                    pattern: parsed.pattern,
                    na_pass: parsed.na_pass,
                })
            }
            RuleKind::ColValsExpr => {
                let parsed: ExprParams = parse_params(kind, params)?;
                validate_expression(kind, params, &parsed.expr)?;
                Ok(Rule::Expr { expr: parsed.expr })
            }
            RuleKind::ColCountMatch => {
                let parsed: CountParams = parse_params(kind, params)?;
                Ok(Rule::ColCountMatch {
                    count: validated_count(kind, params, parsed.count)?,
                })
            }
            RuleKind::ColExists => {
                let parsed: ColumnsParams = parse_params(kind, params)?;
                Ok(Rule::ColExists {
                    columns: validated_columns(kind, params, parsed.columns)?,
                })
            }
            RuleKind::RowsDistinct => {
                let parsed: SubsetParams = parse_params(kind, params)?;
                Ok(Rule::RowsDistinct {
                    columns_subset: validated_subset(kind, params, parsed.columns_subset)?,
                })
            }
            RuleKind::RowsComplete => {
                let parsed: SubsetParams = parse_params(kind, params)?;
                Ok(Rule::RowsComplete {
                    columns_subset: validated_subset(kind, params, parsed.columns_subset)?,
                })
            }
            RuleKind::RowCountMatch => {
                let parsed: CountParams = parse_params(kind, params)?;
                Ok(Rule::RowCountMatch {
                    count: validated_count(kind, params, parsed.count)?,
                })
            }
            RuleKind::Conjointly => {
                let parsed: ConjointlyParams = parse_params(kind, params)?;
                if parsed.exprs.is_empty() {
                    return Err(invalid(kind, params, "exprs must not be empty".to_string()));
                }
                for expr in &parsed.exprs {
                    validate_expression(kind, params, expr)?;
                }
                Ok(Rule::Conjointly {
                    exprs: parsed.exprs,
                })
            }
            RuleKind::ColSchemaMatch => {
                let parsed: SchemaParams = parse_params(kind, params)?;
                if parsed.columns.is_empty() {
                    return Err(invalid(
                        kind,
                        params,
                        "columns must not be empty".to_string(),
                    ));
                }
                let mut expected = Vec::with_capacity(parsed.columns.len());
                for entry in &parsed.columns {
                    let Some((name, dtype)) = entry.rsplit_once(':') else {
                        return Err(invalid(
                            kind,
                            params,
                            format!("schema entry `{entry}` is not of the form `name:dtype`"),
                        ));
                    };
                    if name.trim().is_empty() || dtype.trim().is_empty() {
                        return Err(invalid(
                            kind,
                            params,
                            format!("schema entry `{entry}` is not of the form `name:dtype`"),
                        ));
                    }
                    expected.push((name.trim().to_string(), dtype.trim().to_string()));
                }
                Ok(Rule::ColSchemaMatch { expected })
            }
        }
    }

    /// True when the rule classifies individual rows (and therefore
    /// contributes row evidence and sundered membership).
    pub fn is_row_level(&self) -> bool {
        !matches!(
            self,
            Rule::ColCountMatch { .. }
                | Rule::ColExists { .. }
                | Rule::RowCountMatch { .. }
                | Rule::ColSchemaMatch { .. }
        )
    }

    /// Columns named by the rule, for report output. Empty for whole-row
    /// and expression rules.
    pub fn columns(&self) -> Vec<String> {
        match self {
            Rule::Compare { columns, .. }
            | Rule::Between { columns, .. }
            | Rule::InSet { columns, .. }
            | Rule::Null { columns, .. }
            | Rule::Regex { columns, .. }
            | Rule::ColExists { columns } => columns.clone(),
            Rule::RowsDistinct { columns_subset } | Rule::RowsComplete { columns_subset } => {
                columns_subset.clone().unwrap_or_default()
            }
            Rule::ColSchemaMatch { expected } => {
                expected.iter().map(|(name, _)| name.clone()).collect()
            }
            Rule::Expr { .. } | Rule::Conjointly { .. } => Vec::new(),
            Rule::ColCountMatch { .. } | Rule::RowCountMatch { .. } => Vec::new(),
        }
    }

    /// Compact parameter rendering for report output.
    pub fn values_summary(&self) -> String {
        match self {
            Rule::Compare { value, .. } => value.to_string(),
            Rule::Between {
                left,
                right,
                inclusive,
                ..
            } => {
                let open = if inclusive.0 { '[' } else { '(' };
                let close = if inclusive.1 { ']' } else { ')' };
                format!("{open}{left}, {right}{close}")
            }
            Rule::InSet { set, .. } => {
                let rendered: Vec<String> = set.iter().map(ScalarValue::to_string).collect();
                format!("{{{}}}", rendered.join(", "))
            }
            Rule::Null { .. }
            | Rule::ColExists { .. }
            | Rule::RowsDistinct { .. }
            | Rule::RowsComplete { .. } => String::new(),
            Rule::Regex { pattern, .. } => pattern.clone(),
            Rule::Expr { expr } => expr.clone(),
            Rule::ColCountMatch { count } | Rule::RowCountMatch { count } => count.to_string(),
            Rule::Conjointly { exprs } => exprs.join(" AND "),
            Rule::ColSchemaMatch { expected } => {
                let rendered: Vec<String> = expected
                    .iter()
                    .map(|(name, dtype)| format!("{name}:{dtype}"))
                    .collect();
                rendered.join(", ")
            }
        }
    }
}

fn parse_compare(
    kind: RuleKind,
    params: &Map<String, Value>,
    op: CompareOp,
) -> Result<Rule, RuleError> {
    let parsed: CompareParams = parse_params(kind, params)?;
    Ok(Rule::Compare {
        op,
        columns: validated_columns(kind, params, parsed.columns)?,
        value: parsed.value,
        na_pass: parsed.na_pass,
    })
}

fn parse_between(
    kind: RuleKind,
    params: &Map<String, Value>,
    negate: bool,
) -> Result<Rule, RuleError> {
    let parsed: BetweenParams = parse_params(kind, params)?;
    Ok(Rule::Between {
        columns: validated_columns(kind, params, parsed.columns)?,
        left: parsed.left,
        right: parsed.right,
        inclusive: parsed.inclusive,
        na_pass: parsed.na_pass,
        negate,
    })
}

fn parse_set(kind: RuleKind, params: &Map<String, Value>, negate: bool) -> Result<Rule, RuleError> {
    let parsed: SetParams = parse_params(kind, params)?;
    if parsed.set.is_empty() {
        return Err(invalid(kind, params, "set must not be empty".to_string()));
    }
    Ok(Rule::InSet {
        columns: validated_columns(kind, params, parsed.columns)?,
        set: parsed.set,
        na_pass: parsed.na_pass,
        negate,
    })
}

fn parse_null(
    kind: RuleKind,
    params: &Map<String, Value>,
    negate: bool,
) -> Result<Rule, RuleError> {
    let parsed: ColumnsParams = parse_params(kind, params)?;
    Ok(Rule::Null {
        columns: validated_columns(kind, params, parsed.columns)?,
        negate,
    })
}

fn parse_params<T: DeserializeOwned>(
    kind: RuleKind,
    params: &Map<String, Value>,
) -> Result<T, RuleError> {
    serde_json::from_value(Value::Object(params.clone()))
        .map_err(|e| invalid(kind, params, e.to_string()))
}

fn validated_columns(
    kind: RuleKind,
    params: &Map<String, Value>,
    spec: ColumnSpec,
) -> Result<Vec<String>, RuleError> {
    let columns = spec.into_columns();
    if columns.is_empty() {
        return Err(invalid(
            kind,
            params,
            "columns must not be empty".to_string(),
        ));
    }
    if columns.iter().any(|name| name.trim().is_empty()) {
        return Err(invalid(
            kind,
            params,
            "column names must not be blank".to_string(),
        ));
    }
    Ok(columns)
}

fn validated_subset(
    kind: RuleKind,
    params: &Map<String, Value>,
    subset: Option<Vec<String>>,
) -> Result<Option<Vec<String>>, RuleError> {
    match subset {
        None => Ok(None),
        Some(columns) => {
            Ok(Some(validated_columns(kind, params, ColumnSpec::Many(columns))?))
        }
    }
}

fn validated_count(
    kind: RuleKind,
    params: &Map<String, Value>,
    count: i64,
) -> Result<usize, RuleError> {
    usize::try_from(count)
        .map_err(|_| invalid(kind, params, format!("count must be non-negative, got {count}")))
}

fn validate_expression(
    kind: RuleKind,
    params: &Map<String, Value>,
    expr: &str,
) -> Result<(), RuleError> {
    if expr.trim().is_empty() {
        return Err(invalid(kind, params, "expression must not be empty".to_string()));
    }
    polars::sql::sql_expr(expr)
        .map(|_| ())
        .map_err(|e| invalid(kind, params, format!("invalid expression `{expr}`: {e}")))
}

fn invalid(kind: RuleKind, params: &Map<String, Value>, message: String) -> RuleError {
    RuleError::InvalidParams {
        validation_type: kind.as_str().to_string(),
        params: Value::Object(params.clone()).to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object params, got {other}"),
        }
    }

    #[test]
    fn every_wire_name_round_trips() {
        for kind in RuleKind::ALL {
            assert_eq!(kind.as_str().parse::<RuleKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_type_lists_the_vocabulary() {
        let err = "col_vals_bogus".parse::<RuleKind>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("col_vals_bogus"));
        assert!(message.contains("col_vals_lt"));
        assert!(message.contains("col_schema_match"));
    }

    #[test]
    fn single_column_string_is_accepted() {
        let rule = Rule::parse(
            RuleKind::ColValsLt,
            &params(json!({"columns": "age", "value": 100})),
        )
        .unwrap();
        assert_eq!(
            rule,
            Rule::Compare {
                op: CompareOp::Lt,
                columns: vec!["age".to_string()],
                value: ScalarValue::Int(100),
                na_pass: false,
            }
        );
        assert!(rule.is_row_level());
    }

    #[test]
    fn unknown_parameter_names_are_rejected_with_echo() {
        let err = Rule::parse(
            RuleKind::ColValsLt,
            &params(json!({"columns": "age", "val": 100})),
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("col_vals_lt"));
        assert!(message.contains("\"val\":100"));
    }

    #[test]
    fn between_defaults_to_inclusive_bounds() {
        let rule = Rule::parse(
            RuleKind::ColValsBetween,
            &params(json!({"columns": ["age"], "left": 0, "right": 10})),
        )
        .unwrap();
        match rule {
            Rule::Between {
                inclusive, negate, ..
            } => {
                assert_eq!(inclusive, (true, true));
                assert!(!negate);
            }
            other => panic!("expected between rule, got {other:?}"),
        }
    }

    #[test]
    fn set_accepts_the_original_engines_spelling() {
        let rule = Rule::parse(
            RuleKind::ColValsInSet,
            &params(json!({"columns": "grade", "set_": ["a", "b"]})),
        )
        .unwrap();
        match rule {
            Rule::InSet { set, .. } => assert_eq!(set.len(), 2),
            other => panic!("expected set rule, got {other:?}"),
        }
    }

    #[test]
    fn empty_set_is_invalid() {
        let err = Rule::parse(
            RuleKind::ColValsInSet,
            &params(json!({"columns": "grade", "set": []})),
        )
        .unwrap_err();
        assert!(matches!(err, RuleError::InvalidParams { .. }));
    }

    #[test]
    fn bad_regex_fails_at_append_time() {
        let err = Rule::parse(
            RuleKind::ColValsRegex,
            &params(json!({"columns": "name", "pattern": "["})),
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid pattern"));
    }

    #[test]
    fn bad_expression_fails_at_append_time() {
        let err = Rule::parse(
            RuleKind::ColValsExpr,
            &params(json!({"expr": "score >"})),
        )
        .unwrap_err();
        assert!(matches!(err, RuleError::InvalidParams { .. }));
    }

    #[test]
    fn negative_count_is_invalid() {
        let err = Rule::parse(RuleKind::RowCountMatch, &params(json!({"count": -1}))).unwrap_err();
        assert!(err.to_string().contains("non-negative"));
    }

    #[test]
    fn schema_entries_must_be_name_colon_dtype() {
        let err = Rule::parse(
            RuleKind::ColSchemaMatch,
            &params(json!({"columns": ["age"]})),
        )
        .unwrap_err();
        assert!(err.to_string().contains("name:dtype"));

        let rule = Rule::parse(
            RuleKind::ColSchemaMatch,
            &params(json!({"columns": ["age:Int64", "name:String"]})),
        )
        .unwrap();
        match rule {
            Rule::ColSchemaMatch { expected } => {
                assert_eq!(expected[0], ("age".to_string(), "Int64".to_string()));
            }
            other => panic!("expected schema rule, got {other:?}"),
        }
        assert!(!Rule::parse(
            RuleKind::ColSchemaMatch,
            &params(json!({"columns": ["age:Int64"]})),
        )
        .unwrap()
        .is_row_level());
    }

    #[test]
    fn table_level_rules_are_flagged() {
        let rule = Rule::parse(RuleKind::ColCountMatch, &params(json!({"count": 3}))).unwrap();
        assert!(!rule.is_row_level());
        let rule = Rule::parse(
            RuleKind::RowsDistinct,
            &params(json!({})),
        )
        .unwrap();
        assert!(rule.is_row_level());
    }

    #[test]
    fn values_summary_is_compact() {
        let rule = Rule::parse(
            RuleKind::ColValsBetween,
            &params(json!({"columns": "x", "left": 0, "right": 1, "inclusive": [true, false]})),
        )
        .unwrap();
        assert_eq!(rule.values_summary(), "[0, 1)");

        let rule = Rule::parse(
            RuleKind::ColValsInSet,
            &params(json!({"columns": "x", "set": ["a", "b"]})),
        )
        .unwrap();
        assert_eq!(rule.values_summary(), "{a, b}");
    }
}
