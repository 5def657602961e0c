//! Scalar literals as they arrive from callers: JSON numbers, strings, and
//! booleans, kept apart so integer comparisons stay integer comparisons.

use polars::prelude::{Expr, lit};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A parameter literal from a rule's loose JSON parameters.
///
/// Untagged: serde tries bool, then integer, then float, then string, which
/// matches how JSON numbers degrade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ScalarValue {
    /// The literal as a polars expression, preserving its JSON type.
    pub fn to_expr(&self) -> Expr {
        match self {
            ScalarValue::Bool(value) => lit(*value),
            ScalarValue::Int(value) => lit(*value),
            ScalarValue::Float(value) => lit(*value),
            ScalarValue::Str(value) => lit(value.as_str()),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Bool(value) => write!(f, "{value}"),
            ScalarValue::Int(value) => write!(f, "{value}"),
            ScalarValue::Float(value) => write!(f, "{value}"),
            ScalarValue::Str(value) => write!(f, "{value}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_numbers_keep_their_kind() {
        let int: ScalarValue = serde_json::from_str("100").unwrap();
        assert_eq!(int, ScalarValue::Int(100));

        let float: ScalarValue = serde_json::from_str("0.5").unwrap();
        assert_eq!(float, ScalarValue::Float(0.5));

        let boolean: ScalarValue = serde_json::from_str("true").unwrap();
        assert_eq!(boolean, ScalarValue::Bool(true));

        let text: ScalarValue = serde_json::from_str("\"100\"").unwrap();
        assert_eq!(text, ScalarValue::Str("100".to_string()));
    }

    #[test]
    fn display_is_bare() {
        assert_eq!(ScalarValue::Int(7).to_string(), "7");
        assert_eq!(ScalarValue::Str("seven".into()).to_string(), "seven");
    }
}
