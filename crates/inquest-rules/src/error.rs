use crate::rule::RuleKind;

/// Errors from the rules engine.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("unknown validation type `{requested}`; supported types: {}", RuleKind::vocabulary())]
    UnknownType { requested: String },

    #[error("invalid parameters for `{validation_type}` (params: {params}): {message}")]
    InvalidParams {
        validation_type: String,
        params: String,
        message: String,
    },

    #[error("invalid threshold configuration: {message}")]
    InvalidConfig { message: String },

    #[error("evaluation failed: {message}")]
    Eval { message: String },
}
