use inquest_rules::RuleError;
use inquest_table::TableError;
use std::path::PathBuf;

/// Errors raised at the session boundary.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("table id `{table_id}` not found; load it first with load_table")]
    TableNotFound { table_id: String },

    #[error("validator id `{validator_id}` not found; create it first with create_validator")]
    ValidatorNotFound { validator_id: String },

    #[error("table id `{table_id}` already exists; choose a different id or omit it")]
    DuplicateTableId { table_id: String },

    #[error("validator id `{validator_id}` already exists; choose a different id or omit it")]
    DuplicateValidatorId { validator_id: String },

    /// Input-side source failures: missing file, unsupported extension,
    /// reader errors.
    #[error(transparent)]
    Table(#[from] TableError),

    #[error("unsupported output format for {}: use a .csv destination", path.display())]
    ExportFormat { path: PathBuf },

    #[error("{message}")]
    InvalidArgument { message: String },

    #[error("{message}")]
    UnsupportedType { message: String },

    #[error("{message}")]
    InvalidParams { message: String },

    #[error("{message}")]
    InvalidConfig { message: String },

    #[error("rule engine failure: {message}")]
    Engine { message: String },

    #[error("failed to write {}: {message}", path.display())]
    Persistence { path: PathBuf, message: String },
}

impl From<RuleError> for SessionError {
    fn from(error: RuleError) -> Self {
        let message = error.to_string();
        match error {
            RuleError::UnknownType { .. } => SessionError::UnsupportedType { message },
            RuleError::InvalidParams { .. } => SessionError::InvalidParams { message },
            RuleError::InvalidConfig { .. } => SessionError::InvalidConfig { message },
            RuleError::Eval { .. } => SessionError::Engine { message },
        }
    }
}
