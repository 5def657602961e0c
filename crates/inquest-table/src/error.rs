use std::path::PathBuf;

/// Errors from table source operations.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("table source not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error(
        "unsupported source format `{extension}` for {}: expected .csv, .xls, .xlsx, or .parquet",
        path.display()
    )]
    UnsupportedFormat { extension: String, path: PathBuf },

    #[error("unsupported destination format for {}: only .csv output is supported", path.display())]
    UnsupportedDestination { path: PathBuf },

    #[error("failed to read {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    #[error("failed to write {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    #[error("spreadsheet has no readable worksheet: {}", path.display())]
    EmptySheet { path: PathBuf },
}
