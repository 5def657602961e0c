//! Source format inference. Formats are recognized by file extension only;
//! nothing is opened or sniffed before the extension check passes.

use crate::error::TableError;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::Path;

/// On-disk formats a table can be loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    Csv,
    Spreadsheet,
    Parquet,
}

impl SourceFormat {
    /// Infer the format from a path's extension, case-insensitively.
    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        let extension = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") => Ok(SourceFormat::Csv),
            Some("xls") | Some("xlsx") => Ok(SourceFormat::Spreadsheet),
            Some("parquet") => Ok(SourceFormat::Parquet),
            other => Err(TableError::UnsupportedFormat {
                extension: other.unwrap_or_default().to_string(),
                path: path.to_path_buf(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Csv => "csv",
            SourceFormat::Spreadsheet => "spreadsheet",
            SourceFormat::Parquet => "parquet",
        }
    }
}

/// Reject any export destination that is not a `.csv` path.
///
/// Called before any computation so a bad destination never costs an
/// interrogation.
pub fn ensure_csv_destination(path: &Path) -> Result<(), TableError> {
    let is_csv = path
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        Ok(())
    } else {
        Err(TableError::UnsupportedDestination {
            path: path.to_path_buf(),
        })
    }
}
