//! Table source layer: every byte that enters or leaves the session as a file.
//!
//! ```text
//! source path ──▶ SourceFormat (extension) ──▶ read_table ──▶ DataFrame
//! DataFrame  ──▶ write_csv (temp file + rename) ──▶ destination path
//! ```
//!
//! Readers produce a polars `DataFrame` regardless of the on-disk format:
//! CSV and parquet go through polars directly, spreadsheets go through
//! calamine with per-column type sniffing. The CSV writer is the only
//! export path and replaces its destination atomically.

pub mod error;
pub mod read;
pub mod source;
pub mod write;

pub use error::TableError;
pub use read::read_table;
pub use source::{SourceFormat, ensure_csv_destination};
pub use write::write_csv;
