//! Readers: one entry point, three formats, one output type.
//!
//! CSV and parquet are handed straight to polars. Spreadsheets come in as
//! untyped calamine cells and get per-column type sniffing (numeric, then
//! boolean, then string fallback) before becoming a `DataFrame`.

use crate::error::TableError;
use crate::source::SourceFormat;
use calamine::{Data, Reader, open_workbook_auto};
use polars::prelude::*;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::fs::File;
use std::path::Path;

/// Load a table from disk, inferring the format from the extension.
///
/// The existence check runs before the extension check, so a missing
/// `data.txt` reports `NotFound` rather than `UnsupportedFormat`.
pub fn read_table(path: &Path) -> Result<(DataFrame, SourceFormat), TableError> {
    if !path.exists() {
        return Err(TableError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let format = SourceFormat::from_path(path)?;
    let frame = match format {
        SourceFormat::Csv => read_csv(path),
        SourceFormat::Spreadsheet => read_spreadsheet(path),
        SourceFormat::Parquet => read_parquet(path),
    }?;
    Ok((frame, format))
}

fn read_csv(path: &Path) -> Result<DataFrame, TableError> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| read_err(path, e))?
        .finish()
        .map_err(|e| read_err(path, e))
}

fn read_parquet(path: &Path) -> Result<DataFrame, TableError> {
    let file = File::open(path).map_err(|e| read_err(path, e))?;
    ParquetReader::new(file)
        .finish()
        .map_err(|e| read_err(path, e))
}

fn read_spreadsheet(path: &Path) -> Result<DataFrame, TableError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| read_err(path, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| TableError::EmptySheet {
            path: path.to_path_buf(),
        })?
        .map_err(|e| read_err(path, e))?;
    let rows: Vec<Vec<Data>> = range.rows().map(<[Data]>::to_vec).collect();
    frame_from_cells(path, &rows)
}

/// Build a frame from raw worksheet cells. First row is the header; column
/// width follows the header, ragged data rows are padded with empty cells.
fn frame_from_cells(path: &Path, rows: &[Vec<Data>]) -> Result<DataFrame, TableError> {
    let Some((header, data_rows)) = rows.split_first() else {
        return Err(TableError::EmptySheet {
            path: path.to_path_buf(),
        });
    };

    let names = header_names(header);
    if names.is_empty() {
        return Err(TableError::EmptySheet {
            path: path.to_path_buf(),
        });
    }

    let columns = names
        .iter()
        .enumerate()
        .map(|(idx, name)| sniff_column(name, data_rows, idx))
        .collect::<Vec<Column>>();
    DataFrame::new(columns).map_err(|e| read_err(path, e))
}

fn header_names(header: &[Data]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut names = Vec::with_capacity(header.len());
    for (idx, cell) in header.iter().enumerate() {
        let base = cell.to_string();
        let base = if base.trim().is_empty() {
            format!("column_{idx}")
        } else {
            base
        };
        // Duplicate headers get the column index appended to stay unique.
        let name = if seen.contains(&base) {
            format!("{base}_{idx}")
        } else {
            base
        };
        seen.insert(name.clone());
        names.push(name);
    }
    names
}

fn sniff_column(name: &str, rows: &[Vec<Data>], idx: usize) -> Column {
    let mut numeric = true;
    let mut boolean = true;
    let mut populated = 0usize;
    for row in rows {
        match row.get(idx).unwrap_or(&Data::Empty) {
            Data::Empty => {}
            Data::Float(_) | Data::Int(_) => {
                populated += 1;
                boolean = false;
            }
            Data::Bool(_) => {
                populated += 1;
                numeric = false;
            }
            _ => {
                populated += 1;
                numeric = false;
                boolean = false;
            }
        }
    }

    if populated > 0 && numeric {
        let values: Vec<Option<f64>> = rows
            .iter()
            .map(|row| match row.get(idx).unwrap_or(&Data::Empty) {
                Data::Float(value) => Some(*value),
                Data::Int(value) => Some(*value as f64),
                _ => None,
            })
            .collect();
        return Series::new(name.into(), values).into();
    }
    if populated > 0 && boolean {
        let values: Vec<Option<bool>> = rows
            .iter()
            .map(|row| match row.get(idx).unwrap_or(&Data::Empty) {
                Data::Bool(value) => Some(*value),
                _ => None,
            })
            .collect();
        return Series::new(name.into(), values).into();
    }

    let values: Vec<Option<String>> = rows
        .iter()
        .map(|row| match row.get(idx).unwrap_or(&Data::Empty) {
            Data::Empty => None,
            cell => Some(cell.to_string()),
        })
        .collect();
    Series::new(name.into(), values).into()
}

fn read_err(path: &Path, error: impl Display) -> TableError {
    TableError::Read {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}
