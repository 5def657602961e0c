//! Atomic CSV export. Evidence and report files are written to a unique
//! sibling temp path and renamed into place, so a failed write never
//! leaves a truncated file where a previous export used to be.

use crate::error::TableError;
use polars::prelude::*;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Write a frame as CSV at `path`, creating parent directories as needed.
///
/// polars' CSV writer needs `&mut DataFrame` for chunk alignment; callers
/// hand in a clone when they want to keep the original untouched.
pub fn write_csv(frame: &mut DataFrame, path: &Path) -> Result<(), TableError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| write_err(parent, e))?;
    }

    let tmp_path = tmp_write_path(path);
    let write_result = (|| -> Result<(), TableError> {
        let file = File::create(&tmp_path).map_err(|e| write_err(&tmp_path, e))?;
        let mut writer = BufWriter::new(file);
        CsvWriter::new(&mut writer)
            .include_header(true)
            .finish(frame)
            .map_err(|e| write_err(&tmp_path, e))?;
        writer.flush().map_err(|e| write_err(&tmp_path, e))?;
        let file = writer
            .into_inner()
            .map_err(|e| write_err(&tmp_path, e))?;
        file.sync_all().map_err(|e| write_err(&tmp_path, e))?;
        Ok(())
    })();

    if let Err(error) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        TableError::Write {
            path: path.to_path_buf(),
            message: format!("rename from {}: {e}", tmp_path.display()),
        }
    })?;

    Ok(())
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp.{}.{}", std::process::id(), unique));
    PathBuf::from(tmp)
}

fn write_err(path: &Path, error: impl std::fmt::Display) -> TableError {
    TableError::Write {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(prefix: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "inquest-write-{prefix}-{}-{unique}",
            std::process::id()
        ))
    }

    #[test]
    fn creates_parent_directories() {
        let dir = temp_dir("parents");
        let path = dir.join("deep").join("nested").join("out.csv");
        let mut frame = df!("a" => [1i64, 2]).expect("frame should build");

        write_csv(&mut frame, &path).expect("write should succeed");
        let written = fs::read_to_string(&path).expect("csv should exist");
        assert!(written.starts_with("a\n"));
        assert!(written.contains('1'));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn replaces_existing_file_atomically() {
        let dir = temp_dir("replace");
        let path = dir.join("out.csv");
        let mut first = df!("v" => ["old"]).expect("frame should build");
        write_csv(&mut first, &path).expect("first write should succeed");

        let mut second = df!("v" => ["new"]).expect("frame should build");
        write_csv(&mut second, &path).expect("second write should succeed");

        let written = fs::read_to_string(&path).expect("csv should exist");
        assert!(!written.contains("old"));
        assert!(written.contains("new"));
        // No temp droppings left behind.
        let leftovers = fs::read_dir(&dir)
            .expect("dir should list")
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp."))
            .count();
        assert_eq!(leftovers, 0);

        let _ = fs::remove_dir_all(dir);
    }
}
