//! Merged table CSV writer.

use crate::error::{Error, Result};
use std::path::Path;

/// Rows of a joined table, aligned with `headers`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedTable {
    /// Column names.
    pub headers: Vec<String>,
    /// Row values; missing fields are empty strings.
    pub rows: Vec<Vec<String>>,
}

impl MergedTable {
    /// Index of `column`, if present.
    pub fn column(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Value of `column` in row `row`.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column(column)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }
}

/// Write `table` to `path`, replacing any previous file.
pub fn write_merged(path: &Path, table: &MergedTable) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::OutputDirCreateFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let write_err = |e| Error::MergedWrite {
        path: path.to_path_buf(),
        source: e,
    };

    let mut writer = csv::Writer::from_path(path).map_err(write_err)?;
    writer.write_record(&table.headers).map_err(write_err)?;
    for row in &table.rows {
        writer.write_record(row).map_err(write_err)?;
    }
    writer
        .flush()
        .map_err(|e| write_err(csv::Error::from(e)))?;
    Ok(())
}
