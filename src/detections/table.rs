//! Detection table parsing.
//!
//! A detection table is produced by the external detector: one row per
//! sequence folder, with the frame it considered most salient in
//! `file_name` plus any number of detector-native columns. Columns are kept
//! as-is so they can be carried into the merged output.

use crate::constants::detections::FILE_NAME_COLUMN;
use crate::error::{Error, Result};
use crate::frames::parent_folder_key;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// One row of a detection table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionRow {
    /// Frame file reference.
    pub file_name: String,
    /// All column values, aligned with the table headers.
    pub values: Vec<String>,
}

impl DetectionRow {
    /// Join key: the folder containing the referenced frame.
    pub fn folder_key(&self) -> String {
        parent_folder_key(&self.file_name)
    }
}

/// A fully loaded detection table.
#[derive(Debug, Clone)]
pub struct DetectionTable {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<DetectionRow>,
}

impl DetectionTable {
    /// Load a table, failing on any malformed row.
    ///
    /// Handles a UTF-8 BOM and quoted fields.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::DetectionTableNotFound {
                path: path.to_path_buf(),
            });
        }

        let read_err = |e| Error::DetectionTableRead {
            path: path.to_path_buf(),
            source: e,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(read_err)?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(read_err)?
            .iter()
            .map(ToString::to_string)
            .collect();

        let file_idx = file_name_index(&headers).ok_or_else(|| Error::DetectionColumnMissing {
            path: path.to_path_buf(),
            column: FILE_NAME_COLUMN,
        })?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(read_err)?;
            let values: Vec<String> = record.iter().map(ToString::to_string).collect();
            rows.push(DetectionRow {
                file_name: values.get(file_idx).cloned().unwrap_or_default(),
                values,
            });
        }

        debug!("Loaded {} detection row(s) from {}", rows.len(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    /// Source path of the table.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Column names in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Rows in file order.
    pub fn rows(&self) -> &[DetectionRow] {
        &self.rows
    }

    /// Value of `column` in `row`, if the column exists.
    pub fn value<'a>(&self, row: &'a DetectionRow, column: &str) -> Option<&'a str> {
        let idx = self.headers.iter().position(|h| h == column)?;
        row.values.get(idx).map(String::as_str)
    }
}

/// Position of the `file_name` column.
pub(crate) fn file_name_index(headers: &[String]) -> Option<usize> {
    headers.iter().position(|h| h.trim() == FILE_NAME_COLUMN)
}

/// Collect the folder keys referenced by every CSV under `dir`.
///
/// Files without a `file_name` column and unreadable rows are skipped; this
/// is a read-only survey, not a validation.
pub fn referenced_folders(dir: &Path) -> Result<BTreeSet<String>> {
    let mut folders = BTreeSet::new();

    if !dir.is_dir() {
        warn!("Detections directory does not exist: {}", dir.display());
        return Ok(folders);
    }

    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|e| Error::FolderScan {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !entry.file_type().is_file()
            || !path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        {
            continue;
        }

        let mut reader = match csv::ReaderBuilder::new().flexible(true).from_path(path) {
            Ok(reader) => reader,
            Err(e) => {
                warn!("Skipping unreadable table {}: {e}", path.display());
                continue;
            }
        };
        let Some(file_idx) = reader
            .headers()
            .ok()
            .and_then(|h| file_name_index(&h.iter().map(ToString::to_string).collect::<Vec<_>>()))
        else {
            debug!("Skipping {} (no {FILE_NAME_COLUMN} column)", path.display());
            continue;
        };

        for record in reader.records().filter_map(std::result::Result::ok) {
            if let Some(file_name) = record.get(file_idx).filter(|f| !f.is_empty()) {
                folders.insert(parent_folder_key(file_name));
            }
        }
    }

    Ok(folders)
}
