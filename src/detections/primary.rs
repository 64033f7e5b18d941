//! Lookup of the detector's most salient frame for a folder.

use crate::detections::DetectionLayout;
use crate::detections::table::file_name_index;
use crate::frames::{Folder, PrimaryFrameSource, parent_folder_key};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Finds a folder's primary frame in its month's detection table.
///
/// Best-effort: a missing table, a table without a `file_name` column, or
/// malformed rows never fail the run.
#[derive(Debug, Clone)]
pub struct PrimaryFrameResolver {
    layout: DetectionLayout,
}

impl PrimaryFrameResolver {
    /// Create a resolver over the given table layout.
    pub const fn new(layout: DetectionLayout) -> Self {
        Self { layout }
    }

    /// File reference of the first table row whose parent folder is `folder`.
    pub fn resolve(&self, folder: &Folder) -> Option<PathBuf> {
        let table_path = self.layout.table_path(&folder.month);
        if !table_path.exists() {
            debug!("No detection table for month {}", folder.month);
            return None;
        }

        let mut reader = match csv::ReaderBuilder::new().from_path(&table_path) {
            Ok(reader) => reader,
            Err(e) => {
                warn!("Cannot open {}: {e}", table_path.display());
                return None;
            }
        };

        let file_idx = reader
            .headers()
            .ok()
            .map(|h| h.iter().map(ToString::to_string).collect::<Vec<_>>())
            .and_then(|h| file_name_index(&h));
        let Some(file_idx) = file_idx else {
            warn!("{} has no file_name column", table_path.display());
            return None;
        };

        let wanted = folder.key();
        for (line, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    debug!("Skipping malformed row {} of {}: {e}", line + 2, table_path.display());
                    continue;
                }
            };
            let Some(file_name) = record.get(file_idx) else {
                continue;
            };
            if parent_folder_key(file_name) == wanted {
                return Some(PathBuf::from(file_name));
            }
        }

        None
    }
}

impl PrimaryFrameSource for PrimaryFrameResolver {
    fn primary_frame(&self, folder: &Folder) -> Option<String> {
        self.resolve(folder)?
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }
}
