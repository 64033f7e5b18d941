//! Per-month annotation files.

use crate::annotate::AnnotationRecord;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// One annotated folder in a monthly file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyEntry {
    /// Folder path as processed.
    pub folder: String,
    /// Sampled frame file names, in the order they were sent.
    pub image_frames: Vec<String>,
    /// Scene annotation.
    pub analysis: AnnotationRecord,
    /// Folder statistics.
    pub metadata: FolderMetadata,
}

impl MonthlyEntry {
    /// Path of the first sampled frame, used as a thumbnail.
    pub fn sample_image(&self) -> Option<String> {
        self.image_frames
            .first()
            .map(|frame| Path::new(&self.folder).join(frame).to_string_lossy().into_owned())
    }
}

/// Image counts for a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderMetadata {
    /// Images found in the folder.
    pub total_images_in_folder: usize,
    /// Images sent to the model.
    pub sampled_images: usize,
}

/// Write a month's entries as a pretty-printed JSON array, replacing any
/// previous file.
pub fn write_monthly(path: &Path, entries: &[MonthlyEntry]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::OutputDirCreateFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, entries).map_err(|e| Error::JsonWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    writer.flush()?;
    Ok(())
}

/// Read a monthly file.
pub fn read_monthly(path: &Path) -> Result<Vec<MonthlyEntry>> {
    if !path.exists() {
        return Err(Error::AnnotationFileNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path)?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| Error::AnnotationFileParse {
        path: path.to_path_buf(),
        source: e,
    })
}
