//! Detector coverage of the frames tree.

use crate::detections::referenced_folders;
use crate::error::Result;
use crate::frames::{find_image_folders, folder_key};
use std::path::Path;
use tracing::debug;

/// Frame folders not referenced by any detection table under
/// `detections_dir`, as sorted folder keys.
pub fn uncovered_folders(
    frames_root: &Path,
    extensions: &[String],
    detections_dir: &Path,
) -> Result<Vec<String>> {
    let referenced = referenced_folders(detections_dir)?;
    debug!("{} folder(s) referenced by detection tables", referenced.len());

    Ok(find_image_folders(frames_root, extensions)?
        .into_keys()
        .map(|path| folder_key(&path))
        .filter(|key| !referenced.contains(key))
        .collect())
}
