//! Discovery of frame folders under a root directory.

use crate::error::{Error, Result};
use crate::frames::{Folder, MonthKeyStrategy};
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Find every directory under `root` that directly contains image files.
///
/// Returns a map from directory path to its lexically sorted image file
/// names. Directories are ordered by path.
pub fn find_image_folders(
    root: &Path,
    extensions: &[String],
) -> Result<BTreeMap<PathBuf, Vec<String>>> {
    if !root.is_dir() {
        return Err(Error::FramesRootNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut folders: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|e| Error::FolderScan {
            path: root.to_path_buf(),
            source: e,
        })?;

        if !entry.file_type().is_file() || !is_image_file(entry.path(), extensions) {
            continue;
        }

        let Some(parent) = entry.path().parent() else {
            continue;
        };
        folders
            .entry(parent.to_path_buf())
            .or_default()
            .push(entry.file_name().to_string_lossy().into_owned());
    }

    for images in folders.values_mut() {
        images.sort();
    }

    Ok(folders)
}

/// Index all frame folders under `root`, deriving each folder's month key.
///
/// Folders are returned in folder-key string order.
///
/// A folder whose month key cannot be derived is an error: the layout
/// assumption behind the whole run does not hold for it.
pub fn index_folders(
    root: &Path,
    extensions: &[String],
    month_key: &dyn MonthKeyStrategy,
) -> Result<Vec<Folder>> {
    let found = find_image_folders(root, extensions)?;
    debug!("Found {} image folder(s) under {}", found.len(), root.display());

    let mut folders = found
        .into_iter()
        .map(|(path, images)| {
            let month = month_key
                .month_key(root, &path)
                .ok_or_else(|| Error::MonthKeyMissing { path: path.clone() })?;
            Ok(Folder {
                path,
                month,
                images,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // Folder keys compare as plain strings, so `a-b` precedes `a/x`.
    folders.sort_by_cached_key(Folder::key);
    Ok(folders)
}

/// Check if a file has one of the recognised image extensions.
pub fn is_image_file(path: &Path, extensions: &[String]) -> bool {
    path.extension().is_some_and(|ext| {
        extensions
            .iter()
            .any(|allowed| ext.eq_ignore_ascii_case(OsStr::new(allowed)))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::frames::SegmentUnderRoot;
    use std::fs;
    use tempfile::TempDir;

    fn extensions() -> Vec<String> {
        vec!["jpg".to_string(), "jpeg".to_string()]
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_is_image_file() {
        let exts = extensions();
        assert!(is_image_file(Path::new("f001.jpg"), &exts));
        assert!(is_image_file(Path::new("F001.JPG"), &exts));
        assert!(is_image_file(Path::new("frame.jpeg"), &exts));
        assert!(!is_image_file(Path::new("notes.txt"), &exts));
        assert!(!is_image_file(Path::new("jpg"), &exts));
    }

    #[test]
    fn test_find_image_folders_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("Frames");
        touch(&root.join("202506/siteB/b2.jpg"));
        touch(&root.join("202506/siteB/b1.jpg"));
        touch(&root.join("202506/siteA/a1.JPG"));
        touch(&root.join("202506/siteA/readme.txt"));
        touch(&root.join("202506/empty/readme.txt"));

        let folders = find_image_folders(&root, &extensions()).unwrap();
        let keys: Vec<_> = folders.keys().cloned().collect();
        assert_eq!(
            keys,
            vec![root.join("202506/siteA"), root.join("202506/siteB")]
        );
        assert_eq!(folders[&root.join("202506/siteB")], vec!["b1.jpg", "b2.jpg"]);
        assert_eq!(folders[&root.join("202506/siteA")], vec!["a1.JPG"]);
    }

    #[test]
    fn test_index_folders_derives_months() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("Frames");
        touch(&root.join("202506/siteA/f1.jpg"));
        touch(&root.join("202507/siteA/f1.jpg"));

        let folders = index_folders(&root, &extensions(), &SegmentUnderRoot::new(0)).unwrap();
        let months: Vec<_> = folders.iter().map(|f| f.month.as_str()).collect();
        assert_eq!(months, vec!["202506", "202507"]);
    }

    #[test]
    fn test_index_folders_orders_by_key_string() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("Frames");
        touch(&root.join("202506/a/x/f1.jpg"));
        touch(&root.join("202506/a-b/f1.jpg"));
        touch(&root.join("202506/a/f1.jpg"));

        let folders = index_folders(&root, &extensions(), &SegmentUnderRoot::new(0)).unwrap();
        let paths: Vec<_> = folders.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                root.join("202506/a"),
                root.join("202506/a-b"),
                root.join("202506/a/x"),
            ]
        );
    }

    #[test]
    fn test_index_folders_rejects_images_at_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("Frames");
        touch(&root.join("stray.jpg"));

        let result = index_folders(&root, &extensions(), &SegmentUnderRoot::new(0));
        assert!(matches!(result, Err(Error::MonthKeyMissing { .. })));
    }

    #[test]
    fn test_missing_root() {
        let result = find_image_folders(Path::new("/nonexistent/frames/root"), &extensions());
        assert!(matches!(result, Err(Error::FramesRootNotFound { .. })));
    }
}
