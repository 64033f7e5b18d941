//! Directory layout conventions: folder keys and month keys.

use std::path::{Component, Path};

/// Derives the month key of a frame folder from its location.
///
/// The month is a structural property of how the frames tree is laid out,
/// so the derivation is injected rather than hard-coded.
pub trait MonthKeyStrategy {
    /// Month key for `folder`, found under `root`, or `None` if the layout
    /// does not yield one.
    fn month_key(&self, root: &Path, folder: &Path) -> Option<String>;
}

/// Takes the month from a fixed path segment below the frames root.
///
/// With the default index 0, `Frames/202506/siteA` scanned from `Frames`
/// yields `202506`.
#[derive(Debug, Clone, Copy)]
pub struct SegmentUnderRoot {
    index: usize,
}

impl SegmentUnderRoot {
    /// Create a strategy reading segment `index` of the root-relative path.
    pub const fn new(index: usize) -> Self {
        Self { index }
    }
}

impl MonthKeyStrategy for SegmentUnderRoot {
    fn month_key(&self, root: &Path, folder: &Path) -> Option<String> {
        let relative = folder.strip_prefix(root).ok()?;
        relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(segment) => Some(segment),
                _ => None,
            })
            .nth(self.index)
            .map(|segment| segment.to_string_lossy().into_owned())
    }
}

/// Canonical string form of a folder path, used to join records that come
/// from different tools.
///
/// Components are joined with `/` and `.` segments dropped, so
/// `./Frames/202506/siteA` and `Frames/202506/siteA` share a key.
pub fn folder_key(path: &Path) -> String {
    let mut key = String::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::RootDir => key.push('/'),
            Component::Prefix(prefix) => key.push_str(&prefix.as_os_str().to_string_lossy()),
            Component::ParentDir | Component::Normal(_) => {
                if !key.is_empty() && !key.ends_with('/') {
                    key.push('/');
                }
                key.push_str(&component.as_os_str().to_string_lossy());
            }
        }
    }
    key
}

/// Folder key of the directory containing `file_reference`.
///
/// Returns an empty key for a bare file name.
pub fn parent_folder_key(file_reference: &str) -> String {
    Path::new(file_reference)
        .parent()
        .map(folder_key)
        .unwrap_or_default()
}
