//! Where per-month detector output lives on disk.

use crate::config::DetectionsConfig;
use crate::constants::MONTH_PLACEHOLDER;
use std::path::{Path, PathBuf};

/// Resolves detection table and merged output paths for a month.
#[derive(Debug, Clone)]
pub struct DetectionLayout {
    dir: PathBuf,
    table_dir: String,
    table_file: String,
    merged_file: String,
}

impl DetectionLayout {
    /// Build the layout from configuration.
    pub fn from_config(config: &DetectionsConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            table_dir: config.table_dir.clone(),
            table_file: config.table_file.clone(),
            merged_file: config.merged_file.clone(),
        }
    }

    /// Root directory of detector output.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Directory holding the given month's table.
    pub fn month_dir(&self, month: &str) -> PathBuf {
        self.dir.join(self.table_dir.replace(MONTH_PLACEHOLDER, month))
    }

    /// Detection table for a month.
    pub fn table_path(&self, month: &str) -> PathBuf {
        self.month_dir(month).join(&self.table_file)
    }

    /// Merged output for a month, written next to its table.
    pub fn merged_path(&self, month: &str) -> PathBuf {
        self.month_dir(month)
            .join(self.merged_file.replace(MONTH_PLACEHOLDER, month))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_paths() {
        let layout = DetectionLayout::from_config(&DetectionsConfig::default());
        assert_eq!(
            layout.table_path("202506"),
            PathBuf::from("preview_batch/predictions_202506_smoothed/sequence_max_detections.csv")
        );
        assert_eq!(
            layout.merged_path("202506"),
            PathBuf::from("preview_batch/predictions_202506_smoothed/merged_202506.csv")
        );
    }
}
