//! Frame folders: discovery, month partitioning and sampling.

mod indexer;
mod layout;
mod sampler;

pub use indexer::{find_image_folders, index_folders, is_image_file};
pub use layout::{MonthKeyStrategy, SegmentUnderRoot, folder_key, parent_folder_key};
pub use sampler::{FrameSampler, PrimaryFrameSource, SampledFrameSet, uniform_indices};

use std::path::PathBuf;

/// A directory holding one camera-trap sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    /// Folder path as discovered under the frames root.
    pub path: PathBuf,
    /// Month key derived from the folder's location.
    pub month: String,
    /// Image file names, lexically sorted.
    pub images: Vec<String>,
}

impl Folder {
    /// Join key of this folder.
    pub fn key(&self) -> String {
        folder_key(&self.path)
    }
}
