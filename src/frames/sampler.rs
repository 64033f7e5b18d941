//! Frame selection for one folder.
//!
//! A folder may hold hundreds of frames from one trigger sequence. The sampler
//! picks a small, evenly spread subset and makes sure the frame an external
//! detector considered most diagnostic is part of it.

use crate::frames::Folder;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Source of the externally designated primary frame of a folder.
pub trait PrimaryFrameSource {
    /// File name of the primary frame, if one is recorded for `folder`.
    fn primary_frame(&self, folder: &Folder) -> Option<String>;
}

/// Ordered frames chosen from one folder.
///
/// Frames are file names in lexical order, without duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampledFrameSet {
    folder: PathBuf,
    frames: Vec<String>,
    primary: Option<String>,
}

impl SampledFrameSet {
    /// Sampled file names in presentation order.
    pub fn names(&self) -> &[String] {
        &self.frames
    }

    /// Full paths of the sampled frames.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.frames.iter().map(|name| self.folder.join(name)).collect()
    }

    /// Primary frame that was added on top of the uniform sample.
    pub fn added_primary(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    /// Number of sampled frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True when the folder had nothing to annotate.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Selects frames uniformly by index, plus an optional primary frame.
pub struct FrameSampler<'a> {
    count: usize,
    primary: Option<&'a dyn PrimaryFrameSource>,
}

impl<'a> FrameSampler<'a> {
    /// Create a sampler taking `count` frames per folder.
    pub fn new(count: usize, primary: Option<&'a dyn PrimaryFrameSource>) -> Self {
        Self { count, primary }
    }

    /// Configured sample count.
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Select frames from `folder`.
    ///
    /// Folders with at most `count` images are returned whole. Larger folders
    /// yield `count` frames at `floor(i * total / count)`, plus the primary
    /// frame when it is known and not already selected. The result is always
    /// sorted, and identical for identical folder contents.
    pub fn sample(&self, folder: &Folder) -> SampledFrameSet {
        let total = folder.images.len();

        if total <= self.count {
            return SampledFrameSet {
                folder: folder.path.clone(),
                frames: folder.images.clone(),
                primary: None,
            };
        }

        let mut frames: Vec<String> = uniform_indices(total, self.count)
            .into_iter()
            .map(|idx| folder.images[idx].clone())
            .collect();

        let mut added = None;
        if let Some(primary) = self.primary.and_then(|source| source.primary_frame(folder)) {
            if frames.contains(&primary) {
                debug!("Primary frame {primary} already sampled");
            } else if folder.images.binary_search(&primary).is_ok() {
                debug!("Adding primary frame {primary}");
                frames.push(primary.clone());
                added = Some(primary);
            } else {
                warn!(
                    "Primary frame {primary} is not in {}, ignoring",
                    folder.path.display()
                );
            }
        }

        frames.sort();
        frames.dedup();

        SampledFrameSet {
            folder: folder.path.clone(),
            frames,
            primary: added,
        }
    }
}

/// Indices of `count` frames spread evenly over `total`.
///
/// Uses a fractional stride so that `total` need not divide evenly.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn uniform_indices(total: usize, count: usize) -> Vec<usize> {
    if count == 0 || total == 0 {
        return Vec::new();
    }
    if total <= count {
        return (0..total).collect();
    }
    let step = total as f64 / count as f64;
    (0..count).map(|i| (i as f64 * step) as usize).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FixedPrimary(HashMap<PathBuf, String>);

    impl PrimaryFrameSource for FixedPrimary {
        fn primary_frame(&self, folder: &Folder) -> Option<String> {
            self.0.get(&folder.path).cloned()
        }
    }

    fn folder(count: usize) -> Folder {
        Folder {
            path: PathBuf::from("Frames/202506/siteA"),
            month: "202506".to_string(),
            images: (1..=count).map(|i| format!("f{i:03}.jpg")).collect(),
        }
    }

    fn with_primary(name: &str) -> FixedPrimary {
        FixedPrimary(HashMap::from([(
            PathBuf::from("Frames/202506/siteA"),
            name.to_string(),
        )]))
    }

    #[test]
    fn test_uniform_indices_fractional_stride() {
        assert_eq!(uniform_indices(12, 5), vec![0, 2, 4, 7, 9]);
        assert_eq!(uniform_indices(10, 5), vec![0, 2, 4, 6, 8]);
        assert_eq!(uniform_indices(3, 5), vec![0, 1, 2]);
        assert!(uniform_indices(0, 5).is_empty());
    }

    #[test]
    fn test_small_folder_returned_whole() {
        let sampler = FrameSampler::new(5, None);
        let sample = sampler.sample(&folder(4));
        assert_eq!(sample.names(), folder(4).images.as_slice());
        assert!(sample.added_primary().is_none());
    }

    #[test]
    fn test_small_folder_ignores_primary() {
        let primary = with_primary("f002.jpg");
        let sampler = FrameSampler::new(5, Some(&primary));
        let sample = sampler.sample(&folder(5));
        assert_eq!(sample.len(), 5);
        assert!(sample.added_primary().is_none());
    }

    #[test]
    fn test_twelve_frames_sample_five() {
        let sampler = FrameSampler::new(5, None);
        let sample = sampler.sample(&folder(12));
        assert_eq!(
            sample.names(),
            ["f001.jpg", "f003.jpg", "f005.jpg", "f008.jpg", "f010.jpg"]
        );
    }

    #[test]
    fn test_primary_frame_inserted_in_order() {
        let primary = with_primary("f012.jpg");
        let sampler = FrameSampler::new(5, Some(&primary));
        let sample = sampler.sample(&folder(12));
        assert_eq!(sample.len(), 6);
        assert_eq!(sample.names().last().unwrap(), "f012.jpg");
        assert_eq!(sample.added_primary(), Some("f012.jpg"));

        let primary = with_primary("f006.jpg");
        let sampler = FrameSampler::new(5, Some(&primary));
        let sample = sampler.sample(&folder(12));
        assert_eq!(
            sample.names(),
            ["f001.jpg", "f003.jpg", "f005.jpg", "f006.jpg", "f008.jpg", "f010.jpg"]
        );
    }

    #[test]
    fn test_primary_already_sampled_not_duplicated() {
        let primary = with_primary("f005.jpg");
        let sampler = FrameSampler::new(5, Some(&primary));
        let sample = sampler.sample(&folder(12));
        assert_eq!(sample.len(), 5);
        assert!(sample.added_primary().is_none());
    }

    #[test]
    fn test_primary_outside_folder_ignored() {
        let primary = with_primary("other.jpg");
        let sampler = FrameSampler::new(5, Some(&primary));
        let sample = sampler.sample(&folder(12));
        assert_eq!(sample.len(), 5);
    }

    #[test]
    fn test_sample_is_idempotent_and_sorted() {
        let primary = with_primary("f011.jpg");
        let sampler = FrameSampler::new(5, Some(&primary));
        let big = folder(200);
        let first = sampler.sample(&big);
        let second = sampler.sample(&big);
        assert_eq!(first, second);
        assert!(first.names().windows(2).all(|w| w[0] < w[1]));
        assert!(first.len() == 5 || first.len() == 6);
    }

    #[test]
    fn test_empty_folder_yields_empty_sample() {
        let sampler = FrameSampler::new(5, None);
        assert!(sampler.sample(&folder(0)).is_empty());
    }

    #[test]
    fn test_paths_join_folder() {
        let sampler = FrameSampler::new(5, None);
        let sample = sampler.sample(&folder(1));
        assert_eq!(
            sample.paths(),
            vec![PathBuf::from("Frames/202506/siteA/f001.jpg")]
        );
    }
}
