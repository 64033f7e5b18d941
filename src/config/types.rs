//! Configuration type definitions.

use crate::constants::{
    self, DEFAULT_FRAMES_ROOT, DEFAULT_LEDGER_FILE, DEFAULT_OUTPUT_DIR, detections, model,
    preprocess, sampling,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input and output locations.
    pub paths: PathsConfig,

    /// Frame sampling settings.
    pub sampling: SamplingConfig,

    /// Image preprocessing settings.
    pub preprocess: PreprocessConfig,

    /// Multimodal endpoint settings.
    pub model: ModelConfig,

    /// Detection table layout.
    pub detections: DetectionsConfig,
}

/// Input and output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root directory scanned for frame folders.
    pub frames_root: PathBuf,

    /// Directory receiving monthly JSON files and the ledger.
    pub output_dir: PathBuf,

    /// Ledger file name inside `output_dir`.
    pub ledger_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            frames_root: PathBuf::from(DEFAULT_FRAMES_ROOT),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            ledger_file: DEFAULT_LEDGER_FILE.to_string(),
        }
    }
}

impl PathsConfig {
    /// Full path of the run ledger.
    pub fn ledger_path(&self) -> PathBuf {
        self.output_dir.join(&self.ledger_file)
    }
}

/// Frame sampling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Uniformly spaced frames taken per folder.
    pub samples_per_folder: usize,

    /// Path segment below the frames root holding the month key.
    pub month_segment: usize,

    /// Recognised image extensions (case-insensitive, without dot).
    pub image_extensions: Vec<String>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            samples_per_folder: sampling::DEFAULT_SAMPLES_PER_FOLDER,
            month_segment: sampling::DEFAULT_MONTH_SEGMENT,
            image_extensions: sampling::DEFAULT_IMAGE_EXTENSIONS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Image preprocessing settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Frames taller than this are downscaled.
    pub max_height: u32,

    /// JPEG quality (1-100).
    pub jpeg_quality: u8,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            max_height: preprocess::DEFAULT_MAX_HEIGHT,
            jpeg_quality: preprocess::DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Multimodal endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// OpenAI-compatible API base URL.
    pub base_url: String,

    /// Model identifier.
    pub name: String,

    /// Output-length ceiling.
    pub max_tokens: u32,

    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: model::DEFAULT_BASE_URL.to_string(),
            name: model::DEFAULT_NAME.to_string(),
            max_tokens: model::DEFAULT_MAX_TOKENS,
            connect_timeout_secs: model::DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: model::DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Detection table layout.
///
/// `table_dir` and `merged_file` are templates containing `{month}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionsConfig {
    /// Directory holding per-month detector output.
    pub dir: PathBuf,

    /// Per-month directory name template.
    pub table_dir: String,

    /// Table file name inside the month directory.
    pub table_file: String,

    /// Merged output file name template.
    pub merged_file: String,
}

impl Default for DetectionsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(detections::DEFAULT_DIR),
            table_dir: detections::DEFAULT_TABLE_DIR.to_string(),
            table_file: detections::DEFAULT_TABLE_FILE.to_string(),
            merged_file: detections::DEFAULT_MERGED_FILE.to_string(),
        }
    }
}

impl DetectionsConfig {
    /// Whether both templates carry the month placeholder.
    pub fn templates_have_month(&self) -> bool {
        self.table_dir.contains(constants::MONTH_PLACEHOLDER)
            && self.merged_file.contains(constants::MONTH_PLACEHOLDER)
    }
}
