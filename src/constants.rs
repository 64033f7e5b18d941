//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "wildscene";

/// Default root directory scanned for frame folders.
pub const DEFAULT_FRAMES_ROOT: &str = "Frames";

/// Default directory for monthly annotation files and the run ledger.
pub const DEFAULT_OUTPUT_DIR: &str = "lvlm";

/// Default ledger file name (inside the output directory).
pub const DEFAULT_LEDGER_FILE: &str = "wildlife_lvlm_log.txt";

/// Placeholder substituted with a month key in path templates.
pub const MONTH_PLACEHOLDER: &str = "{month}";

/// Frame sampling defaults.
pub mod sampling {
    /// Number of uniformly spaced frames taken per folder.
    pub const DEFAULT_SAMPLES_PER_FOLDER: usize = 5;

    /// Path segment below the frames root that holds the month key.
    pub const DEFAULT_MONTH_SEGMENT: usize = 0;

    /// Image extensions recognised as frames (case-insensitive).
    pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg"];
}

/// Image preprocessing defaults.
pub mod preprocess {
    /// Frames taller than this are downscaled.
    pub const DEFAULT_MAX_HEIGHT: u32 = 720;

    /// JPEG quality used when re-encoding frames.
    pub const DEFAULT_JPEG_QUALITY: u8 = 85;

    /// MIME type of re-encoded frames.
    pub const MIME_TYPE: &str = "image/jpeg";
}

/// Multimodal endpoint defaults.
pub mod model {
    /// OpenAI-compatible API base URL.
    pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

    /// Model identifier.
    pub const DEFAULT_NAME: &str = "gpt-4o";

    /// Output-length ceiling for one annotation.
    pub const DEFAULT_MAX_TOKENS: u32 = 2048;

    /// Decoding temperature. Pinned for deterministic output.
    pub const TEMPERATURE: f32 = 0.0;

    /// Connection timeout in seconds.
    pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

    /// Whole-request timeout in seconds.
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

    /// Chat completions path appended to the base URL.
    pub const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

    /// Environment variable holding the API key.
    pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
}

/// Detection table layout defaults.
pub mod detections {
    /// Directory holding per-month detector output.
    pub const DEFAULT_DIR: &str = "preview_batch";

    /// Per-month directory name template.
    pub const DEFAULT_TABLE_DIR: &str = "predictions_{month}_smoothed";

    /// Detection table file name inside the month directory.
    pub const DEFAULT_TABLE_FILE: &str = "sequence_max_detections.csv";

    /// Merged output file name template.
    pub const DEFAULT_MERGED_FILE: &str = "merged_{month}.csv";

    /// Column holding the frame file reference.
    pub const FILE_NAME_COLUMN: &str = "file_name";

    /// Prefix stripped from monthly JSON stems when deriving a month key.
    pub const MONTH_FILE_PREFIX: &str = "predictions_";
}

/// Run ledger format.
pub mod ledger {
    /// Header line.
    pub const HEADER: &str = "folder\tinput_tokens\toutput_tokens";

    /// Folder column value of the terminal totals row.
    pub const TOTAL_KEY: &str = "TOTAL";
}

/// Merged table columns contributed by the annotation side.
pub mod merged {
    /// Join key column.
    pub const FOLDER: &str = "folder";
    /// Distinct species, comma separated.
    pub const SPECIES: &str = "gpt_species";
    /// Distinct-individual count.
    pub const COUNT: &str = "gpt_count";
    /// Free-text summary.
    pub const SUMMARY: &str = "gpt_summary";
    /// Raw individual list as JSON.
    pub const INDIVIDUALS: &str = "gpt_individuals";
    /// Representative thumbnail path.
    pub const SAMPLE_IMAGE: &str = "sample_image";
}

/// Placeholder value for unknown scene attributes.
pub const UNKNOWN: &str = "unknown";

/// Placeholder value for an individual with no interaction.
pub const NO_INTERACTION: &str = "none";

/// Summary written by dry runs.
pub const DRY_RUN_SUMMARY: &str = "[DRY RUN] No analysis performed";
