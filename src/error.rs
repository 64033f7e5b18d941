//! Error types for wildscene.

/// Result type alias for wildscene operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for wildscene.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// Frames root directory does not exist.
    #[error("frames root does not exist: {path}")]
    FramesRootNotFound {
        /// Path that was scanned.
        path: std::path::PathBuf,
    },

    /// Walking the frames tree failed.
    #[error("failed to scan '{path}'")]
    FolderScan {
        /// Root of the scan.
        path: std::path::PathBuf,
        /// Underlying walk error.
        #[source]
        source: walkdir::Error,
    },

    /// A folder's month key could not be derived from its path.
    #[error("cannot derive a month key for folder '{path}'")]
    MonthKeyMissing {
        /// Folder path.
        path: std::path::PathBuf,
    },

    /// Failed to decode an image.
    #[error("failed to decode image '{path}'")]
    ImageDecode {
        /// Path to the image.
        path: std::path::PathBuf,
        /// Underlying image error.
        #[source]
        source: image::ImageError,
    },

    /// Failed to re-encode an image for transmission.
    #[error("failed to encode image '{path}'")]
    ImageEncode {
        /// Path to the image.
        path: std::path::PathBuf,
        /// Underlying image error.
        #[source]
        source: image::ImageError,
    },

    /// No API key available for a live run.
    #[error("no API key configured (set OPENAI_API_KEY or pass --api-key)")]
    MissingApiKey,

    /// The inference endpoint rejected our credentials.
    #[error("authentication failed ({status}): {message}")]
    Authentication {
        /// HTTP status code returned by the endpoint.
        status: u16,
        /// Response body or transport message.
        message: String,
    },

    /// Request to the inference endpoint failed.
    #[error("model request failed: {reason}")]
    ModelRequest {
        /// Description of the failure.
        reason: String,
    },

    /// The endpoint answered with an unexpected shape.
    #[error("unexpected model response: {reason}")]
    ModelResponse {
        /// Description of the failure.
        reason: String,
    },

    /// Model response contained no JSON object.
    #[error("no structured payload found in model response")]
    NoStructuredPayload {
        /// Full response text.
        response: String,
    },

    /// Extracted JSON could not be decoded into an annotation record.
    #[error("malformed structured payload")]
    MalformedPayload {
        /// Extracted text that failed to decode.
        payload: String,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// Detection table for a month does not exist.
    #[error("detection table not found: {path}")]
    DetectionTableNotFound {
        /// Expected table path.
        path: std::path::PathBuf,
    },

    /// Failed to read a detection table.
    #[error("failed to read detection table '{path}'")]
    DetectionTableRead {
        /// Path to the table.
        path: std::path::PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// Detection table has no `file_name` column.
    #[error("detection table '{path}' has no '{column}' column")]
    DetectionColumnMissing {
        /// Path to the table.
        path: std::path::PathBuf,
        /// Missing column name.
        column: &'static str,
    },

    /// Monthly annotation file does not exist.
    #[error("annotation file not found: {path}")]
    AnnotationFileNotFound {
        /// Expected file path.
        path: std::path::PathBuf,
    },

    /// Failed to parse a monthly annotation file.
    #[error("failed to parse annotation file '{path}'")]
    AnnotationFileParse {
        /// Path to the file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to write JSON output file.
    #[error("failed to write JSON output file '{path}'")]
    JsonWrite {
        /// Path to the JSON file.
        path: std::path::PathBuf,
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to write the merged table.
    #[error("failed to write merged table '{path}'")]
    MergedWrite {
        /// Path to the CSV file.
        path: std::path::PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// Failed to write to the run ledger.
    #[error("failed to write run ledger '{path}'")]
    LedgerWrite {
        /// Path to the ledger.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create output directory.
    #[error("failed to create output directory '{path}'")]
    OutputDirCreateFailed {
        /// Path to the output directory.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Internal error (for unexpected failures).
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl Error {
    /// Whether this error means the endpoint rejected our credentials.
    pub const fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::MissingApiKey)
    }

    /// Underlying causes, outermost first, not including `self`.
    pub fn causes(&self) -> impl Iterator<Item = &(dyn std::error::Error + 'static)> {
        std::iter::successors(std::error::Error::source(self), |cause| cause.source())
    }
}
