//! Frame preparation: color normalization, downscaling and metadata.

mod frame;
mod metadata;

pub use frame::{ImagePreprocessor, PreparedImage, scaled_dimensions};
pub use metadata::{capture_timestamp, normalize_timestamp};
