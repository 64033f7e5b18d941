//! Capture timestamps from embedded image metadata.

use chrono::NaiveDateTime;
use exif::{In, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

const EXIF_FORMAT: &str = "%Y:%m:%d %H:%M:%S";
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Capture time of a frame, formatted `YYYY-MM-DD HH:MM:SS`.
///
/// Prefers `DateTimeOriginal` and falls back to `DateTime`. A value that is
/// present but not in EXIF date format is returned verbatim. Unreadable
/// files and frames without metadata yield `None`.
pub fn capture_timestamp(path: &Path) -> Option<String> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(e) => {
            debug!("No EXIF data in {}: {e}", path.display());
            return None;
        }
    };

    [Tag::DateTimeOriginal, Tag::DateTime]
        .into_iter()
        .find_map(|tag| {
            let field = exif.get_field(tag, In::PRIMARY)?;
            ascii_value(&field.value)
        })
        .map(|raw| normalize_timestamp(&raw))
}

fn ascii_value(value: &Value) -> Option<String> {
    let Value::Ascii(parts) = value else {
        return None;
    };
    let first = parts.first()?;
    let text = String::from_utf8_lossy(first).trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Reformat an EXIF `YYYY:MM:DD HH:MM:SS` timestamp.
pub fn normalize_timestamp(raw: &str) -> String {
    NaiveDateTime::parse_from_str(raw.trim(), EXIF_FORMAT)
        .map_or_else(|_| raw.to_string(), |dt| dt.format(DISPLAY_FORMAT).to_string())
}
