//! CLI argument validators.

use crate::constants::detections::MONTH_FILE_PREFIX;

/// Parse a per-folder sample count (at least 1).
pub fn parse_sample_count(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid count"))?;

    if value == 0 {
        return Err("sample count must be at least 1".to_string());
    }

    Ok(value)
}

/// Parse a month key as used in file and directory names.
pub fn parse_month_key(s: &str) -> Result<String, String> {
    let key = s.trim().trim_end_matches(".json");
    if key.is_empty() || key == MONTH_FILE_PREFIX {
        return Err("month key must not be empty".to_string());
    }
    if key.contains(['/', '\\']) || key == "." || key == ".." {
        return Err(format!("'{s}' is not a valid month key"));
    }
    Ok(key.to_string())
}
