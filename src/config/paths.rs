//! Platform-specific configuration paths.

use crate::constants::APP_NAME;
use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Config file name inside the configuration directory.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Get the configuration directory for the current platform.
///
/// - Linux: `~/.config/wildscene/`
/// - macOS: `~/Library/Application Support/wildscene/`
/// - Windows: `%APPDATA%\wildscene\`
pub fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(Error::ConfigDirNotFound)
}

/// Get the full path to the config file.
pub fn config_file_path() -> Result<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}
