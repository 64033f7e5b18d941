//! Configuration validation.

use crate::config::Config;
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_sampling(config)?;
    validate_preprocess(config)?;
    validate_model(config)?;
    validate_detections(config)?;
    Ok(())
}

fn invalid(message: impl Into<String>) -> Error {
    Error::ConfigValidation {
        message: message.into(),
    }
}

/// Validate sampling settings.
fn validate_sampling(config: &Config) -> Result<()> {
    let sampling = &config.sampling;

    if sampling.samples_per_folder == 0 {
        return Err(invalid("samples_per_folder must be at least 1"));
    }

    if sampling.image_extensions.is_empty() {
        return Err(invalid("image_extensions must not be empty"));
    }

    Ok(())
}

/// Validate preprocessing settings.
fn validate_preprocess(config: &Config) -> Result<()> {
    let preprocess = &config.preprocess;

    if preprocess.max_height == 0 {
        return Err(invalid("max_height must be at least 1"));
    }

    if !(1..=100).contains(&preprocess.jpeg_quality) {
        return Err(invalid(format!(
            "jpeg_quality must be between 1 and 100, got {}",
            preprocess.jpeg_quality
        )));
    }

    Ok(())
}

/// Validate endpoint settings.
fn validate_model(config: &Config) -> Result<()> {
    let model = &config.model;

    if model.base_url.trim().is_empty() {
        return Err(invalid("model base_url must not be empty"));
    }

    if model.name.trim().is_empty() {
        return Err(invalid("model name must not be empty"));
    }

    if model.max_tokens == 0 {
        return Err(invalid("max_tokens must be at least 1"));
    }

    Ok(())
}

/// Validate detection layout templates.
fn validate_detections(config: &Config) -> Result<()> {
    if !config.detections.templates_have_month() {
        return Err(invalid(
            "detections table_dir and merged_file must contain '{month}'",
        ));
    }
    Ok(())
}
