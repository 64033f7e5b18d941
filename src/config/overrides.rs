//! Command-line overrides of file configuration.

use crate::cli::AnnotateArgs;
use crate::config::types::Config;
use crate::config::validate_config;
use crate::error::Result;

/// Apply command-line options on top of `config` and re-validate.
///
/// Only options that were given replace configured values.
pub fn apply_cli_overrides(mut config: Config, args: &AnnotateArgs) -> Result<Config> {
    if let Some(root) = &args.root {
        config.paths.frames_root.clone_from(root);
    }
    if let Some(output_dir) = &args.output_dir {
        config.paths.output_dir.clone_from(output_dir);
    }
    if let Some(dir) = &args.detections_dir {
        config.detections.dir.clone_from(dir);
    }
    if let Some(samples) = args.samples {
        config.sampling.samples_per_folder = samples;
    }
    if let Some(model) = &args.model {
        config.model.name.clone_from(model);
    }

    validate_config(&config)?;
    Ok(config)
}
