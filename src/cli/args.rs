//! CLI argument definitions.

use crate::cli::validators::{parse_month_key, parse_sample_count};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Camera-trap scene annotation with a vision-language model.
#[derive(Debug, Parser)]
#[command(name = "wildscene")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run. Without one, frame folders are annotated.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Options for annotation runs.
    #[command(flatten)]
    pub annotate: AnnotateArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Join monthly annotation files with the detector's tables.
    Merge {
        /// Merge only this month (e.g. 202506). Default: every month.
        #[arg(long, value_parser = parse_month_key)]
        month: Option<String>,
    },
    /// List frame folders that no detection table references.
    Coverage,
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Arguments for annotation runs, shared with subcommands where relevant.
#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct AnnotateArgs {
    /// Root directory containing frame folders.
    #[arg(short, long, global = true, env = "WILDSCENE_ROOT")]
    pub root: Option<PathBuf>,

    /// Directory for monthly JSON files and the run ledger.
    #[arg(short, long, global = true, env = "WILDSCENE_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Directory holding the detector's per-month tables.
    #[arg(short, long, global = true, env = "WILDSCENE_DETECTIONS_DIR")]
    pub detections_dir: Option<PathBuf>,

    /// Frames sampled per folder.
    #[arg(short = 'n', long, value_parser = parse_sample_count)]
    pub samples: Option<usize>,

    /// Model identifier sent to the endpoint.
    #[arg(short, long, env = "WILDSCENE_MODEL")]
    pub model: Option<String>,

    /// API key for the inference endpoint.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Sample folders and write placeholder records without calling the model.
    #[arg(long)]
    pub dry_run: bool,

    /// Disable the progress bar.
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Only print warnings and errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase verbosity (-v: debug, -vv: trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file (default: platform config directory).
    #[arg(long, global = true, env = "WILDSCENE_CONFIG")]
    pub config: Option<PathBuf>,
}
