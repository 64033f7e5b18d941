//! Wildscene - camera-trap scene annotation with a vision-language model.
//!
//! Frame folders are sampled, annotated once per folder by a multimodal
//! model, written out as monthly JSON files, and joined with the species
//! detector's per-month tables.

#![warn(missing_docs)]

pub mod annotate;
pub mod cli;
pub mod config;
pub mod constants;
pub mod detections;
pub mod error;
pub mod frames;
pub mod output;
pub mod pipeline;
pub mod preprocess;

use annotate::{OpenAiClient, SceneAnnotator};
use clap::Parser;
use cli::{AnnotateArgs, Cli, Command, ConfigAction};
use config::{
    Config, apply_cli_overrides, config_file_path, load_default_config, save_config,
    save_default_config,
};
use detections::{DetectionLayout, PrimaryFrameResolver};
use frames::{FrameSampler, SegmentUnderRoot, index_folders};
use output::RunLedger;
use pipeline::{MonthlyAggregator, merge_all, merge_month, month_from_file, uncovered_folders};
use preprocess::ImagePreprocessor;
use std::path::Path;
use tracing::{error, info, warn};

pub use error::{Error, Result};

/// Main entry point for the wildscene CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.annotate.verbose, cli.annotate.quiet);

    let result = dispatch(cli);
    if let Err(e) = &result
        && e.is_authentication()
    {
        error!("Authentication error: please check your API key and try again");
    }
    result
}

fn dispatch(cli: Cli) -> Result<()> {
    let args = cli.annotate;

    if let Some(Command::Config { action }) = cli.command {
        return handle_config_command(action, args.config.as_deref());
    }

    let config = apply_cli_overrides(load_default_config(args.config.as_deref())?, &args)?;

    match cli.command {
        Some(Command::Merge { month }) => handle_merge_command(month.as_deref(), &config),
        Some(Command::Coverage) => handle_coverage_command(&config),
        Some(Command::Config { .. }) | None => annotate_folders(&args, &config),
    }
}

/// Sample, annotate and write monthly files for every frame folder.
fn annotate_folders(args: &AnnotateArgs, config: &Config) -> Result<()> {
    let root = &config.paths.frames_root;
    info!("Scanning {} for frame folders", root.display());

    let month_key = SegmentUnderRoot::new(config.sampling.month_segment);
    let folders = index_folders(root, &config.sampling.image_extensions, &month_key)?;
    info!("Found {} folder(s) with images", folders.len());

    let resolver = PrimaryFrameResolver::new(DetectionLayout::from_config(&config.detections));
    let sampler = FrameSampler::new(config.sampling.samples_per_folder, Some(&resolver));

    let client = if args.dry_run {
        info!("[DRY RUN] Frames will be sampled but not sent to the model");
        None
    } else {
        let api_key = args
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(Error::MissingApiKey)?;
        info!("Using model {} at {}", config.model.name, config.model.base_url);
        Some(OpenAiClient::new(&config.model, api_key)?)
    };
    let annotator = client.as_ref().map_or_else(SceneAnnotator::dry_run, |client| {
        SceneAnnotator::live(client, ImagePreprocessor::new(config.preprocess))
    });

    let mut ledger = RunLedger::create(&config.paths.ledger_path())?;
    let progress_enabled = !args.quiet && !args.no_progress;

    let summary = MonthlyAggregator::new(&sampler, &annotator, &config.paths.output_dir)
        .with_progress(progress_enabled)
        .run(&folders, &mut ledger)?;
    let ledger_path = ledger.path().to_path_buf();
    let totals = ledger.finish()?;

    info!(
        "Complete: {} folder(s) annotated, {} skipped, {} month file(s) written in {:.2}s",
        summary.folders_annotated,
        summary.folders_skipped,
        summary.months_written.len(),
        summary.elapsed_secs
    );
    info!("Total input tokens: {}", totals.input_tokens);
    info!("Total output tokens: {}", totals.output_tokens);
    info!("Log saved to: {}", ledger_path.display());

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    // HTTP internals stay at warn unless asked for with -vv.
    let filter_str = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info,hyper=warn,reqwest=warn",
            1 => "debug,hyper=warn,reqwest=warn,rustls=warn",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn handle_merge_command(month: Option<&str>, config: &Config) -> Result<()> {
    let layout = DetectionLayout::from_config(&config.detections);
    let output_dir = &config.paths.output_dir;

    if let Some(month) = month {
        let annotations = output_dir.join(format!("{month}.json"));
        let key = month_from_file(&annotations).unwrap_or_else(|| month.to_string());
        let path = merge_month(&key, &annotations, &layout)?;
        println!("Merged data written to {}", path.display());
        return Ok(());
    }

    let summary = merge_all(output_dir, &layout)?;
    for path in &summary.merged {
        println!("Merged data written to {}", path.display());
    }
    for (month, reason) in &summary.skipped {
        println!("Skipped {month}: {reason}");
    }
    if !summary.skipped.is_empty() {
        warn!("{} month(s) were not merged", summary.skipped.len());
    }
    Ok(())
}

fn handle_coverage_command(config: &Config) -> Result<()> {
    let missing = uncovered_folders(
        &config.paths.frames_root,
        &config.sampling.image_extensions,
        &config.detections.dir,
    )?;

    if missing.is_empty() {
        println!("All frame folders are referenced in the detection tables.");
    } else {
        println!("Frame folders missing from every detection table:");
        for folder in &missing {
            println!("  {folder}");
        }
    }
    Ok(())
}

fn handle_config_command(action: ConfigAction, explicit: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = match explicit {
                Some(path) => path.to_path_buf(),
                None => config_file_path()?,
            };
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                let config = Config::default();
                if explicit.is_some() {
                    save_config(&config, &path)?;
                } else {
                    save_default_config(&config)?;
                }
                println!("Created configuration file: {}", path.display());
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_default_config(explicit)?;
            println!("{config:#?}");
            Ok(())
        }
        ConfigAction::Path => {
            let path = match explicit {
                Some(path) => path.to_path_buf(),
                None => config_file_path()?,
            };
            println!("{}", path.display());
            Ok(())
        }
    }
}
