//! Month-by-month annotation run.

use crate::annotate::SceneAnnotator;
use crate::error::Result;
use crate::frames::{Folder, FrameSampler};
use crate::output::{
    FolderMetadata, LedgerEntry, LedgerTotals, MonthlyEntry, RunLedger, progress, write_monthly,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info};

/// Outcome of a completed run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Folders sent for annotation.
    pub folders_annotated: usize,
    /// Folders with nothing to sample.
    pub folders_skipped: usize,
    /// Monthly files written, in month order.
    pub months_written: Vec<PathBuf>,
    /// Token totals from the ledger.
    pub totals: LedgerTotals,
    /// Wall-clock duration in seconds.
    pub elapsed_secs: f64,
}

/// Partition folders by month key, each month's folders sorted by folder key.
pub fn partition_by_month(folders: &[Folder]) -> BTreeMap<&str, Vec<&Folder>> {
    let mut months: BTreeMap<&str, Vec<&Folder>> = BTreeMap::new();
    for folder in folders {
        months.entry(folder.month.as_str()).or_default().push(folder);
    }
    for month_folders in months.values_mut() {
        month_folders.sort_by_cached_key(|folder| folder.key());
    }
    months
}

/// Drives sampling and annotation over every folder, one month at a time.
///
/// The first annotation error aborts the run. Ledger lines already written
/// and monthly files of completed months are left in place.
pub struct MonthlyAggregator<'a> {
    sampler: &'a FrameSampler<'a>,
    annotator: &'a SceneAnnotator<'a>,
    output_dir: PathBuf,
    show_progress: bool,
}

impl<'a> MonthlyAggregator<'a> {
    /// Create an aggregator writing monthly files into `output_dir`.
    pub fn new(
        sampler: &'a FrameSampler<'a>,
        annotator: &'a SceneAnnotator<'a>,
        output_dir: &Path,
    ) -> Self {
        Self {
            sampler,
            annotator,
            output_dir: output_dir.to_path_buf(),
            show_progress: false,
        }
    }

    /// Show a progress bar over folders.
    #[must_use]
    pub const fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    /// Path of the monthly file for `month`.
    pub fn monthly_path(&self, month: &str) -> PathBuf {
        self.output_dir.join(format!("{month}.json"))
    }

    /// Annotate all folders and write one JSON file per month.
    ///
    /// Each folder's ledger line is written as soon as it is annotated. The
    /// ledger is left open; the caller writes the totals.
    pub fn run(&self, folders: &[Folder], ledger: &mut RunLedger) -> Result<RunSummary> {
        let start = Instant::now();
        let months = partition_by_month(folders);
        let pb = progress::create_folder_progress(folders.len(), self.show_progress);

        let mut summary = RunSummary::default();

        for (month, month_folders) in months {
            info!("Processing month {month} ({} folder(s))", month_folders.len());
            let mut entries = Vec::with_capacity(month_folders.len());

            for folder in month_folders {
                let key = folder.key();
                progress::set_progress_message(pb.as_ref(), &key);

                match self.annotate_folder(folder, ledger) {
                    Ok(Some(entry)) => {
                        summary.folders_annotated += 1;
                        entries.push(entry);
                    }
                    Ok(None) => summary.folders_skipped += 1,
                    Err(e) => {
                        error!("Error processing folder {key}: {e}");
                        for cause in e.causes() {
                            error!("  caused by: {cause}");
                        }
                        progress::finish_progress(pb, "Failed");
                        return Err(e);
                    }
                }
                progress::inc_progress(pb.as_ref());
            }

            let path = self.monthly_path(month);
            write_monthly(&path, &entries)?;
            info!("Metadata for {month} saved to: {}", path.display());
            summary.months_written.push(path);
        }

        progress::finish_progress(pb, "Complete");

        summary.totals = ledger.totals();
        summary.elapsed_secs = start.elapsed().as_secs_f64();
        Ok(summary)
    }

    fn annotate_folder(
        &self,
        folder: &Folder,
        ledger: &mut RunLedger,
    ) -> Result<Option<MonthlyEntry>> {
        let key = folder.key();
        let frames = self.sampler.sample(folder);
        if frames.is_empty() {
            info!("No images sampled for {key}, skipping output");
            return Ok(None);
        }
        info!("Sampled {} image(s) from {key}", frames.len());

        let annotation = self.annotator.annotate(&frames)?;

        ledger.record(&LedgerEntry {
            folder: key.clone(),
            input_tokens: annotation.usage.map(|u| u.input_tokens),
            output_tokens: annotation.usage.map(|u| u.output_tokens),
        })?;

        Ok(Some(MonthlyEntry {
            folder: key,
            image_frames: frames.names().to_vec(),
            analysis: annotation.record,
            metadata: FolderMetadata {
                total_images_in_folder: folder.images.len(),
                sampled_images: frames.len(),
            },
        }))
    }
}
