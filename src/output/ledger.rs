//! Token accounting ledger.
//!
//! A tab-separated file recreated on every run: a header, one line per
//! annotated folder in processing order, then a `TOTAL` line. Every line is
//! flushed as soon as it is written so an aborted run leaves a usable record.

use crate::constants::ledger::{HEADER, TOTAL_KEY};
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Token usage for one folder. `None` means no call was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Folder path as processed.
    pub folder: String,
    /// Prompt tokens.
    pub input_tokens: Option<u64>,
    /// Completion tokens.
    pub output_tokens: Option<u64>,
}

/// Summed token usage, nulls counted as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerTotals {
    /// Per-folder lines written.
    pub entries: usize,
    /// Sum of prompt tokens.
    pub input_tokens: u64,
    /// Sum of completion tokens.
    pub output_tokens: u64,
}

/// Append-only run ledger handle.
pub struct RunLedger {
    writer: BufWriter<File>,
    path: PathBuf,
    totals: LedgerTotals,
}

impl RunLedger {
    /// Truncate or create the ledger at `path` and write the header.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::OutputDirCreateFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let file = File::create(path).map_err(|e| Error::LedgerWrite {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut ledger = Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
            totals: LedgerTotals::default(),
        };
        ledger.write_line(HEADER)?;
        Ok(ledger)
    }

    /// Ledger location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Running totals so far.
    pub const fn totals(&self) -> LedgerTotals {
        self.totals
    }

    /// Append one folder line.
    pub fn record(&mut self, entry: &LedgerEntry) -> Result<()> {
        let line = format!(
            "{}\t{}\t{}",
            entry.folder,
            format_tokens(entry.input_tokens),
            format_tokens(entry.output_tokens)
        );
        self.write_line(&line)?;

        self.totals.entries += 1;
        self.totals.input_tokens += entry.input_tokens.unwrap_or(0);
        self.totals.output_tokens += entry.output_tokens.unwrap_or(0);
        Ok(())
    }

    /// Append the `TOTAL` line and close the ledger.
    pub fn finish(mut self) -> Result<LedgerTotals> {
        let totals = self.totals;
        let line = format!(
            "{TOTAL_KEY}\t{}\t{}",
            totals.input_tokens, totals.output_tokens
        );
        self.write_line(&line)?;
        Ok(totals)
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{line}")
            .and_then(|()| self.writer.flush())
            .map_err(|e| Error::LedgerWrite {
                path: self.path.clone(),
                source: e,
            })
    }
}

/// Null token counts are left empty.
fn format_tokens(tokens: Option<u64>) -> String {
    tokens.map(|t| t.to_string()).unwrap_or_default()
}
