//! Progress bar utilities for folder processing.

use indicatif::{ProgressBar, ProgressStyle};

/// Create a progress bar over the folders of a run.
pub fn create_folder_progress(total_folders: usize, enabled: bool) -> Option<ProgressBar> {
    if !enabled || total_folders == 0 {
        return None;
    }

    let pb = ProgressBar::new(total_folders as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} folders {msg} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░ "),
    );
    Some(pb)
}

/// Show the folder currently being processed.
pub fn set_progress_message(pb: Option<&ProgressBar>, message: &str) {
    if let Some(pb) = pb {
        pb.set_message(message.to_string());
    }
}

/// Increment a progress bar.
pub fn inc_progress(pb: Option<&ProgressBar>) {
    if let Some(pb) = pb {
        pb.inc(1);
    }
}

/// Finish a progress bar with a message.
pub fn finish_progress(pb: Option<ProgressBar>, message: &str) {
    if let Some(pb) = pb {
        pb.finish_with_message(message.to_string());
    }
}
