//! Progress bar implementation for batch runs.

use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressState;
use indicatif::ProgressStyle;
use oszx_core::BatchObserver;
use oszx_core::ExtractionOutcome;
use std::fmt::Write;
use std::path::Path;

/// CLI progress bar implementing `BatchObserver`.
///
/// Counts finished bundles and shows the one most recently started. Jobs
/// report from worker threads; `ProgressBar` is internally synchronised.
/// Cleared on drop so the final report prints on a clean line.
pub struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    /// Creates a progress bar; its length is set once the batch starts.
    #[must_use]
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);

        // Template: "[████████░░░░] 42/100 bundles (12s) 123 Artist - Title.osz"
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.cyan/blue}] {pos}/{len} bundles ({eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .with_key("eta", |state: &ProgressState, w: &mut dyn Write| {
                    write!(w, "{}", humanize_duration(state.eta())).unwrap_or(());
                })
                .progress_chars("█▓░"),
        );

        Self { bar }
    }

    /// Checks if we should show progress (TTY detection).
    #[must_use]
    pub fn should_show(quiet: bool, json: bool) -> bool {
        !quiet && !json && Term::stderr().is_term()
    }
}

impl Default for CliProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

impl BatchObserver for CliProgress {
    fn on_batch_start(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn on_job_start(&self, path: &Path) {
        if let Some(name) = path.file_name() {
            self.bar.set_message(name.to_string_lossy().into_owned());
        }
    }

    fn on_job_complete(&self, _path: &Path, _outcome: &ExtractionOutcome) {
        self.bar.inc(1);
    }
}

/// Converts duration to human-readable format.
fn humanize_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h{}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m{}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}
