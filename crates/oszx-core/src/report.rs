//! Per-archive outcomes and batch reporting.

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use crate::JobError;
use crate::Layout;

/// Statistics for one successfully extracted archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Folder the archive was extracted into.
    pub output_dir: PathBuf,

    /// Layout that was applied.
    pub layout: Layout,

    /// Number of regular files written.
    pub files_extracted: usize,

    /// Number of directory entries materialised.
    pub directories_created: usize,

    /// Total bytes written to disk.
    pub bytes_written: u64,
}

impl ArchiveReport {
    /// Creates an empty report for `output_dir`.
    #[must_use]
    pub fn new(output_dir: PathBuf, layout: Layout) -> Self {
        Self {
            output_dir,
            layout,
            files_extracted: 0,
            directories_created: 0,
            bytes_written: 0,
        }
    }
}

/// Terminal outcome of one job.
#[derive(Debug)]
pub enum ExtractionOutcome {
    /// Every entry was extracted.
    Success(ArchiveReport),
    /// The archive carries no marker entry and was left untouched.
    SkippedNotConforming,
    /// The archive could not be opened, or some entries failed.
    Failed(JobError),
    /// The batch was cancelled before this job started.
    Cancelled,
}

impl ExtractionOutcome {
    /// Returns `true` for [`ExtractionOutcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns `true` for [`ExtractionOutcome::Failed`].
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns the error for a failed job.
    #[must_use]
    pub const fn error(&self) -> Option<&JobError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Short lowercase label used in reports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "extracted",
            Self::SkippedNotConforming => "skipped",
            Self::Failed(_) => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Outcome of every candidate in a batch, keyed by archive path.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One outcome per discovered candidate.
    pub outcomes: BTreeMap<PathBuf, ExtractionOutcome>,

    /// Wall-clock duration of the run.
    pub duration: Duration,
}

impl BatchReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the outcome recorded for `path`.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&ExtractionOutcome> {
        self.outcomes.get(path)
    }

    /// Number of candidates processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of archives extracted.
    #[must_use]
    pub fn extracted(&self) -> usize {
        self.count(ExtractionOutcome::is_success)
    }

    /// Number of archives skipped as not conforming.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ExtractionOutcome::SkippedNotConforming))
    }

    /// Number of archives that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(ExtractionOutcome::is_failure)
    }

    /// Number of archives not started due to cancellation.
    #[must_use]
    pub fn cancelled(&self) -> usize {
        self.count(|o| matches!(o, ExtractionOutcome::Cancelled))
    }

    /// Returns whether any archive failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.outcomes.values().any(ExtractionOutcome::is_failure)
    }

    /// Total bytes written across all extracted archives.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.outcomes
            .values()
            .filter_map(|o| match o {
                ExtractionOutcome::Success(report) => Some(report.bytes_written),
                _ => None,
            })
            .sum()
    }

    fn count(&self, predicate: impl Fn(&ExtractionOutcome) -> bool) -> usize {
        self.outcomes.values().filter(|o| predicate(*o)).count()
    }
}

/// Result of classifying a candidate without extracting it.
#[derive(Debug)]
pub enum Classification {
    /// Contains at least one marker entry.
    Conforming,
    /// Opened fine but has no marker entry.
    NotConforming,
    /// Could not be opened as a zip container.
    Unreadable(JobError),
}

/// Callback trait for observing a batch while it runs.
///
/// Methods are called from worker threads, possibly concurrently, hence the
/// `Sync` bound and `&self` receivers.
///
/// # Examples
///
/// ```
/// use oszx_core::BatchObserver;
/// use oszx_core::ExtractionOutcome;
/// use std::path::Path;
/// use std::sync::atomic::AtomicUsize;
/// use std::sync::atomic::Ordering;
///
/// #[derive(Default)]
/// struct Counter(AtomicUsize);
///
/// impl BatchObserver for Counter {
///     fn on_batch_start(&self, _total: usize) {}
///
///     fn on_job_start(&self, _path: &Path) {}
///
///     fn on_job_complete(&self, _path: &Path, _outcome: &ExtractionOutcome) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
/// ```
pub trait BatchObserver: Sync {
    /// Called once with the number of discovered candidates.
    fn on_batch_start(&self, total: usize);

    /// Called when a job starts processing `path`.
    fn on_job_start(&self, path: &Path);

    /// Called when a job reaches its terminal outcome.
    fn on_job_complete(&self, path: &Path, outcome: &ExtractionOutcome);
}

/// Observer that does nothing.
#[derive(Debug, Default)]
pub struct NoopObserver;

impl BatchObserver for NoopObserver {
    fn on_batch_start(&self, _total: usize) {}

    fn on_job_start(&self, _path: &Path) {}

    fn on_job_complete(&self, _path: &Path, _outcome: &ExtractionOutcome) {}
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn success(bytes: u64) -> ExtractionOutcome {
        let mut report = ArchiveReport::new(PathBuf::from("out"), Layout::Flat);
        report.files_extracted = 1;
        report.bytes_written = bytes;
        ExtractionOutcome::Success(report)
    }

    #[test]
    fn test_new_report() {
        let report = BatchReport::new();
        assert_eq!(report.total(), 0);
        assert!(!report.has_failures());
    }

    #[test]
    fn test_counters() {
        let mut report = BatchReport::new();
        report.outcomes.insert("a.osz".into(), success(10));
        report.outcomes.insert("b.osz".into(), success(5));
        report
            .outcomes
            .insert("c.osz".into(), ExtractionOutcome::SkippedNotConforming);
        report.outcomes.insert(
            "d.osz".into(),
            ExtractionOutcome::Failed(JobError::Unexpected {
                path: "d.osz".into(),
                reason: "boom".into(),
            }),
        );
        report
            .outcomes
            .insert("e.osz".into(), ExtractionOutcome::Cancelled);

        assert_eq!(report.total(), 5);
        assert_eq!(report.extracted(), 2);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.cancelled(), 1);
        assert_eq!(report.bytes_written(), 15);
        assert!(report.has_failures());
        assert!(report.get(Path::new("d.osz")).unwrap().error().is_some());
    }

    #[test]
    fn test_labels() {
        assert_eq!(success(0).label(), "extracted");
        assert_eq!(ExtractionOutcome::SkippedNotConforming.label(), "skipped");
        assert_eq!(ExtractionOutcome::Cancelled.label(), "cancelled");
    }
}
