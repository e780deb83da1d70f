//! Batch driver: discovery, per-archive jobs and outcome fan-in.
//!
//! Every candidate archive becomes one job on a bounded rayon pool. A job
//! opens its archive, classifies it, resolves the layout and extracts the
//! entries (again in parallel, on the same pool). Whatever happens inside a
//! job, including a panic, ends up as that job's [`ExtractionOutcome`]. Jobs
//! return their outcome to the coordinating thread, which merges them into
//! the report, so no shared map is ever written concurrently.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::panic::catch_unwind;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::ArchiveHandle;
use crate::ArchiveReport;
use crate::BatchConfig;
use crate::BatchError;
use crate::BatchObserver;
use crate::BatchReport;
use crate::Classification;
use crate::EntryError;
use crate::ExtractionOutcome;
use crate::JobError;
use crate::Layout;
use crate::NoopObserver;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::extraction::LongPathPolicy;
use crate::extraction::MemberKind;
use crate::extraction::member::extract_planned;
use crate::layout::plan_entries;
use crate::resolve_layout;

/// One unit of work: a candidate archive and where it extracts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionJob {
    /// Path of the candidate archive.
    pub archive: PathBuf,
    /// File name without the bundle extension.
    pub base_name: String,
    /// `<output root>/<base name>`.
    pub destination: PathBuf,
}

impl ExtractionJob {
    /// Derives the job for `archive` under `output_root`.
    #[must_use]
    pub fn new(archive: PathBuf, output_root: &Path) -> Self {
        let stem = archive.file_stem().unwrap_or(archive.as_os_str());
        let base_name = stem.to_string_lossy().into_owned();
        let destination = output_root.join(stem);
        Self {
            archive,
            base_name,
            destination,
        }
    }
}

/// Lists candidate archives directly inside `source_dir`.
///
/// Only regular files whose extension matches the configured one are
/// returned, sorted by path. Subdirectories are not descended into.
///
/// # Errors
///
/// Returns [`BatchError::SourceDirMissing`], [`BatchError::NotADirectory`]
/// or [`BatchError::ListSource`]; all are fatal preconditions.
pub fn discover_candidates(source_dir: &Path, config: &BatchConfig) -> Result<Vec<PathBuf>> {
    if !source_dir.exists() {
        return Err(BatchError::SourceDirMissing {
            path: source_dir.to_path_buf(),
        });
    }
    if !source_dir.is_dir() {
        return Err(BatchError::NotADirectory {
            path: source_dir.to_path_buf(),
        });
    }

    let list_error = |source| BatchError::ListSource {
        path: source_dir.to_path_buf(),
        source,
    };

    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(source_dir).map_err(list_error)? {
        let path = entry.map_err(list_error)?.path();
        if path.is_file() && config.is_candidate(&path) {
            candidates.push(path);
        }
    }
    candidates.sort();
    Ok(candidates)
}

/// Extracts every conforming bundle in `source_dir`.
///
/// # Errors
///
/// Only precondition failures are returned as errors. Per-archive failures
/// are recorded in the report.
pub fn run_batch(source_dir: impl AsRef<Path>, config: &BatchConfig) -> Result<BatchReport> {
    run_batch_with_observer(source_dir, config, &NoopObserver)
}

/// Extracts every conforming bundle in `source_dir`, reporting progress to
/// `observer`.
///
/// # Errors
///
/// See [`run_batch`].
pub fn run_batch_with_observer(
    source_dir: impl AsRef<Path>,
    config: &BatchConfig,
    observer: &dyn BatchObserver,
) -> Result<BatchReport> {
    let started = Instant::now();
    let source_dir = source_dir.as_ref();
    let candidates = discover_candidates(source_dir, config)?;
    let output_root = config.output_root_for(source_dir);
    let pool = build_pool(config)?;

    info!(
        source = %source_dir.display(),
        candidates = candidates.len(),
        workers = pool.current_num_threads(),
        "starting batch"
    );
    observer.on_batch_start(candidates.len());

    let results: Vec<(PathBuf, ExtractionOutcome)> = pool.install(|| {
        candidates
            .into_par_iter()
            .map(|archive| {
                let outcome = if config.cancel.is_cancelled() {
                    ExtractionOutcome::Cancelled
                } else {
                    observer.on_job_start(&archive);
                    let job = ExtractionJob::new(archive.clone(), output_root);
                    guard_job(&archive, || run_job(&job, config))
                };
                observer.on_job_complete(&archive, &outcome);
                (archive, outcome)
            })
            .collect()
    });

    let report = BatchReport {
        outcomes: results.into_iter().collect(),
        duration: started.elapsed(),
    };

    info!(
        extracted = report.extracted(),
        skipped = report.skipped(),
        failed = report.failed(),
        cancelled = report.cancelled(),
        elapsed_ms = report.duration.as_millis(),
        "batch complete"
    );
    Ok(report)
}

/// Classifies every candidate in `source_dir` without extracting anything.
///
/// # Errors
///
/// Only precondition failures are returned as errors.
pub fn check_directory(
    source_dir: impl AsRef<Path>,
    config: &BatchConfig,
) -> Result<BTreeMap<PathBuf, Classification>> {
    let source_dir = source_dir.as_ref();
    let candidates = discover_candidates(source_dir, config)?;
    let pool = build_pool(config)?;

    Ok(pool.install(|| {
        candidates
            .into_par_iter()
            .map(|archive| {
                let class = match crate::is_conforming(&archive, &config.marker_suffix) {
                    Ok(true) => Classification::Conforming,
                    Ok(false) => Classification::NotConforming,
                    Err(err) => Classification::Unreadable(err),
                };
                (archive, class)
            })
            .collect()
    }))
}

fn build_pool(config: &BatchConfig) -> Result<ThreadPool> {
    Ok(ThreadPoolBuilder::new()
        .num_threads(config.worker_count())
        .thread_name(|i| format!("oszx-worker-{i}"))
        .build()?)
}

/// Runs `job`, turning a panic into [`JobError::Unexpected`].
fn guard_job(archive: &Path, job: impl FnOnce() -> ExtractionOutcome) -> ExtractionOutcome {
    catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|payload| {
        let reason = panic_message(payload.as_ref());
        warn!(archive = %archive.display(), %reason, "job panicked");
        ExtractionOutcome::Failed(JobError::Unexpected {
            path: archive.to_path_buf(),
            reason,
        })
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

fn run_job(job: &ExtractionJob, config: &BatchConfig) -> ExtractionOutcome {
    let handle = match ArchiveHandle::open(&job.archive) {
        Ok(handle) => handle,
        Err(err) => {
            warn!(archive = %job.archive.display(), error = %err, "cannot open archive");
            return ExtractionOutcome::Failed(err);
        }
    };
    process_archive(handle, job, config)
}

/// Classifies and extracts an opened archive. The handle is closed on every
/// path before the outcome is returned.
fn process_archive(
    handle: ArchiveHandle,
    job: &ExtractionJob,
    config: &BatchConfig,
) -> ExtractionOutcome {
    if !handle.is_conforming(&config.marker_suffix) {
        debug!(
            archive = %job.archive.display(),
            marker = %config.marker_suffix,
            "no marker entry, skipping"
        );
        handle.close();
        return ExtractionOutcome::SkippedNotConforming;
    }

    let layout = resolve_layout(handle.entries(), &job.base_name);
    debug!(
        archive = %job.archive.display(),
        destination = %job.destination.display(),
        ?layout,
        entries = handle.entries().len(),
        "extracting"
    );

    let result = extract_all(&handle, job, layout, config.long_paths);
    handle.close();

    match result {
        Ok(report) => ExtractionOutcome::Success(report),
        Err(failures) => ExtractionOutcome::Failed(JobError::Extraction {
            path: job.archive.clone(),
            failures,
        }),
    }
}

fn extract_all(
    handle: &ArchiveHandle,
    job: &ExtractionJob,
    layout: Layout,
    policy: LongPathPolicy,
) -> std::result::Result<ArchiveReport, Vec<EntryError>> {
    let (planned, mut failures) = plan_entries(handle.entries(), &layout);

    let results: Vec<_> = planned
        .par_iter()
        .map_init(
            || (handle.reader(), CopyBuffer::new()),
            |(zip, buffer), entry| extract_planned(zip, entry, &job.destination, policy, buffer),
        )
        .collect();

    let mut report = ArchiveReport::new(job.destination.clone(), layout);
    for result in results {
        match result {
            Ok(stats) => match stats.kind {
                MemberKind::File => {
                    report.files_extracted += 1;
                    report.bytes_written += stats.bytes;
                }
                MemberKind::Directory => report.directories_created += 1,
            },
            Err(err) => failures.push(err),
        }
    }

    if failures.is_empty() {
        Ok(report)
    } else {
        for err in &failures {
            warn!(archive = %job.archive.display(), error = %err, "entry failed");
        }
        Err(failures)
    }
}
