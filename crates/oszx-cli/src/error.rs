//! Error conversion utilities for CLI.
//!
//! Converts oszx-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use oszx_core::BatchError;
use oszx_core::JobError;

/// Converts a fatal `BatchError` into an anyhow error with a hint.
pub fn convert_batch_error(err: BatchError) -> anyhow::Error {
    match err {
        BatchError::SourceDirMissing { path } => {
            anyhow!(
                "Source directory not found: {}\n\
                 HINT: Pass the folder holding your .osz files, e.g. `oszx extract ~/Downloads`.",
                path.display()
            )
        }
        BatchError::NotADirectory { path } => {
            anyhow!(
                "Source path is not a directory: {}\n\
                 HINT: Pass the folder containing the bundles, not a single bundle.",
                path.display()
            )
        }
        BatchError::ListSource { path, source } => {
            anyhow!(
                "Cannot list source directory '{}': {}\n\
                 HINT: Check that you have read permission on the folder.",
                path.display(),
                source
            )
        }
        BatchError::ThreadPool(source) => {
            anyhow!(
                "Failed to start worker threads: {source}\n\
                 HINT: Try a smaller --threads value."
            )
        }
    }
}

/// Returns a hint for a per-bundle failure, if one applies.
pub fn job_error_hint(err: &JobError) -> Option<&'static str> {
    match err {
        JobError::Open { .. } => {
            Some("The bundle may be corrupted or incomplete. Try downloading it again.")
        }
        JobError::Extraction { failures, .. } if failures.iter().any(|e| e.is_path_too_long()) => {
            Some("Some paths exceed the platform limit. Use --output with a shorter directory.")
        }
        JobError::Extraction { .. } => None,
        JobError::Unexpected { .. } => {
            Some("This is a bug in oszx. Please report it with the bundle name.")
        }
    }
}
