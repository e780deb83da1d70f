//! Output formatter trait for CLI results.

use anyhow::Result;
use oszx_core::BatchReport;
use oszx_core::Classification;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the per-bundle results of an extraction run
    fn format_batch_report(&self, report: &BatchReport) -> Result<()>;

    /// Format the classification of every candidate
    fn format_check_report(&self, classes: &BTreeMap<PathBuf, Classification>) -> Result<()>;

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    pub data: T,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    /// The run completed but some bundles failed.
    Partial,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn new(operation: impl Into<String>, status: Status, data: T) -> Self {
        Self {
            operation: operation.into(),
            status,
            data,
        }
    }

    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self::new(operation, Status::Success, data)
    }
}
