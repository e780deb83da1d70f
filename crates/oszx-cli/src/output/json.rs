//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use super::formatter::Status;
use anyhow::Result;
use oszx_core::BatchReport;
use oszx_core::Classification;
use oszx_core::ExtractionOutcome;
use oszx_core::JobError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::io::{self};
use std::path::Path;
use std::path::PathBuf;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct BatchData {
    total: usize,
    extracted: usize,
    skipped: usize,
    failed: usize,
    cancelled: usize,
    bytes_written: u64,
    duration_ms: u128,
    archives: Vec<ArchiveData>,
}

#[derive(Debug, Serialize)]
struct ArchiveData {
    archive: String,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    files_extracted: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes_written: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorData>,
}

#[derive(Debug, Serialize)]
struct ErrorData {
    kind: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    entries: Vec<EntryErrorData>,
}

#[derive(Debug, Serialize)]
struct EntryErrorData {
    kind: &'static str,
    message: String,
}

impl ErrorData {
    fn from_job_error(err: &JobError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            entries: err
                .entry_failures()
                .iter()
                .map(|e| EntryErrorData {
                    kind: e.kind(),
                    message: e.to_string(),
                })
                .collect(),
        }
    }
}

impl ArchiveData {
    fn new(path: &Path, outcome: &ExtractionOutcome) -> Self {
        let mut data = Self {
            archive: path.display().to_string(),
            outcome: outcome.label(),
            output_dir: None,
            layout: None,
            files_extracted: None,
            bytes_written: None,
            error: None,
        };

        match outcome {
            ExtractionOutcome::Success(report) => {
                data.output_dir = Some(report.output_dir.display().to_string());
                data.layout = Some(if report.layout.prefix().is_some() {
                    "wrapped"
                } else {
                    "flat"
                });
                data.files_extracted = Some(report.files_extracted);
                data.bytes_written = Some(report.bytes_written);
            }
            ExtractionOutcome::Failed(err) => {
                data.error = Some(ErrorData::from_job_error(err));
            }
            ExtractionOutcome::SkippedNotConforming | ExtractionOutcome::Cancelled => {}
        }

        data
    }
}

#[derive(Debug, Serialize)]
struct CheckData {
    conforming: usize,
    not_conforming: usize,
    unreadable: usize,
    archives: Vec<ClassificationData>,
}

#[derive(Debug, Serialize)]
struct ClassificationData {
    archive: String,
    classification: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn batch_data(report: &BatchReport) -> BatchData {
    BatchData {
        total: report.total(),
        extracted: report.extracted(),
        skipped: report.skipped(),
        failed: report.failed(),
        cancelled: report.cancelled(),
        bytes_written: report.bytes_written(),
        duration_ms: report.duration.as_millis(),
        archives: report
            .outcomes
            .iter()
            .map(|(path, outcome)| ArchiveData::new(path, outcome))
            .collect(),
    }
}

fn check_data(classes: &BTreeMap<PathBuf, Classification>) -> CheckData {
    let mut data = CheckData {
        conforming: 0,
        not_conforming: 0,
        unreadable: 0,
        archives: Vec::with_capacity(classes.len()),
    };

    for (path, class) in classes {
        let (classification, error) = match class {
            Classification::Conforming => {
                data.conforming += 1;
                ("conforming", None)
            }
            Classification::NotConforming => {
                data.not_conforming += 1;
                ("not_conforming", None)
            }
            Classification::Unreadable(err) => {
                data.unreadable += 1;
                ("unreadable", Some(err.to_string()))
            }
        };
        data.archives.push(ClassificationData {
            archive: path.display().to_string(),
            classification,
            error,
        });
    }

    data
}

impl OutputFormatter for JsonFormatter {
    fn format_batch_report(&self, report: &BatchReport) -> Result<()> {
        let status = if report.has_failures() {
            Status::Partial
        } else {
            Status::Success
        };
        Self::output(&JsonOutput::new("extract", status, batch_data(report)))
    }

    fn format_check_report(&self, classes: &BTreeMap<PathBuf, Classification>) -> Result<()> {
        Self::output(&JsonOutput::success("check", check_data(classes)))
    }

    fn format_warning(&self, _message: &str) {
        // stdout carries exactly one JSON document.
    }
}
