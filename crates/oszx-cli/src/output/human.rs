//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use crate::error::job_error_hint;
use anyhow::Result;
use console::Style;
use console::Term;
use console::style;
use oszx_core::BatchReport;
use oszx_core::Classification;
use oszx_core::ExtractionOutcome;
use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

/// Entry failures listed per bundle unless `--verbose` is given.
const MAX_ENTRY_ERRORS: usize = 3;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn file_name(path: &Path) -> String {
        path.file_name().map_or_else(
            || path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        )
    }

    /// Pads `label` before styling so columns line up with or without color.
    fn column(&self, label: &str, width: usize, color: &Style) -> String {
        let padded = format!("{label:<width$}");
        if self.use_colors {
            color.apply_to(padded).to_string()
        } else {
            padded
        }
    }

    fn label(&self, outcome: &ExtractionOutcome) -> String {
        let color = match outcome {
            ExtractionOutcome::Success(_) => Style::new().green(),
            ExtractionOutcome::SkippedNotConforming => Style::new().yellow(),
            ExtractionOutcome::Failed(_) => Style::new().red().bold(),
            ExtractionOutcome::Cancelled => Style::new().dim(),
        };
        self.column(outcome.label(), 10, &color)
    }

    fn write_outcome(&self, path: &Path, outcome: &ExtractionOutcome) {
        let name = Self::file_name(path);
        let label = self.label(outcome);

        match outcome {
            ExtractionOutcome::Success(report) => {
                let _ = self.term.write_line(&format!(
                    "{label} {name} -> {} ({} files, {})",
                    report.output_dir.display(),
                    report.files_extracted,
                    Self::format_size(report.bytes_written)
                ));
            }
            ExtractionOutcome::SkippedNotConforming => {
                let _ = self
                    .term
                    .write_line(&format!("{label} {name} (no beatmap entries)"));
            }
            ExtractionOutcome::Cancelled => {
                let _ = self.term.write_line(&format!("{label} {name}"));
            }
            ExtractionOutcome::Failed(err) => {
                let _ = self.term.write_line(&format!("{label} {name}: {err}"));

                let failures = err.entry_failures();
                let shown = if self.verbose {
                    failures.len()
                } else {
                    failures.len().min(MAX_ENTRY_ERRORS)
                };
                for failure in &failures[..shown] {
                    let _ = self.term.write_line(&format!("    - {failure}"));
                }
                if shown < failures.len() {
                    let _ = self.term.write_line(&format!(
                        "    ... and {} more (use --verbose to list all)",
                        failures.len() - shown
                    ));
                }
                if let Some(hint) = job_error_hint(err) {
                    let _ = self.term.write_line(&format!("    HINT: {hint}"));
                }
            }
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_batch_report(&self, report: &BatchReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for (path, outcome) in &report.outcomes {
            self.write_outcome(path, outcome);
        }

        let summary = format!(
            "{} extracted, {} skipped, {} failed",
            report.extracted(),
            report.skipped(),
            report.failed()
        );
        let summary = if report.cancelled() > 0 {
            format!("{summary}, {} cancelled", report.cancelled())
        } else {
            summary
        };

        let _ = self.term.write_line("");
        if self.use_colors {
            let mark = if report.has_failures() {
                style("✗").red().bold()
            } else {
                style("✓").green().bold()
            };
            let _ = self.term.write_line(&format!("{mark} {summary}"));
        } else {
            let _ = self.term.write_line(&summary);
        }

        if self.verbose {
            let _ = self.term.write_line(&format!(
                "  Total size: {}",
                Self::format_size(report.bytes_written())
            ));
            let _ = self
                .term
                .write_line(&format!("  Duration: {:?}", report.duration));
        }

        Ok(())
    }

    fn format_check_report(&self, classes: &BTreeMap<PathBuf, Classification>) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let mut conforming = 0;
        for (path, class) in classes {
            let (label, detail, color) = match class {
                Classification::Conforming => {
                    conforming += 1;
                    ("beatmap", String::new(), Style::new().green())
                }
                Classification::NotConforming => {
                    ("not-a-beatmap", String::new(), Style::new().yellow())
                }
                Classification::Unreadable(err) => {
                    ("unreadable", format!(": {err}"), Style::new().red().bold())
                }
            };
            let _ = self.term.write_line(&format!(
                "{} {}{detail}",
                self.column(label, 14, &color),
                Self::file_name(path)
            ));
        }

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&format!(
            "{conforming} of {} bundles contain beatmaps",
            classes.len()
        ));

        Ok(())
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.term.write_line(&format!("WARNING: {message}"));
        }
    }
}
