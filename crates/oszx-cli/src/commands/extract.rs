//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::error::convert_batch_error;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Result;
use anyhow::bail;
use oszx_core::run_batch;
use oszx_core::run_batch_with_observer;
use tracing::debug;

pub fn execute(
    args: &ExtractArgs,
    formatter: &dyn OutputFormatter,
    show_progress: bool,
) -> Result<()> {
    let config = args.config();
    let source_dir = &args.scan.source_dir;
    debug!(
        source = %source_dir.display(),
        output = %config.output_root_for(source_dir).display(),
        workers = config.worker_count(),
        "extract"
    );

    // The progress bar is cleared when it drops, before the report prints.
    let result = if show_progress {
        let progress = CliProgress::new();
        run_batch_with_observer(source_dir, &config, &progress)
    } else {
        run_batch(source_dir, &config)
    };
    let report = result.map_err(convert_batch_error)?;

    if report.total() == 0 {
        formatter.format_warning(&format!(
            "no .{} files found in {}",
            config.extension,
            source_dir.display()
        ));
    }

    formatter.format_batch_report(&report)?;

    if args.strict && report.has_failures() {
        bail!(
            "{} of {} bundles failed to extract\n\
             HINT: Rerun with --verbose to list every entry error.",
            report.failed(),
            report.total()
        );
    }

    Ok(())
}
