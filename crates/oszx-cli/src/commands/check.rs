//! Check command implementation.

use crate::cli::ScanArgs;
use crate::error::convert_batch_error;
use crate::output::OutputFormatter;
use anyhow::Result;
use oszx_core::check_directory;

pub fn execute(args: &ScanArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let config = args.config();
    let classes = check_directory(&args.source_dir, &config).map_err(convert_batch_error)?;

    if classes.is_empty() {
        formatter.format_warning(&format!(
            "no .{} files found in {}",
            config.extension,
            args.source_dir.display()
        ));
    }

    formatter.format_check_report(&classes)
}
