//! oszx CLI - Bulk extraction of osu! beatmap bundles.

mod cli;
mod commands;
mod error;
mod output;
mod progress;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);
    let show_progress = progress::CliProgress::should_show(cli.quiet, cli.json);

    match &cli.command {
        cli::Commands::Extract(args) => {
            commands::extract::execute(args, &*formatter, show_progress)
        }
        cli::Commands::Check(args) => commands::check::execute(args, &*formatter),
        cli::Commands::Completion { shell } => {
            commands::completion::execute(*shell);
            Ok(())
        }
    }
}

/// Logs go to stderr so stdout stays clean for reports and JSON.
/// `RUST_LOG` takes precedence over the verbosity flags.
fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();
}
