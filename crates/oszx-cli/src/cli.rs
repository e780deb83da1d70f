//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use oszx_core::BatchConfig;
use oszx_core::config::DEFAULT_EXTENSION;
use oszx_core::config::DEFAULT_MARKER_SUFFIX;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "oszx")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract every beatmap bundle in a directory
    Extract(ExtractArgs),
    /// Classify bundles without extracting them
    Check(ScanArgs),
    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

// Options shared by every command that scans a directory.
#[derive(clap::Args)]
pub struct ScanArgs {
    /// Directory holding the bundles
    #[arg(value_name = "SOURCE_DIR", default_value = "songs")]
    pub source_dir: PathBuf,

    /// Extension of candidate bundles
    #[arg(long, value_name = "EXT", default_value = DEFAULT_EXTENSION)]
    pub extension: String,

    /// Entry-name suffix that marks a bundle as a beatmap
    #[arg(long, value_name = "SUFFIX", default_value = DEFAULT_MARKER_SUFFIX)]
    pub marker: String,

    /// Number of worker threads (default: available parallelism)
    #[arg(short, long, value_name = "N")]
    pub threads: Option<usize>,
}

impl ScanArgs {
    /// Builds the batch configuration for these options.
    pub fn config(&self) -> BatchConfig {
        BatchConfig::default()
            .with_extension(self.extension.as_str())
            .with_marker_suffix(self.marker.as_str())
            .with_threads(self.threads.unwrap_or(0))
    }
}

#[derive(clap::Args)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Output root (default: the source directory)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Exit with an error if any bundle failed
    #[arg(long)]
    pub strict: bool,
}

impl ExtractArgs {
    /// Builds the batch configuration, including the output root.
    pub fn config(&self) -> BatchConfig {
        let config = self.scan.config();
        match &self.output {
            Some(root) => config.with_output_root(root),
            None => config,
        }
    }
}
