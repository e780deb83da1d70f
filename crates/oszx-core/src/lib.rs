//! Parallel batch extraction of osu! beatmap bundles.
//!
//! `oszx-core` scans a directory for `.osz` bundles (zip containers), keeps
//! the ones that actually carry beatmap (`.osu`) entries, and extracts each
//! into its own folder. Archives are processed concurrently and every failure
//! is attributed to the archive that caused it, so a single corrupt bundle
//! never aborts the batch.
//!
//! # Examples
//!
//! ```no_run
//! use oszx_core::BatchConfig;
//! use oszx_core::run_batch;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let report = run_batch("songs", &BatchConfig::default())?;
//! println!(
//!     "{} extracted, {} skipped, {} failed",
//!     report.extracted(),
//!     report.skipped(),
//!     report.failed()
//! );
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
pub mod batch;
pub mod config;
pub mod copy;
pub mod error;
pub mod extraction;
pub mod io;
pub mod layout;
pub mod report;

#[doc(hidden)]
pub mod test_utils;

// Re-export main API types
pub use archive::ArchiveEntry;
pub use archive::ArchiveHandle;
pub use archive::is_conforming;
pub use batch::check_directory;
pub use batch::discover_candidates;
pub use batch::run_batch;
pub use batch::run_batch_with_observer;
pub use config::BatchConfig;
pub use config::CancelToken;
pub use error::BatchError;
pub use error::EntryError;
pub use error::JobError;
pub use error::Result;
pub use extraction::LongPathPolicy;
pub use layout::Layout;
pub use layout::resolve_layout;
pub use report::ArchiveReport;
pub use report::BatchObserver;
pub use report::BatchReport;
pub use report::Classification;
pub use report::ExtractionOutcome;
pub use report::NoopObserver;
