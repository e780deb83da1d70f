//! Error types for batch bundle extraction.
//!
//! Errors come in three tiers, each caught at its own boundary:
//!
//! - [`EntryError`]: one archive member could not be materialised. Collected
//!   per archive; sibling entries keep extracting.
//! - [`JobError`]: one archive failed as a whole. Recorded as that archive's
//!   outcome; sibling archives keep running.
//! - [`BatchError`]: the run could not start at all. The only tier that is
//!   returned to the caller as an `Err`.

use std::path::PathBuf;

use thiserror::Error;
use zip::result::ZipError;

/// Result type alias using `BatchError`.
pub type Result<T> = std::result::Result<T, BatchError>;

/// Fatal errors that abort a batch before any job starts.
#[derive(Error, Debug)]
pub enum BatchError {
    /// The source directory does not exist.
    #[error("source directory not found: {path}")]
    SourceDirMissing {
        /// The directory that was expected.
        path: PathBuf,
    },

    /// The source path exists but is not a directory.
    #[error("source path is not a directory: {path}")]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// The source directory could not be listed.
    #[error("failed to list source directory {path}: {source}")]
    ListSource {
        /// The directory being listed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The worker pool could not be created.
    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Errors attributed to a single archive.
#[derive(Error, Debug)]
pub enum JobError {
    /// The archive could not be opened as a zip container.
    #[error("cannot open {path} as a zip archive: {source}")]
    Open {
        /// The archive path.
        path: PathBuf,
        /// Underlying zip or I/O error.
        #[source]
        source: ZipError,
    },

    /// One or more entries failed to extract.
    #[error("{} entries failed to extract from {path}", .failures.len())]
    Extraction {
        /// The archive path.
        path: PathBuf,
        /// Every entry failure, in no particular order.
        failures: Vec<EntryError>,
    },

    /// The job panicked. The panic was contained at the job boundary.
    #[error("unexpected failure while processing {path}: {reason}")]
    Unexpected {
        /// The archive path.
        path: PathBuf,
        /// Panic payload, when it was a string.
        reason: String,
    },
}

impl JobError {
    /// Returns a short, stable identifier for this error kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use oszx_core::JobError;
    /// use std::path::PathBuf;
    ///
    /// let err = JobError::Unexpected {
    ///     path: PathBuf::from("song.osz"),
    ///     reason: "boom".into(),
    /// };
    /// assert_eq!(err.kind(), "unexpected");
    /// ```
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Open { .. } => "open",
            Self::Extraction { .. } => "extraction",
            Self::Unexpected { .. } => "unexpected",
        }
    }

    /// Returns the per-entry failures for an extraction error.
    #[must_use]
    pub fn entry_failures(&self) -> &[EntryError] {
        match self {
            Self::Extraction { failures, .. } => failures,
            _ => &[],
        }
    }
}

/// Errors attributed to a single archive entry.
#[derive(Error, Debug)]
pub enum EntryError {
    /// The entry name is absolute or climbs out of the output folder.
    #[error("unsafe entry name: {name}")]
    UnsafeName {
        /// The raw entry name.
        name: String,
    },

    /// The entry could not be located or decoded in the container.
    #[error("cannot read entry {name}: {source}")]
    Entry {
        /// The raw entry name.
        name: String,
        /// Underlying zip error.
        #[source]
        source: ZipError,
    },

    /// The entry's data stream failed mid-copy (corrupt or truncated data).
    #[error("corrupt data in entry {name}: {source}")]
    Read {
        /// The raw entry name.
        name: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A directory on the destination path could not be created.
    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        /// The directory path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The destination file could not be created or written.
    #[error("cannot write {path}: {source}")]
    Write {
        /// The destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The destination path exceeds what the platform can address.
    #[error("path too long ({length} > {limit}): {path}")]
    PathTooLong {
        /// The destination path.
        path: PathBuf,
        /// Measured length, in the platform's unit.
        length: usize,
        /// The applicable limit.
        limit: usize,
    },
}

impl EntryError {
    /// Returns `true` if this failure is a path-length limit.
    #[must_use]
    pub const fn is_path_too_long(&self) -> bool {
        matches!(self, Self::PathTooLong { .. })
    }

    /// Returns a short, stable identifier for this error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnsafeName { .. } => "unsafe_name",
            Self::Entry { .. } => "entry",
            Self::Read { .. } => "read",
            Self::CreateDir { .. } => "create_dir",
            Self::Write { .. } => "write",
            Self::PathTooLong { .. } => "path_too_long",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_source_dir_missing_display() {
        let err = BatchError::SourceDirMissing {
            path: PathBuf::from("/home/user/songs"),
        };
        assert_eq!(err.to_string(), "source directory not found: /home/user/songs");
    }

    #[test]
    fn test_open_error_keeps_source() {
        use std::error::Error;

        let err = JobError::Open {
            path: PathBuf::from("broken.osz"),
            source: ZipError::InvalidArchive("Could not find EOCD".into()),
        };
        assert!(err.to_string().contains("broken.osz"));
        assert!(err.source().is_some());
        assert_eq!(err.kind(), "open");
        assert!(err.entry_failures().is_empty());
    }

    #[test]
    fn test_extraction_error_counts_failures() {
        let err = JobError::Extraction {
            path: PathBuf::from("song.osz"),
            failures: vec![
                EntryError::UnsafeName {
                    name: "../evil".into(),
                },
                EntryError::Write {
                    path: PathBuf::from("out/a.osu"),
                    source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "2 entries failed to extract from song.osz"
        );
        assert_eq!(err.entry_failures().len(), 2);
    }

    #[test]
    fn test_path_too_long() {
        let err = EntryError::PathTooLong {
            path: PathBuf::from("deep"),
            length: 5000,
            limit: 4096,
        };
        assert!(err.is_path_too_long());
        assert_eq!(err.kind(), "path_too_long");
        assert!(err.to_string().contains("5000 > 4096"));

        let err = EntryError::UnsafeName { name: "/etc".into() };
        assert!(!err.is_path_too_long());
    }
}
