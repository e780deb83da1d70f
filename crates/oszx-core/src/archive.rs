//! Open bundle handles and conformance classification.

use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use tracing::trace;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::JobError;
use crate::io::SharedFile;

/// Read-only view of one member of an open archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    index: usize,
    name: String,
}

impl ArchiveEntry {
    /// Creates an entry record. `index` is the position in the container.
    #[must_use]
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }

    /// Position of the entry in the container's central directory.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Slash-separated name as stored in the container.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if the entry denotes a directory (trailing `/` or `\`).
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.name.ends_with(['/', '\\'])
    }
}

/// An open zip container, owned by the job that processes it.
///
/// The underlying descriptor is shared only with clones handed to entry
/// workers of the same job (see [`ArchiveHandle::reader`]) and is released
/// when the handle and those clones are dropped.
pub struct ArchiveHandle {
    path: PathBuf,
    zip: ZipArchive<SharedFile>,
    entries: Vec<ArchiveEntry>,
}

impl ArchiveHandle {
    /// Opens `path` and parses its central directory.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::Open`] if the file cannot be read or is not a
    /// valid zip container.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, JobError> {
        let path = path.as_ref();
        let open_error = |source: ZipError| JobError::Open {
            path: path.to_path_buf(),
            source,
        };

        let file = SharedFile::open(path).map_err(|e| open_error(ZipError::Io(e)))?;
        let zip = ZipArchive::new(file).map_err(open_error)?;

        let entries = (0..zip.len())
            .filter_map(|index| {
                zip.name_for_index(index)
                    .map(|name| ArchiveEntry::new(index, name))
            })
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            zip,
            entries,
        })
    }

    /// Path the archive was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries in container order.
    #[must_use]
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Returns `true` if any entry name ends with `marker_suffix`.
    ///
    /// Matching is case-sensitive and uses the full entry name, so beatmaps
    /// nested in subfolders count.
    #[must_use]
    pub fn is_conforming(&self, marker_suffix: &str) -> bool {
        has_marker(&self.entries, marker_suffix)
    }

    /// Returns an independent reader over the same container.
    ///
    /// Clones share the parsed directory and the file descriptor but keep
    /// their own cursor, so each entry worker can stream data concurrently.
    #[must_use]
    pub fn reader(&self) -> ZipArchive<SharedFile> {
        self.zip.clone()
    }

    /// Releases the handle.
    pub fn close(self) {
        trace!(archive = %self.path.display(), "closing archive");
        drop(self);
    }
}

impl fmt::Debug for ArchiveHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveHandle")
            .field("path", &self.path)
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

/// Opens `path` and reports whether it contains a marker entry.
///
/// The handle is opened and closed by this call.
///
/// # Errors
///
/// Returns [`JobError::Open`] if the path is not a readable zip container.
///
/// # Examples
///
/// ```no_run
/// use oszx_core::is_conforming;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// if is_conforming("songs/1 Artist - Title.osz", ".osu")? {
///     println!("beatmap bundle");
/// }
/// # Ok(())
/// # }
/// ```
pub fn is_conforming(path: impl AsRef<Path>, marker_suffix: &str) -> Result<bool, JobError> {
    let handle = ArchiveHandle::open(path)?;
    let conforming = handle.is_conforming(marker_suffix);
    handle.close();
    Ok(conforming)
}

fn has_marker(entries: &[ArchiveEntry], marker_suffix: &str) -> bool {
    entries
        .iter()
        .any(|entry| !entry.is_dir() && entry.name().ends_with(marker_suffix))
}
