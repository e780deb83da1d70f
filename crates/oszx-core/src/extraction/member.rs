//! Writing a single archive member to disk.

use std::fs::File;
use std::fs::create_dir_all;
use std::io::BufWriter;
use std::io::ErrorKind;
use std::io::Read;
use std::io::Write;
use std::io::{self};
use std::path::Path;
use std::path::PathBuf;

use zip::ZipArchive;

use super::LongPathPolicy;
use crate::EntryError;
use crate::copy::CopyBuffer;
use crate::copy::CopyError;
use crate::copy::copy_with_buffer;
use crate::io::SharedFile;
use crate::layout::PlannedEntry;

/// What an entry materialises as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// A regular file with content.
    File,
    /// A directory; only created, never written.
    Directory,
}

/// Outcome of one successfully extracted member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberStats {
    /// What was created.
    pub kind: MemberKind,
    /// Bytes written (zero for directories).
    pub bytes: u64,
}

/// Materialises one entry at `destination`.
///
/// Missing ancestors are created first. Existing files are overwritten.
/// `name` is the entry's archive name, used only for error attribution.
///
/// # Errors
///
/// - [`EntryError::PathTooLong`] if the destination is not addressable
/// - [`EntryError::CreateDir`] if a directory cannot be created
/// - [`EntryError::Write`] if the file cannot be created or written
/// - [`EntryError::Read`] if `reader` fails (corrupt entry data)
///
/// # Examples
///
/// ```no_run
/// use oszx_core::LongPathPolicy;
/// use oszx_core::copy::CopyBuffer;
/// use oszx_core::extraction::MemberKind;
/// use oszx_core::extraction::extract_member;
/// use std::path::Path;
///
/// let mut data: &[u8] = b"osu file format v14";
/// let bytes = extract_member(
///     &mut data,
///     "Normal.osu",
///     MemberKind::File,
///     Path::new("out/song/Normal.osu"),
///     LongPathPolicy::host(),
///     &mut CopyBuffer::new(),
/// )
/// .unwrap();
/// assert_eq!(bytes, 19);
/// ```
pub fn extract_member<R: Read>(
    reader: &mut R,
    name: &str,
    kind: MemberKind,
    destination: &Path,
    policy: LongPathPolicy,
    buffer: &mut CopyBuffer,
) -> Result<u64, EntryError> {
    let target = policy.normalize(destination)?;

    match kind {
        MemberKind::Directory => {
            create_dir_all(&target).map_err(|e| dir_error(&target, e, policy))?;
            Ok(0)
        }
        MemberKind::File => {
            if let Some(parent) = target.parent() {
                create_dir_all(parent).map_err(|e| dir_error(parent, e, policy))?;
            }

            let file = File::create(&target).map_err(|e| write_error(&target, e, policy))?;
            let mut writer = BufWriter::with_capacity(64 * 1024, file);

            let bytes = copy_with_buffer(reader, &mut writer, buffer).map_err(|e| match e {
                CopyError::Read(source) => EntryError::Read {
                    name: name.to_string(),
                    source,
                },
                CopyError::Write(source) => write_error(&target, source, policy),
            })?;

            writer
                .flush()
                .map_err(|e| write_error(&target, e, policy))?;
            Ok(bytes)
        }
    }
}

/// Extracts a planned entry from `zip` under `dest_dir`.
pub(crate) fn extract_planned(
    zip: &mut ZipArchive<SharedFile>,
    entry: &PlannedEntry,
    dest_dir: &Path,
    policy: LongPathPolicy,
    buffer: &mut CopyBuffer,
) -> Result<MemberStats, EntryError> {
    let destination = dest_dir.join(&entry.relative);

    if entry.is_dir {
        let mut empty = io::empty();
        extract_member(
            &mut empty,
            &entry.name,
            MemberKind::Directory,
            &destination,
            policy,
            buffer,
        )?;
        return Ok(MemberStats {
            kind: MemberKind::Directory,
            bytes: 0,
        });
    }

    let mut file = zip.by_index(entry.index).map_err(|source| EntryError::Entry {
        name: entry.name.clone(),
        source,
    })?;
    let bytes = extract_member(
        &mut file,
        &entry.name,
        MemberKind::File,
        &destination,
        policy,
        buffer,
    )?;
    Ok(MemberStats {
        kind: MemberKind::File,
        bytes,
    })
}

fn dir_error(path: &Path, source: io::Error, policy: LongPathPolicy) -> EntryError {
    if source.kind() == ErrorKind::InvalidFilename {
        return path_too_long(path, policy);
    }
    EntryError::CreateDir {
        path: path.to_path_buf(),
        source,
    }
}

fn write_error(path: &Path, source: io::Error, policy: LongPathPolicy) -> EntryError {
    if source.kind() == ErrorKind::InvalidFilename {
        return path_too_long(path, policy);
    }
    EntryError::Write {
        path: path.to_path_buf(),
        source,
    }
}

fn path_too_long(path: &Path, policy: LongPathPolicy) -> EntryError {
    EntryError::PathTooLong {
        path: PathBuf::from(path),
        length: path.as_os_str().len(),
        limit: policy.max_path(),
    }
}
