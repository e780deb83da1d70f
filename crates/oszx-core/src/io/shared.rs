//! Positional file reader that can be cloned across worker threads.
//!
//! A `SharedFile` wraps one open file descriptor in an `Arc` and keeps its
//! own cursor. Reads go through positional I/O (`pread` on Unix,
//! `ReadFile` with an offset on Windows), so clones never disturb each
//! other's position. This lets every entry worker hold its own clone of a
//! parsed `zip::ZipArchive` while the archive still owns exactly one
//! descriptor, which is closed when the last clone drops.

use std::fs::File;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::{self};
use std::path::Path;
use std::sync::Arc;

/// Cloneable reader over a shared file descriptor.
///
/// # Examples
///
/// ```no_run
/// use oszx_core::io::SharedFile;
/// use std::io::Read;
///
/// let mut a = SharedFile::open("bundle.osz")?;
/// let mut b = a.clone();
///
/// let mut head = [0u8; 4];
/// a.read_exact(&mut head)?;
/// // `b` still starts at offset 0
/// b.read_exact(&mut head)?;
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct SharedFile {
    file: Arc<File>,
    len: u64,
    pos: u64,
}

impl SharedFile {
    /// Opens a file for shared positional reads.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::open(path)?;
        Self::new(file)
    }

    /// Wraps an already open file.
    pub fn new(file: File) -> io::Result<Self> {
        let len = file.metadata()?.len();
        Ok(Self {
            file: Arc::new(file),
            len,
            pos: 0,
        })
    }

    /// Returns the file length captured at open time.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns `true` if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of live clones sharing this descriptor.
    #[must_use]
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.file)
    }

    #[cfg(unix)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        use std::os::unix::fs::FileExt;
        self.file.read_at(buf, offset)
    }

    #[cfg(windows)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        use std::os::windows::fs::FileExt;
        self.file.seek_read(buf, offset)
    }
}

impl Read for SharedFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.len || buf.is_empty() {
            return Ok(0);
        }
        let n = self.read_at(buf, self.pos)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for SharedFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => self.len.checked_add_signed(delta),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
        };
        let target = target.ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )
        })?;
        self.pos = target;
        Ok(target)
    }
}
