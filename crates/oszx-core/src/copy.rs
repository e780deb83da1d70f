//! Buffered copy that tells read failures apart from write failures.
//!
//! `std::io::copy` folds both sides into one `io::Error`. When extracting a
//! bundle member the distinction matters: a failing read means the archive
//! entry is corrupt, a failing write means the destination is the problem.

use std::io::Read;
use std::io::Write;
use std::io::{self};

/// I/O buffer size (64KB).
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Reusable stack buffer for entry copies.
///
/// One buffer is created per worker and reused for every entry that worker
/// extracts.
#[derive(Debug)]
pub struct CopyBuffer {
    #[allow(clippy::large_stack_arrays)]
    buf: [u8; COPY_BUFFER_SIZE],
}

impl CopyBuffer {
    /// Creates a new zeroed copy buffer.
    #[inline]
    #[must_use]
    #[allow(clippy::large_stack_arrays)]
    pub fn new() -> Self {
        Self {
            buf: [0u8; COPY_BUFFER_SIZE],
        }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        COPY_BUFFER_SIZE
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Which side of a copy failed.
#[derive(Debug)]
pub enum CopyError {
    /// Reading from the source failed.
    Read(io::Error),
    /// Writing to the destination failed.
    Write(io::Error),
}

/// Copies `reader` into `writer` through `buffer`, returning the byte count.
///
/// # Examples
///
/// ```
/// use oszx_core::copy::CopyBuffer;
/// use oszx_core::copy::copy_with_buffer;
///
/// let mut buffer = CopyBuffer::new();
/// let mut input: &[u8] = b"osu file format v14";
/// let mut output = Vec::new();
///
/// let copied = copy_with_buffer(&mut input, &mut output, &mut buffer).unwrap();
/// assert_eq!(copied, 19);
/// ```
#[inline]
pub fn copy_with_buffer<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
) -> Result<u64, CopyError> {
    let mut total: u64 = 0;

    loop {
        let bytes_read = match reader.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };

        writer
            .write_all(&buffer.buf[..bytes_read])
            .map_err(CopyError::Write)?;

        total += bytes_read as u64;
    }

    Ok(total)
}
