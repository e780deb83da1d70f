//! Test utilities for building bundles.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::io::Cursor;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Builder for in-memory ZIP bundles.
///
/// Entries are written in the order they are added, which is also the
/// container order seen by the layout resolver.
///
/// # Examples
///
/// ```
/// use oszx_core::test_utils::ZipTestBuilder;
///
/// let data = ZipTestBuilder::new()
///     .add_directory("song/")
///     .add_file("song/Normal.osu", b"osu file format v14")
///     .build();
/// assert!(!data.is_empty());
/// ```
pub struct ZipTestBuilder {
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipTestBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Adds a stored (uncompressed) file.
    #[must_use]
    pub fn add_file(self, path: &str, data: &[u8]) -> Self {
        self.add_file_with(path, data, CompressionMethod::Stored)
    }

    /// Adds a deflate-compressed file.
    #[must_use]
    pub fn add_deflated_file(self, path: &str, data: &[u8]) -> Self {
        self.add_file_with(path, data, CompressionMethod::Deflated)
    }

    fn add_file_with(mut self, path: &str, data: &[u8], method: CompressionMethod) -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(method)
            .unix_permissions(0o644);
        self.zip.start_file(path, options).unwrap();
        self.zip.write_all(data).unwrap();
        self
    }

    /// Adds a directory entry. `path` should end with `/`.
    #[must_use]
    pub fn add_directory(mut self, path: &str) -> Self {
        let options = SimpleFileOptions::default().unix_permissions(0o755);
        self.zip.add_directory(path, options).unwrap();
        self
    }

    /// Finishes the archive and returns its bytes.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.zip.finish().unwrap().into_inner()
    }

    /// Finishes the archive, writes it to `path`, and returns the path.
    pub fn write_to(self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref().to_path_buf();
        std::fs::write(&path, self.build()).unwrap();
        path
    }
}

impl Default for ZipTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes a bundle named `file_name` into `dir` with the given files.
///
/// Names ending with `/` become directory entries.
pub fn write_bundle(dir: &Path, file_name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
    let mut builder = ZipTestBuilder::new();
    for (name, data) in entries {
        builder = if name.ends_with('/') {
            builder.add_directory(name)
        } else {
            builder.add_file(name, data)
        };
    }
    builder.write_to(dir.join(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_builder() {
        let data = ZipTestBuilder::new()
            .add_file("a.osu", b"content")
            .add_deflated_file("b.osu", b"content content content")
            .add_directory("dir/")
            .build();
        let archive = zip::ZipArchive::new(Cursor::new(data)).unwrap();
        assert_eq!(archive.len(), 3);
    }

    #[test]
    fn test_write_bundle() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = write_bundle(temp.path(), "x.osz", &[("x/", b""), ("x/a.osu", b"1")]);
        assert!(path.exists());
    }
}
