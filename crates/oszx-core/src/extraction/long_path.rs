//! Destination path normalisation for platform length limits.
//!
//! Beatmap folders routinely carry long artist/title/mapper names, and the
//! files inside repeat them, so destinations can exceed the classic Windows
//! `MAX_PATH` of 260. On Windows every destination is rewritten to the
//! extended-length form (`\\?\C:\…`, `\\?\UNC\server\share\…`), which raises
//! the limit to 32 767 UTF-16 units. Elsewhere the POSIX limits are checked
//! up front so an oversized path is reported as such instead of as an opaque
//! OS error.

use std::ffi::OsString;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::EntryError;

/// Maximum length of an extended-length Windows path, in UTF-16 units.
pub const VERBATIM_MAX_PATH: usize = 32_767;

/// Maximum POSIX path length in bytes, excluding the terminating NUL.
pub const POSIX_MAX_PATH: usize = 4095;

/// Maximum POSIX file name length in bytes.
pub const POSIX_MAX_COMPONENT: usize = 255;

const VERBATIM_PREFIX: &str = r"\\?\";
const VERBATIM_UNC_PREFIX: &str = r"\\?\UNC\";

/// Strategy for making destination paths addressable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LongPathPolicy {
    /// Windows extended-length (`\\?\`) addressing.
    Verbatim,
    /// Fixed byte limits, checked before touching the filesystem.
    Limited {
        /// Maximum total path length in bytes.
        max_path: usize,
        /// Maximum length of a single path component in bytes.
        max_component: usize,
    },
}

impl Default for LongPathPolicy {
    fn default() -> Self {
        Self::host()
    }
}

impl LongPathPolicy {
    /// Returns the strategy for the platform this binary was built for.
    #[must_use]
    pub const fn host() -> Self {
        #[cfg(windows)]
        {
            Self::Verbatim
        }
        #[cfg(not(windows))]
        {
            Self::posix()
        }
    }

    /// Returns the POSIX limits (`PATH_MAX` 4096, `NAME_MAX` 255).
    #[must_use]
    pub const fn posix() -> Self {
        Self::Limited {
            max_path: POSIX_MAX_PATH,
            max_component: POSIX_MAX_COMPONENT,
        }
    }

    /// Returns the total path limit for this strategy.
    #[must_use]
    pub const fn max_path(&self) -> usize {
        match self {
            Self::Verbatim => VERBATIM_MAX_PATH,
            Self::Limited { max_path, .. } => *max_path,
        }
    }

    /// Rewrites `path` into a form the platform can address.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::PathTooLong`] if the path exceeds the
    /// strategy's limits. The path is never truncated.
    ///
    /// # Examples
    ///
    /// ```
    /// use oszx_core::LongPathPolicy;
    /// use std::path::Path;
    ///
    /// let policy = LongPathPolicy::Verbatim;
    /// let path = policy.normalize(Path::new(r"C:\osu!\Songs\1 a - b\x.osu")).unwrap();
    /// assert_eq!(path.to_str(), Some(r"\\?\C:\osu!\Songs\1 a - b\x.osu"));
    /// ```
    pub fn normalize(&self, path: &Path) -> Result<PathBuf, EntryError> {
        match *self {
            Self::Verbatim => {
                let verbatim = to_verbatim(path);
                let length = verbatim
                    .to_str()
                    .map_or_else(|| verbatim.as_os_str().len(), |s| s.encode_utf16().count());
                if length > VERBATIM_MAX_PATH {
                    return Err(too_long(path, length, VERBATIM_MAX_PATH));
                }
                Ok(verbatim)
            }
            Self::Limited {
                max_path,
                max_component,
            } => {
                let length = path.as_os_str().len();
                if length > max_path {
                    return Err(too_long(path, length, max_path));
                }
                for component in path.components() {
                    if let Component::Normal(name) = component
                        && name.len() > max_component
                    {
                        return Err(too_long(path, name.len(), max_component));
                    }
                }
                Ok(path.to_path_buf())
            }
        }
    }
}

fn too_long(path: &Path, length: usize, limit: usize) -> EntryError {
    EntryError::PathTooLong {
        path: path.to_path_buf(),
        length,
        limit,
    }
}

fn to_verbatim(path: &Path) -> PathBuf {
    let Some(raw) = path.to_str() else {
        // Not valid Unicode, so it cannot carry a Windows prefix; leave it to
        // the OS to accept or reject.
        return path.to_path_buf();
    };

    if raw.starts_with(VERBATIM_PREFIX) {
        return path.to_path_buf();
    }

    let absolute = if is_windows_absolute(raw) {
        raw.replace('/', "\\")
    } else {
        let Ok(abs) = std::path::absolute(path) else {
            return path.to_path_buf();
        };
        match abs.to_str() {
            Some(s) if !s.starts_with(VERBATIM_PREFIX) => s.replace('/', "\\"),
            _ => return abs,
        }
    };

    let mut out = OsString::with_capacity(absolute.len() + VERBATIM_UNC_PREFIX.len());
    if let Some(share) = absolute.strip_prefix(r"\\") {
        out.push(VERBATIM_UNC_PREFIX);
        out.push(share);
    } else {
        out.push(VERBATIM_PREFIX);
        out.push(&absolute);
    }
    PathBuf::from(out)
}

/// `C:\…`, `C:/…` or `\\server\…`.
fn is_windows_absolute(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let drive = bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/');
    drive || raw.starts_with(r"\\")
}
