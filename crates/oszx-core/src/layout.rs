//! Output layout detection for bundles.
//!
//! Bundles come from different packers. Some nest everything under a folder
//! named after the bundle (`song.osz` → `song/…`), some store files at the
//! top level. Both must end up as `<output root>/<base name>/…`, so a
//! wrapping folder is detected and stripped once.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::warn;

use crate::ArchiveEntry;
use crate::EntryError;

/// How archive entry names map onto the bundle's output folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// Content is nested under a folder named after the bundle. The prefix
    /// (including its trailing `/`) is stripped from entries under it.
    Wrapped {
        /// Entry-name prefix to strip, e.g. `"song/"`.
        prefix: String,
    },
    /// Entry names are used as-is.
    Flat,
}

impl Layout {
    /// Returns the stripped prefix for a wrapped layout.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        match self {
            Self::Wrapped { prefix } => Some(prefix),
            Self::Flat => None,
        }
    }

    /// Returns `name` relative to the bundle's output folder.
    ///
    /// Entries outside a wrapping folder keep their full name.
    ///
    /// # Examples
    ///
    /// ```
    /// use oszx_core::Layout;
    ///
    /// let layout = Layout::Wrapped { prefix: "song/".into() };
    /// assert_eq!(layout.relative_name("song/bg.jpg"), "bg.jpg");
    /// assert_eq!(layout.relative_name("extra.txt"), "extra.txt");
    /// assert_eq!(Layout::Flat.relative_name("song/bg.jpg"), "song/bg.jpg");
    /// ```
    #[must_use]
    pub fn relative_name<'a>(&self, name: &'a str) -> &'a str {
        match self {
            Self::Wrapped { prefix } => strip_wrapper(name, prefix).unwrap_or(name),
            Self::Flat => name,
        }
    }
}

/// Decides whether `entries` are wrapped in a folder named `base_name`.
///
/// The layout is [`Layout::Wrapped`] when a directory entry named exactly
/// `base_name/` (or `base_name\`) exists and at least one other entry lives under it.
/// Otherwise it is [`Layout::Flat`]. Duplicate wrapper entries are tolerated:
/// the first in container order wins.
///
/// # Examples
///
/// ```
/// use oszx_core::ArchiveEntry;
/// use oszx_core::Layout;
/// use oszx_core::resolve_layout;
///
/// let entries = [
///     ArchiveEntry::new(0, "song/"),
///     ArchiveEntry::new(1, "song/a.osu"),
/// ];
/// assert_eq!(
///     resolve_layout(&entries, "song"),
///     Layout::Wrapped { prefix: "song/".into() }
/// );
///
/// let flat = [ArchiveEntry::new(0, "a.osu")];
/// assert_eq!(resolve_layout(&flat, "song"), Layout::Flat);
/// ```
#[must_use]
pub fn resolve_layout(entries: &[ArchiveEntry], base_name: &str) -> Layout {
    if base_name.is_empty() {
        return Layout::Flat;
    }

    let prefix = format!("{base_name}/");
    let mut wrappers = entries
        .iter()
        .filter(|entry| strip_wrapper(entry.name(), &prefix) == Some(""));

    let Some(wrapper) = wrappers.next() else {
        return Layout::Flat;
    };

    let duplicates = wrappers.count();
    if duplicates > 0 {
        warn!(
            prefix = %prefix,
            index = wrapper.index(),
            duplicates,
            "several wrapping folder entries, using the first"
        );
    }

    let has_content = entries
        .iter()
        .any(|entry| strip_wrapper(entry.name(), &prefix).is_some_and(|rest| !rest.is_empty()));

    if has_content {
        debug!(prefix = %prefix, "wrapped layout");
        Layout::Wrapped { prefix }
    } else {
        debug!(prefix = %prefix, "wrapping folder is empty, using flat layout");
        Layout::Flat
    }
}

/// Strips a wrapping `prefix` (`base/`) from `name`, accepting `\` as the
/// separator after `base` the same way [`plan_entries`] does.
fn strip_wrapper<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    let base = prefix.strip_suffix('/').unwrap_or(prefix);
    name.strip_prefix(base)?.strip_prefix(['/', '\\'])
}

/// One entry scheduled for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEntry {
    /// Container index to read from.
    pub index: usize,
    /// Original entry name.
    pub name: String,
    /// Destination relative to the bundle's output folder.
    /// Empty for the wrapping folder itself.
    pub relative: PathBuf,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

/// Maps every entry to its destination under `layout`.
///
/// Entries whose names would escape the output folder are returned as
/// failures instead of being planned.
pub fn plan_entries(
    entries: &[ArchiveEntry],
    layout: &Layout,
) -> (Vec<PlannedEntry>, Vec<EntryError>) {
    let mut planned = Vec::with_capacity(entries.len());
    let mut rejected = Vec::new();

    for entry in entries {
        let relative = layout.relative_name(entry.name());
        match entry_relative_path(relative) {
            Some(path) if path.as_os_str().is_empty() && !entry.is_dir() => {
                rejected.push(EntryError::UnsafeName {
                    name: entry.name().to_string(),
                });
            }
            Some(path) => planned.push(PlannedEntry {
                index: entry.index(),
                name: entry.name().to_string(),
                relative: path,
                is_dir: entry.is_dir(),
            }),
            None => rejected.push(EntryError::UnsafeName {
                name: entry.name().to_string(),
            }),
        }
    }

    (planned, rejected)
}

/// Converts a slash-separated entry name into a relative native path.
///
/// Backslashes are treated as separators too, since some Windows packers
/// write them. Empty and `.` segments are dropped. Absolute names, `..`
/// segments and platform prefixes (`C:`) are rejected.
fn entry_relative_path(name: &str) -> Option<PathBuf> {
    if name.starts_with('/') || name.starts_with('\\') {
        return None;
    }

    let mut path = PathBuf::new();
    for segment in name.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => return None,
            _ => {
                let mut components = Path::new(segment).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(part)), None) => path.push(part),
                    _ => return None,
                }
            }
        }
    }
    Some(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn entries(names: &[&str]) -> Vec<ArchiveEntry> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| ArchiveEntry::new(i, *name))
            .collect()
    }

    #[test]
    fn test_wrapped_layout() {
        let e = entries(&["song/", "song/a.osu", "song/b.mp3"]);
        assert_eq!(
            resolve_layout(&e, "song"),
            Layout::Wrapped {
                prefix: "song/".into()
            }
        );
    }

    #[test]
    fn test_flat_without_wrapper_entry() {
        let e = entries(&["a.osu", "sub/b.mp3"]);
        assert_eq!(resolve_layout(&e, "song"), Layout::Flat);
    }

    #[test]
    fn test_implicit_folder_is_flat() {
        // No explicit `song/` directory entry.
        let e = entries(&["song/a.osu", "song/b.mp3"]);
        assert_eq!(resolve_layout(&e, "song"), Layout::Flat);
    }

    #[test]
    fn test_empty_wrapper_is_flat() {
        let e = entries(&["song/", "a.osu"]);
        assert_eq!(resolve_layout(&e, "song"), Layout::Flat);
    }

    #[test]
    fn test_wrapper_must_match_base_name() {
        let e = entries(&["other/", "other/a.osu"]);
        assert_eq!(resolve_layout(&e, "song"), Layout::Flat);
    }

    #[test]
    fn test_nested_dir_with_base_name_is_not_wrapper() {
        let e = entries(&["x/song/", "x/song/a.osu"]);
        assert_eq!(resolve_layout(&e, "song"), Layout::Flat);
    }

    #[test]
    fn test_duplicate_wrappers_tolerated() {
        let e = entries(&["song/", "song/a.osu", "song/"]);
        assert_eq!(
            resolve_layout(&e, "song"),
            Layout::Wrapped {
                prefix: "song/".into()
            }
        );
    }

    #[test]
    fn test_empty_base_name_is_flat() {
        let e = entries(&["/", "/a.osu"]);
        assert_eq!(resolve_layout(&e, ""), Layout::Flat);
    }

    #[test]
    fn test_plan_wrapped_strips_prefix_once() {
        let e = entries(&["song/", "song/a.osu", "song/song/b.mp3"]);
        let layout = resolve_layout(&e, "song");
        let (planned, rejected) = plan_entries(&e, &layout);
        assert!(rejected.is_empty());

        let rel: Vec<_> = planned.iter().map(|p| p.relative.clone()).collect();
        assert_eq!(
            rel,
            [
                PathBuf::new(),
                PathBuf::from("a.osu"),
                PathBuf::from("song").join("b.mp3"),
            ]
        );
        assert!(planned[0].is_dir);
    }

    #[test]
    fn test_plan_mixed_layout_keeps_outsiders() {
        let e = entries(&["song/", "song/a.osu", "readme.txt"]);
        let layout = resolve_layout(&e, "song");
        let (planned, _) = plan_entries(&e, &layout);
        assert_eq!(planned[2].relative, PathBuf::from("readme.txt"));
    }

    #[test]
    fn test_plan_flat_preserves_subdirs() {
        let e = entries(&["a.osu", "sub/b.mp3"]);
        let (planned, rejected) = plan_entries(&e, &Layout::Flat);
        assert!(rejected.is_empty());
        assert_eq!(planned[1].relative, PathBuf::from("sub").join("b.mp3"));
        assert_eq!(planned[1].index, 1);
    }

    #[test]
    fn test_plan_rejects_escaping_names() {
        let e = entries(&["../evil.osu", "/etc/passwd", "a/../../b", "ok.osu"]);
        let (planned, rejected) = plan_entries(&e, &Layout::Flat);
        assert_eq!(planned.len(), 1);
        assert_eq!(rejected.len(), 3);
        assert!(
            rejected
                .iter()
                .all(|e| matches!(e, EntryError::UnsafeName { .. }))
        );
    }

    #[test]
    fn test_backslash_entries_under_wrapper() {
        let e = entries(&["song/", "song\\a.osu", "song\\sub\\b.mp3"]);
        let layout = resolve_layout(&e, "song");
        assert_eq!(
            layout,
            Layout::Wrapped {
                prefix: "song/".into()
            }
        );

        let (planned, rejected) = plan_entries(&e, &layout);
        assert!(rejected.is_empty());
        let rel: Vec<_> = planned.iter().map(|p| p.relative.clone()).collect();
        assert_eq!(
            rel,
            [
                PathBuf::new(),
                PathBuf::from("a.osu"),
                PathBuf::from("sub").join("b.mp3"),
            ]
        );
    }

    #[test]
    fn test_backslash_wrapper_entry() {
        let e = entries(&["song\\", "song\\a.osu"]);
        assert_eq!(resolve_layout(&e, "song").prefix(), Some("song/"));
    }

    #[test]
    fn test_base_name_prefix_of_other_folder_is_not_wrapper() {
        let e = entries(&["song/", "songs/a.osu"]);
        assert_eq!(resolve_layout(&e, "song"), Layout::Flat);
    }

    #[test]
    fn test_entry_relative_path_normalizes() {
        assert_eq!(
            entry_relative_path("a//./b\\c.osu").unwrap(),
            PathBuf::from("a").join("b").join("c.osu")
        );
        assert!(entry_relative_path("\\share\\x").is_none());
        assert!(entry_relative_path("").unwrap().as_os_str().is_empty());
    }
}
