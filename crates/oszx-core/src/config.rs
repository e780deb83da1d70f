//! Batch extraction configuration.

use std::num::NonZeroUsize;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use crate::extraction::LongPathPolicy;

/// Default bundle file extension (without the dot).
pub const DEFAULT_EXTENSION: &str = "osz";

/// Default marker suffix identifying a beatmap entry.
pub const DEFAULT_MARKER_SUFFIX: &str = ".osu";

/// Configuration for a batch run.
///
/// # Examples
///
/// ```
/// use oszx_core::BatchConfig;
///
/// // osu! defaults: `.osz` bundles carrying `.osu` beatmaps
/// let config = BatchConfig::default();
/// assert_eq!(config.extension, "osz");
///
/// // Write everything somewhere else, on two workers
/// let custom = BatchConfig::default()
///     .with_output_root("/tmp/extracted")
///     .with_threads(2);
/// assert!(custom.output_root.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Extension of candidate archives, without the leading dot.
    /// Compared case-sensitively.
    pub extension: String,

    /// Entry-name suffix that marks an archive as conforming.
    pub marker_suffix: String,

    /// Root under which `<base name>/` folders are created.
    /// `None` means the source directory itself.
    pub output_root: Option<PathBuf>,

    /// Worker pool size. `None` uses the available parallelism.
    pub threads: Option<NonZeroUsize>,

    /// How destination paths are made addressable on this platform.
    pub long_paths: LongPathPolicy,

    /// Stops new jobs from starting once cancelled.
    pub cancel: CancelToken,
}

impl Default for BatchConfig {
    /// Creates a configuration with osu! defaults.
    ///
    /// Default values:
    /// - `extension`: `"osz"`
    /// - `marker_suffix`: `".osu"`
    /// - `output_root`: `None` (extract next to the bundles)
    /// - `threads`: `None` (available parallelism)
    /// - `long_paths`: [`LongPathPolicy::host`]
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            marker_suffix: DEFAULT_MARKER_SUFFIX.to_string(),
            output_root: None,
            threads: None,
            long_paths: LongPathPolicy::host(),
            cancel: CancelToken::new(),
        }
    }
}

impl BatchConfig {
    /// Sets the candidate archive extension. A leading dot is ignored.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.extension = extension
            .strip_prefix('.')
            .map_or_else(|| extension.clone(), str::to_string);
        self
    }

    /// Sets the marker suffix.
    #[must_use]
    pub fn with_marker_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.marker_suffix = suffix.into();
        self
    }

    /// Sets the output root.
    #[must_use]
    pub fn with_output_root(mut self, root: impl AsRef<Path>) -> Self {
        self.output_root = Some(root.as_ref().to_path_buf());
        self
    }

    /// Sets the worker count. Zero falls back to the available parallelism.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = NonZeroUsize::new(threads);
        self
    }

    /// Sets the long-path policy.
    #[must_use]
    pub fn with_long_paths(mut self, policy: LongPathPolicy) -> Self {
        self.long_paths = policy;
        self
    }

    /// Uses the given cancellation token.
    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Resolves the worker pool size.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.threads
            .or_else(|| std::thread::available_parallelism().ok())
            .map_or(1, NonZeroUsize::get)
    }

    /// Returns the output root for a given source directory.
    #[must_use]
    pub fn output_root_for<'a>(&'a self, source_dir: &'a Path) -> &'a Path {
        self.output_root.as_deref().unwrap_or(source_dir)
    }

    /// Returns `true` if `path` has the candidate extension.
    #[must_use]
    pub fn is_candidate(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.extension)
    }
}

/// Cooperative cancellation flag shared between a caller and a batch.
///
/// Cancelling stops new jobs from starting; jobs already running finish.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BatchConfig::default();
        assert_eq!(config.extension, "osz");
        assert_eq!(config.marker_suffix, ".osu");
        assert!(config.output_root.is_none());
        assert!(config.worker_count() >= 1);
    }

    #[test]
    fn test_with_extension_strips_dot() {
        let config = BatchConfig::default().with_extension(".zip");
        assert_eq!(config.extension, "zip");
        let config = BatchConfig::default().with_extension("osk");
        assert_eq!(config.extension, "osk");
    }

    #[test]
    fn test_with_threads_zero_falls_back() {
        let config = BatchConfig::default().with_threads(0);
        assert!(config.threads.is_none());
        let config = BatchConfig::default().with_threads(3);
        assert_eq!(config.worker_count(), 3);
    }

    #[test]
    fn test_is_candidate_case_sensitive() {
        let config = BatchConfig::default();
        assert!(config.is_candidate(Path::new("songs/123 Artist - Title.osz")));
        assert!(!config.is_candidate(Path::new("songs/123.OSZ")));
        assert!(!config.is_candidate(Path::new("songs/123.zip")));
        assert!(!config.is_candidate(Path::new("songs/osz")));
    }

    #[test]
    fn test_output_root_for() {
        let source = Path::new("/songs");
        let config = BatchConfig::default();
        assert_eq!(config.output_root_for(source), Path::new("/songs"));

        let config = config.with_output_root("/out");
        assert_eq!(config.output_root_for(source), Path::new("/out"));
    }

    #[test]
    fn test_cancel_token_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
