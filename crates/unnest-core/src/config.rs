//! Configuration for recursive extraction runs.

use std::path::PathBuf;

/// Configuration for a single extraction or a recursive run.
///
/// Defaults keep source archives, reject links and stage in the system
/// temporary directory.
///
/// # Examples
///
/// ```
/// use unnest_core::ExtractConfig;
///
/// let config = ExtractConfig::default();
/// assert!(!config.delete_after);
///
/// let custom = ExtractConfig {
///     delete_after: true,
///     max_passes: Some(16),
///     ..Default::default()
/// };
/// assert_eq!(custom.max_passes, Some(16));
/// ```
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Delete the source archive after a successful extraction.
    pub delete_after: bool,

    /// Create symlink and hardlink members of TAR archives whose targets stay
    /// inside the archive. Disallowed links are skipped with a warning.
    pub allow_links: bool,

    /// Maximum number of path components in an archive entry.
    pub max_path_depth: usize,

    /// Directory in which staging areas are created. `None` uses the system
    /// temporary directory.
    pub staging_root: Option<PathBuf>,

    /// Upper bound on scan passes. `None` runs until a pass extracts nothing.
    pub max_passes: Option<usize>,

    /// Number of characters of a failure reason included in log messages.
    pub reason_limit: usize,
}

impl Default for ExtractConfig {
    /// Default values:
    /// - `delete_after`: false
    /// - `allow_links`: false
    /// - `max_path_depth`: 128
    /// - `staging_root`: `None`
    /// - `max_passes`: `None`
    /// - `reason_limit`: 100
    fn default() -> Self {
        Self {
            delete_after: false,
            allow_links: false,
            max_path_depth: 128,
            staging_root: None,
            max_passes: None,
            reason_limit: 100,
        }
    }
}

impl ExtractConfig {
    /// Creates a configuration that also materializes in-archive links.
    ///
    /// Use only for archives from trusted sources.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            allow_links: true,
            ..Default::default()
        }
    }

    /// Sets whether source archives are deleted after extraction.
    #[must_use]
    pub fn with_delete_after(mut self, delete_after: bool) -> Self {
        self.delete_after = delete_after;
        self
    }

    /// Sets whether link members are created.
    #[must_use]
    pub fn with_allow_links(mut self, allow_links: bool) -> Self {
        self.allow_links = allow_links;
        self
    }

    /// Sets the directory in which staging areas are created.
    #[must_use]
    pub fn with_staging_root(mut self, staging_root: Option<PathBuf>) -> Self {
        self.staging_root = staging_root;
        self
    }

    /// Sets the maximum number of scan passes.
    #[must_use]
    pub fn with_max_passes(mut self, max_passes: Option<usize>) -> Self {
        self.max_passes = max_passes;
        self
    }
}
