//! Sibling directory that receives an archive's content.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::formats::detect::ResolvedName;

/// The directory `parent(archive) / stripped_name` for one archive.
///
/// Its existence is the only record that an archive has already been
/// extracted, so [`TargetDir::exists`] is checked before any work starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDir(PathBuf);

impl TargetDir {
    /// Computes the target directory for `archive_path`.
    #[must_use]
    pub fn for_archive(archive_path: &Path, resolved: &ResolvedName) -> Self {
        let parent = archive_path.parent().unwrap_or_else(|| Path::new(""));
        Self(parent.join(&resolved.name))
    }

    /// Returns `true` if anything occupies the target path.
    ///
    /// Symlinks are not followed, so a dangling link also counts.
    #[must_use]
    pub fn exists(&self) -> bool {
        fs::symlink_metadata(&self.0).is_ok()
    }

    /// Creates the directory and any missing parents.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn create(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.0)
    }

    /// Removes the directory if it exists and has no entries.
    ///
    /// Returns `true` if the directory was removed. Errors are swallowed: the
    /// caller is already on a failure path.
    pub fn remove_if_empty(&self) -> bool {
        let is_empty = fs::read_dir(&self.0).is_ok_and(|mut entries| entries.next().is_none());
        is_empty && fs::remove_dir(&self.0).is_ok()
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}
