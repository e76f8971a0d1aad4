//! Scoped staging directory for a single extraction.

use std::path::Path;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::Result;

use super::SafePath;

/// Prefix of every staging directory name.
const STAGING_PREFIX: &str = ".unnest-staging-";

/// An exclusively owned, initially empty temporary directory.
///
/// The directory and everything in it is removed when the value is dropped,
/// on success, on error and during unwinding alike. The stored path is
/// canonical so that entry paths can be checked against it with
/// `starts_with`.
#[derive(Debug)]
pub struct StagingArea {
    dir: TempDir,
    canonical: PathBuf,
}

impl StagingArea {
    /// Creates a staging area under `root`, or under the system temporary
    /// directory when `root` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or canonicalized.
    pub fn new(root: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(STAGING_PREFIX);
        let dir = match root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        let canonical = dir.path().canonicalize()?;
        Ok(Self { dir, canonical })
    }

    /// Returns the canonical path of the staging directory.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.canonical
    }

    /// Joins a validated entry path onto the staging directory.
    #[inline]
    #[must_use]
    pub fn join(&self, safe: &SafePath) -> PathBuf {
        self.canonical.join(safe.as_path())
    }

    /// Removes the staging directory now, reporting any error.
    ///
    /// Dropping the value removes it as well but ignores failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory tree cannot be removed.
    pub fn close(self) -> Result<()> {
        self.dir.close()?;
        Ok(())
    }
}
