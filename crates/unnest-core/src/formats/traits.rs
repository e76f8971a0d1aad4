//! Common trait for archive format handlers.

use crate::ExtractConfig;
use crate::Result;
use crate::report::UnpackReport;
use crate::types::StagingArea;

/// Trait for archive format handlers.
pub trait ArchiveFormat {
    /// Unpacks every entry of the archive into the staging area.
    ///
    /// The staging area may be left partially populated on error; its owner
    /// removes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive is malformed, an entry fails path
    /// validation, or writing to disk fails.
    fn extract(&mut self, staging: &StagingArea, config: &ExtractConfig) -> Result<UnpackReport>;

    /// Returns the archive format name.
    fn format_name(&self) -> &'static str;
}
