//! Archive format implementations.

pub mod common;
pub mod detect;
pub mod legacy;
pub mod tar;
pub mod traits;
pub mod zip;

use std::path::Path;

pub use detect::ArchiveKind;
pub use detect::ResolvedName;
pub use tar::TarArchive;
pub use traits::ArchiveFormat;
pub use zip::ZipArchive;

use crate::ExtractConfig;
use crate::Result;
use crate::report::UnpackReport;
use crate::types::StagingArea;

/// Unpacks the archive at `archive_path` into `staging` with the handler for
/// `kind`.
///
/// # Errors
///
/// Returns the handler's error. The staging area may be partially populated.
pub fn unpack(
    kind: ArchiveKind,
    archive_path: &Path,
    staging: &StagingArea,
    config: &ExtractConfig,
) -> Result<UnpackReport> {
    let mut handler: Box<dyn ArchiveFormat> = match kind {
        ArchiveKind::Zip => Box::new(ZipArchive::open(archive_path)?),
        ArchiveKind::Tar => Box::new(TarArchive::open(archive_path)?),
    };

    tracing::debug!(
        archive = %archive_path.display(),
        format = handler.format_name(),
        staging = %staging.path().display(),
        "unpacking"
    );
    handler.extract(staging, config)
}
