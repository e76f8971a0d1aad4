//! Extraction helpers shared between the ZIP and TAR unpackers.

use std::fs::File;
use std::fs::create_dir_all;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::ExtractionError;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::copy_with_buffer;
use crate::report::UnpackReport;
use crate::types::SafePath;
use crate::types::StagingArea;

/// Writes a regular file from `reader` to its place in the staging area.
///
/// Parent directories are created as needed. Returns the path written.
///
/// # Errors
///
/// Returns an error if a directory or the file cannot be created, or if the
/// copy fails.
pub fn extract_file<R: Read + ?Sized>(
    reader: &mut R,
    safe: &SafePath,
    staging: &StagingArea,
    report: &mut UnpackReport,
    buffer: &mut CopyBuffer,
) -> Result<PathBuf> {
    let output_path = staging.join(safe);

    if let Some(parent) = output_path.parent() {
        create_dir_all(parent)?;
    }

    // Never write through a link planted by an earlier entry
    if std::fs::symlink_metadata(&output_path).is_ok_and(|meta| meta.file_type().is_symlink()) {
        std::fs::remove_file(&output_path)?;
    }

    let output_file = File::create(&output_path)?;
    let mut writer = BufWriter::with_capacity(64 * 1024, output_file);
    let bytes_written = copy_with_buffer(reader, &mut writer, buffer)?;
    writer.flush()?;

    report.files_extracted += 1;
    report.bytes_written += bytes_written;

    Ok(output_path)
}

/// Creates a directory entry. Idempotent.
///
/// # Errors
///
/// Returns an error if directory creation fails.
pub fn create_directory(
    safe: &SafePath,
    staging: &StagingArea,
    report: &mut UnpackReport,
) -> Result<()> {
    create_dir_all(staging.join(safe))?;
    report.directories_created += 1;
    Ok(())
}

/// Checks that a symlink target, resolved from the link's real directory,
/// stays inside the staging area.
///
/// The link's directory is located through the filesystem, so links created
/// by earlier entries are followed. The target itself may only climb with a
/// leading run of `..`; any `..` after a named component is rejected, since
/// that component may itself be a link.
///
/// # Errors
///
/// Returns `ExtractionError::SymlinkEscape` for absolute targets and targets
/// that climb above the staging root, or an I/O error if the link's
/// directory cannot be resolved.
pub fn validate_symlink_target(
    link: &SafePath,
    target: &Path,
    staging: &StagingArea,
) -> Result<()> {
    let escape = || ExtractionError::SymlinkEscape {
        path: link.as_path().to_path_buf(),
    };

    let link_path = staging.join(link);
    let link_dir = link_path.parent().unwrap_or_else(|| staging.path());
    let real_dir = resolve_existing(link_dir)?;
    let depth = real_dir
        .strip_prefix(staging.path())
        .map_err(|_| escape())?
        .components()
        .count();

    if target_stays_within(target, depth) {
        Ok(())
    } else {
        Err(escape())
    }
}

/// Returns `true` if `target`, followed from a directory `depth` levels
/// below some root, never leaves that root.
///
/// Only a leading run of `..` may climb. Named components are assumed to
/// resolve below the directory they are entered from.
pub(crate) fn target_stays_within(target: &Path, depth: usize) -> bool {
    let mut depth = depth;
    let mut descended = false;

    for component in target.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(_) => descended = true,
            Component::ParentDir if !descended => match depth.checked_sub(1) {
                Some(up) => depth = up,
                None => return false,
            },
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
        }
    }

    true
}

/// Canonicalizes the longest existing ancestor of `path` and re-appends the
/// components below it that do not exist yet.
fn resolve_existing(path: &Path) -> Result<PathBuf> {
    let mut existing = path;
    let mut missing = Vec::new();

    loop {
        match existing.canonicalize() {
            Ok(real) => {
                return Ok(missing.iter().rev().fold(real, |acc, name| acc.join(name)));
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let (Some(parent), Some(name)) = (existing.parent(), existing.file_name()) else {
                    return Err(err.into());
                };
                missing.push(name);
                existing = parent;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// Creates a symbolic link at `link` pointing to `target`.
///
/// # Errors
///
/// Returns an error if the link cannot be created, or on platforms without
/// symlink support.
pub fn create_symlink(
    link: &SafePath,
    target: &Path,
    staging: &StagingArea,
    report: &mut UnpackReport,
) -> Result<()> {
    #[cfg(unix)]
    {
        let link_path = staging.join(link);
        if let Some(parent) = link_path.parent() {
            create_dir_all(parent)?;
        }
        std::os::unix::fs::symlink(target, &link_path)?;
        report.links_created += 1;
        Ok(())
    }

    #[cfg(not(unix))]
    {
        let _ = (link, target, staging, report);
        Err(ExtractionError::SecurityViolation {
            reason: "symlinks are not supported on this platform".into(),
        })
    }
}

/// Creates a hard link at `link` to the already extracted entry `target`.
///
/// # Errors
///
/// Returns `ExtractionError::HardlinkEscape` if `target` has not been
/// extracted as a regular file, or an I/O error if linking fails.
pub fn create_hardlink(
    link: &SafePath,
    target: &SafePath,
    staging: &StagingArea,
    report: &mut UnpackReport,
) -> Result<()> {
    let source = staging.join(target);
    let is_regular = std::fs::symlink_metadata(&source).is_ok_and(|meta| meta.is_file());
    if !is_regular {
        return Err(ExtractionError::HardlinkEscape {
            path: link.as_path().to_path_buf(),
        });
    }

    let link_path = staging.join(link);
    if let Some(parent) = link_path.parent() {
        create_dir_all(parent)?;
    }
    std::fs::hard_link(&source, &link_path)?;
    report.links_created += 1;
    Ok(())
}
