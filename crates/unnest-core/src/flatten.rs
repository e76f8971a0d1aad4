//! Selection of the directory whose children become the extracted content.
//!
//! Archives often wrap everything in one top-level folder named after the
//! archive. Extracting `photos.zip` that contains only `photos/...` should
//! produce `photos/...`, not `photos/photos/...`.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use walkdir::WalkDir;

use crate::formats::common::target_stays_within;

/// Returns the content root of an unpacked staging area.
///
/// That is the single child of `staging` when `staging` holds exactly one
/// entry and that entry is a real directory, and `staging` itself otherwise.
/// Symlinks are not followed, so a lone link to a directory is not unwrapped.
/// A folder is also kept when a link inside it points back out of it, since
/// the link would leave the target once the folder is gone.
///
/// # Errors
///
/// Returns an error if `staging` or its only entry cannot be inspected.
pub fn content_root(staging: &Path) -> io::Result<PathBuf> {
    let mut entries = fs::read_dir(staging)?;

    let Some(first) = entries.next().transpose()? else {
        return Ok(staging.to_path_buf());
    };
    if entries.next().is_some() {
        return Ok(staging.to_path_buf());
    }

    if !first.file_type()?.is_dir() {
        return Ok(staging.to_path_buf());
    }

    let wrapper = first.path();
    if links_stay_inside(&wrapper)? {
        tracing::debug!(wrapper = %wrapper.display(), "flattening single top-level folder");
        Ok(wrapper)
    } else {
        tracing::debug!(wrapper = %wrapper.display(), "link climbs out of folder, not flattening");
        Ok(staging.to_path_buf())
    }
}

/// Returns `true` if every symlink under `dir` resolves inside `dir`.
fn links_stay_inside(dir: &Path) -> io::Result<bool> {
    for entry in WalkDir::new(dir).follow_links(false).min_depth(1) {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.path_is_symlink() {
            continue;
        }
        let target = fs::read_link(entry.path())?;
        // Levels between `dir` and the directory holding the link
        if !target_stays_within(&target, entry.depth() - 1) {
            return Ok(false);
        }
    }
    Ok(true)
}
