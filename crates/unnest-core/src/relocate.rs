//! Moving extracted content out of the staging area.
//!
//! The staging area usually lives in the system temporary directory, which is
//! often a different filesystem than the scan root. `rename` is tried first
//! and falls back to copy + delete when the kernel reports a cross-device
//! move.

use std::fs;
use std::io;
use std::path::Path;

use filetime::FileTime;
use walkdir::WalkDir;

/// Raw `EXDEV` value, for platforms where `ErrorKind::CrossesDevices` is not
/// reported.
const EXDEV: i32 = 18;

/// Moves every child of `content_root` into `target`.
///
/// `target` must exist. Returns the number of top-level entries moved.
///
/// # Errors
///
/// Returns the first error encountered. Entries already moved stay in
/// `target`.
pub fn relocate_children(content_root: &Path, target: &Path) -> io::Result<usize> {
    let mut moved = 0;
    for entry in fs::read_dir(content_root)? {
        let entry = entry?;
        move_entry(&entry.path(), &target.join(entry.file_name()))?;
        moved += 1;
    }
    Ok(moved)
}

/// Moves a file, symlink or directory tree from `src` to `dst`.
///
/// # Errors
///
/// Returns an error if both the rename and the copy fallback fail.
pub fn move_entry(src: &Path, dst: &Path) -> io::Result<()> {
    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device(&e) => {
            tracing::debug!(
                src = %src.display(),
                dst = %dst.display(),
                "rename crosses devices, copying"
            );
            copy_tree(src, dst)?;
            remove_tree(src)
        }
        Err(e) => Err(e),
    }
}

fn is_cross_device(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::CrossesDevices || err.raw_os_error() == Some(EXDEV)
}

/// Copies `src` to `dst`, recreating symlinks instead of following them and
/// carrying file and directory times over.
pub(crate) fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    let mut dir_times = Vec::new();

    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| io::Error::other(e.to_string()))?;
        let out = dst.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&out)?;
            let meta = entry.metadata().map_err(io::Error::from)?;
            dir_times.push((out, meta));
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &out)?;
        } else {
            fs::copy(entry.path(), &out)?;
            let meta = entry.metadata().map_err(io::Error::from)?;
            copy_times(&meta, &out)?;
        }
    }

    // Children are in place, so directory times are no longer disturbed
    for (out, meta) in dir_times.iter().rev() {
        copy_times(meta, out)?;
    }
    Ok(())
}

fn copy_times(meta: &fs::Metadata, out: &Path) -> io::Result<()> {
    filetime::set_file_times(
        out,
        FileTime::from_last_access_time(meta),
        FileTime::from_last_modification_time(meta),
    )
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(fs::read_link(src)?, dst)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    fs::copy(src, dst).map(drop)
}

fn remove_tree(path: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}
