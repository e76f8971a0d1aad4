//! TAR archive format handler.
//!
//! Plain and gzip-compressed archives are handled alike: the first two bytes
//! are sniffed for the gzip magic, whatever the file name says.

use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;

use filetime::FileTime;
use flate2::read::GzDecoder;
use tar::EntryType;

use crate::ExtractConfig;
use crate::ExtractionError;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::report::UnpackReport;
use crate::types::SafePath;
use crate::types::StagingArea;

use super::common;
use super::detect::is_gzip_magic;
use super::traits::ArchiveFormat;

/// TAR archive handler.
pub struct TarArchive<R: Read> {
    source: R,
}

impl TarArchive<Box<dyn Read>> {
    /// Opens the TAR file at `path`, decoding gzip if the content starts with
    /// the gzip magic.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be opened or read.
    pub fn open(path: &Path) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        let compressed = is_gzip_magic(reader.fill_buf()?);

        let source: Box<dyn Read> = if compressed {
            tracing::debug!(path = %path.display(), "gzip-compressed tar");
            Box::new(GzDecoder::new(reader))
        } else {
            Box::new(reader)
        };
        Ok(Self::new(source))
    }
}

impl<R: Read> TarArchive<R> {
    /// Wraps an uncompressed TAR stream.
    #[must_use]
    pub fn new(source: R) -> Self {
        Self { source }
    }
}

impl<R: Read> ArchiveFormat for TarArchive<R> {
    fn extract(&mut self, staging: &StagingArea, config: &ExtractConfig) -> Result<UnpackReport> {
        let mut report = UnpackReport::new();
        let mut buffer = CopyBuffer::new();
        let mut archive = tar::Archive::new(&mut self.source);
        // Applied once all entries are in, since writing a child bumps the parent
        let mut dir_times = Vec::new();

        let entries = archive.entries().map_err(invalid)?;
        for entry in entries {
            let mut entry = entry.map_err(invalid)?;
            let entry_type = entry.header().entry_type();

            if matches!(entry_type, EntryType::XGlobalHeader) {
                continue;
            }

            let path = entry.path().map_err(invalid)?.into_owned();
            let Some(safe) = SafePath::validate(&path, staging, config)? else {
                tracing::debug!(entry = %path.display(), "skipping entry naming the archive root");
                continue;
            };

            match entry_type {
                EntryType::Directory => {
                    common::create_directory(&safe, staging, &mut report)?;
                    if let Some(mtime) = header_mtime(&entry) {
                        dir_times.push((staging.join(&safe), mtime));
                    }
                }
                EntryType::Regular | EntryType::Continuous | EntryType::GNUSparse => {
                    let mtime = header_mtime(&entry);
                    let mode = entry.header().mode().ok();
                    let output_path = common::extract_file(
                        &mut entry,
                        &safe,
                        staging,
                        &mut report,
                        &mut buffer,
                    )
                    .map_err(|e| match e {
                        ExtractionError::Io(io)
                            if matches!(
                                io.kind(),
                                std::io::ErrorKind::InvalidData
                                    | std::io::ErrorKind::UnexpectedEof
                            ) =>
                        {
                            invalid(io)
                        }
                        other => other,
                    })?;

                    if let Some(mode) = mode {
                        apply_mode(&output_path, mode)?;
                    }
                    if let Some(time) = mtime {
                        filetime::set_file_times(&output_path, time, time)?;
                    }
                }
                EntryType::Symlink => {
                    let target = link_target(&entry)?;
                    if !config.allow_links {
                        report.skip(format!(
                            "Skipped symlink (links not allowed): {}",
                            safe.as_path().display()
                        ));
                        continue;
                    }
                    common::validate_symlink_target(&safe, &target, staging)?;
                    common::create_symlink(&safe, &target, staging, &mut report)?;
                }
                EntryType::Link => {
                    let target = link_target(&entry)?;
                    if !config.allow_links {
                        report.skip(format!(
                            "Skipped hardlink (links not allowed): {}",
                            safe.as_path().display()
                        ));
                        continue;
                    }
                    let target = SafePath::validate(&target, staging, config)
                        .ok()
                        .flatten()
                        .ok_or_else(|| ExtractionError::HardlinkEscape {
                            path: safe.as_path().to_path_buf(),
                        })?;
                    common::create_hardlink(&safe, &target, staging, &mut report)?;
                }
                EntryType::Char | EntryType::Block | EntryType::Fifo => {
                    report.skip(format!(
                        "Skipped special file: {}",
                        safe.as_path().display()
                    ));
                }
                other => {
                    tracing::debug!(entry = %path.display(), kind = ?other, "unsupported tar entry type");
                    report.skip(format!(
                        "Skipped unsupported entry: {}",
                        safe.as_path().display()
                    ));
                }
            }
        }

        // Deepest first, so setting a child never disturbs its parent again
        for (path, time) in dir_times.iter().rev() {
            filetime::set_file_times(path, *time, *time)?;
        }

        Ok(report)
    }

    fn format_name(&self) -> &'static str {
        "tar"
    }
}

fn invalid(err: std::io::Error) -> ExtractionError {
    ExtractionError::InvalidArchive(format!("failed to read tar archive: {err}"))
}

fn header_mtime<R: Read>(entry: &tar::Entry<'_, R>) -> Option<FileTime> {
    let secs = entry.header().mtime().ok()?;
    i64::try_from(secs)
        .ok()
        .map(|secs| FileTime::from_unix_time(secs, 0))
}

fn link_target<R: Read>(entry: &tar::Entry<'_, R>) -> Result<std::path::PathBuf> {
    entry
        .link_name()
        .map_err(invalid)?
        .map(std::borrow::Cow::into_owned)
        .ok_or_else(|| ExtractionError::InvalidArchive("link entry without a target".into()))
}

/// Applies the recorded permission bits, without setuid, setgid or sticky.
#[cfg(unix)]
fn apply_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    // Owner must keep read/write so the tree can be relocated and removed
    let sanitized = (mode & 0o777) | 0o600;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(sanitized))?;
    Ok(())
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
