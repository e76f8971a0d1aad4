//! ZIP archive format handler.
//!
//! Entries are written in archive order. Names stored without the UTF-8 flag
//! go through [`recover_entry_name`] first, and every file receives the DOS
//! timestamp recorded in its header.

use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::path::Path;

use chrono::LocalResult;
use chrono::NaiveDate;
use chrono::TimeZone;
use filetime::FileTime;

use crate::ExtractConfig;
use crate::ExtractionError;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::report::UnpackReport;
use crate::types::SafePath;
use crate::types::StagingArea;

use super::common;
use super::legacy::recover_entry_name;
use super::traits::ArchiveFormat;

/// ZIP archive handler.
///
/// # Examples
///
/// ```no_run
/// use unnest_core::ExtractConfig;
/// use unnest_core::formats::ArchiveFormat;
/// use unnest_core::formats::ZipArchive;
/// use unnest_core::types::StagingArea;
///
/// # fn main() -> Result<(), unnest_core::ExtractionError> {
/// let staging = StagingArea::new(None)?;
/// let mut archive = ZipArchive::open("photos.zip".as_ref())?;
/// let report = archive.extract(&staging, &ExtractConfig::default())?;
/// println!("Extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
pub struct ZipArchive<R: Read + Seek> {
    inner: zip::ZipArchive<R>,
}

impl ZipArchive<BufReader<File>> {
    /// Opens the ZIP file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be opened and
    /// `InvalidArchive` if its central directory cannot be read.
    pub fn open(path: &Path) -> Result<Self> {
        Self::new(BufReader::new(File::open(path)?))
    }
}

impl<R: Read + Seek> ZipArchive<R> {
    /// Reads the central directory from `source`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArchive` if the data is not a readable ZIP archive.
    pub fn new(source: R) -> Result<Self> {
        let inner = zip::ZipArchive::new(source).map_err(|e| {
            ExtractionError::InvalidArchive(format!("failed to open ZIP archive: {e}"))
        })?;
        Ok(Self { inner })
    }
}

impl<R: Read + Seek> ArchiveFormat for ZipArchive<R> {
    fn extract(&mut self, staging: &StagingArea, config: &ExtractConfig) -> Result<UnpackReport> {
        let mut report = UnpackReport::new();
        let mut buffer = CopyBuffer::new();

        for index in 0..self.inner.len() {
            let mut file = self.inner.by_index(index).map_err(|e| {
                ExtractionError::InvalidArchive(format!("failed to read entry {index}: {e}"))
            })?;

            let name = recover_entry_name(file.name_raw(), file.name()).into_owned();
            let Some(safe) = SafePath::validate(Path::new(&name), staging, config)? else {
                tracing::debug!(entry = %name, "skipping entry naming the archive root");
                continue;
            };

            if name.ends_with('/') {
                common::create_directory(&safe, staging, &mut report)?;
                continue;
            }

            let modified = file.last_modified().and_then(dos_time_to_filetime);
            let output_path = common::extract_file(
                &mut file,
                &safe,
                staging,
                &mut report,
                &mut buffer,
            )
            .map_err(|e| match e {
                // Decompression and CRC failures surface as read errors
                ExtractionError::Io(io)
                    if matches!(
                        io.kind(),
                        std::io::ErrorKind::InvalidData | std::io::ErrorKind::UnexpectedEof
                    ) =>
                {
                    ExtractionError::InvalidArchive(format!("corrupt entry {name}: {io}"))
                }
                other => other,
            })?;

            if let Some(time) = modified {
                filetime::set_file_times(&output_path, time, time)?;
            } else {
                tracing::debug!(entry = %name, "no valid timestamp, keeping write time");
            }
        }

        Ok(report)
    }

    fn format_name(&self) -> &'static str {
        "zip"
    }
}

/// Converts a DOS date/time, read as local wall-clock time, to a file time.
///
/// An ambiguous local time (DST fold) resolves to the earliest instant; a
/// non-existent one (DST gap) is read as UTC. Returns `None` for fields that
/// do not form a calendar date.
#[must_use]
pub fn dos_time_to_filetime(time: zip::DateTime) -> Option<FileTime> {
    let naive = NaiveDate::from_ymd_opt(
        i32::from(time.year()),
        u32::from(time.month()),
        u32::from(time.day()),
    )?
    .and_hms_opt(
        u32::from(time.hour()),
        u32::from(time.minute()),
        u32::from(time.second()),
    )?;

    let timestamp = match chrono::Local.from_local_datetime(&naive) {
        LocalResult::Single(local) => local.timestamp(),
        LocalResult::Ambiguous(earliest, _) => earliest.timestamp(),
        LocalResult::None => naive.and_utc().timestamp(),
    };

    Some(FileTime::from_unix_time(timestamp, 0))
}
