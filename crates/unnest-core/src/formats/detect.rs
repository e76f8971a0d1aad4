//! Archive format detection from file names.

use std::ffi::OsStr;
use std::ffi::OsString;
use std::path::Path;

use crate::ExtractionError;
use crate::Result;

/// Recognized archive suffixes, in match priority order.
///
/// Matching is case-insensitive and the first suffix that matches wins.
pub const RECOGNIZED_SUFFIXES: [&str; 4] = [".tar.gz", ".tgz", ".tar", ".zip"];

/// gzip stream magic bytes.
pub(crate) const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Supported archive families.
///
/// Compression inside the TAR family is detected from content when the
/// archive is opened, so `.tar`, `.tgz` and `.tar.gz` all map to `Tar`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    /// ZIP archive.
    Zip,
    /// TAR archive, optionally gzip-compressed.
    Tar,
}

impl ArchiveKind {
    /// Returns the format name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Tar => "tar",
        }
    }
}

/// A file name split into its target name and recognized suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    /// File name with the suffix removed. Never empty.
    pub name: OsString,
    /// The suffix that matched, in its canonical lowercase form.
    pub suffix: &'static str,
    /// Archive family selected by the suffix.
    pub kind: ArchiveKind,
}

/// Strips the first recognized suffix from `file_name`.
///
/// Returns `None` when no suffix matches, or when nothing is left of the
/// name once the suffix is removed (`.zip` alone is not an archive name).
///
/// # Examples
///
/// ```
/// use unnest_core::formats::detect::ArchiveKind;
/// use unnest_core::formats::detect::resolve_archive_name;
///
/// let resolved = resolve_archive_name("Photos.TAR.GZ").unwrap();
/// assert_eq!(resolved.name, "Photos");
/// assert_eq!(resolved.kind, ArchiveKind::Tar);
///
/// assert!(resolve_archive_name("notes.txt").is_none());
/// ```
#[must_use]
pub fn resolve_archive_name(file_name: &str) -> Option<ResolvedName> {
    let (split, suffix) = split_suffix(file_name.as_bytes())?;
    Some(ResolvedName {
        name: OsString::from(&file_name[..split]),
        suffix,
        kind: kind_for_suffix(suffix),
    })
}

/// Like [`resolve_archive_name`], for names that need not be valid UTF-8.
///
/// On unix the suffix is matched against the raw bytes, so an archive whose
/// name is in a legacy encoding still resolves and keeps its exact prefix.
#[must_use]
pub fn resolve_archive_os_name(file_name: &OsStr) -> Option<ResolvedName> {
    match file_name.to_str() {
        Some(name) => resolve_archive_name(name),
        None => resolve_raw_name(file_name),
    }
}

#[cfg(unix)]
fn resolve_raw_name(file_name: &OsStr) -> Option<ResolvedName> {
    use std::os::unix::ffi::OsStrExt;

    let bytes = file_name.as_bytes();
    let (split, suffix) = split_suffix(bytes)?;
    Some(ResolvedName {
        name: OsStr::from_bytes(&bytes[..split]).to_os_string(),
        suffix,
        kind: kind_for_suffix(suffix),
    })
}

#[cfg(not(unix))]
fn resolve_raw_name(_file_name: &OsStr) -> Option<ResolvedName> {
    None
}

/// Finds where the first matching suffix starts.
///
/// Suffixes are ASCII, so the split never lands inside a UTF-8 sequence.
fn split_suffix(file_name: &[u8]) -> Option<(usize, &'static str)> {
    RECOGNIZED_SUFFIXES.iter().find_map(|&suffix| {
        let split = file_name.len().checked_sub(suffix.len())?;
        if !file_name[split..].eq_ignore_ascii_case(suffix.as_bytes()) {
            return None;
        }
        // Suffix matched but nothing precedes it; no fallback to shorter suffixes
        Some((split > 0).then_some((split, suffix)))
    })?
}

fn kind_for_suffix(suffix: &str) -> ArchiveKind {
    if suffix == ".zip" {
        ArchiveKind::Zip
    } else {
        ArchiveKind::Tar
    }
}

/// Detects the archive kind and target name of a path from its file name.
///
/// # Errors
///
/// Returns `ExtractionError::UnsupportedFormat` if the file name is missing
/// or carries no recognized suffix.
pub fn detect_format(path: &Path) -> Result<ResolvedName> {
    path.file_name()
        .and_then(resolve_archive_os_name)
        .ok_or(ExtractionError::UnsupportedFormat)
}

/// Returns `true` if the first bytes of a stream are a gzip header.
#[must_use]
pub fn is_gzip_magic(header: &[u8]) -> bool {
    header.starts_with(&GZIP_MAGIC)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_resolve_tar_gz() {
        let resolved = resolve_archive_name("archive.tar.gz").unwrap();
        assert_eq!(resolved.name, "archive");
        assert_eq!(resolved.suffix, ".tar.gz");
        assert_eq!(resolved.kind, ArchiveKind::Tar);
    }

    #[test]
    fn test_resolve_tgz() {
        let resolved = resolve_archive_name("archive.tgz").unwrap();
        assert_eq!(resolved.name, "archive");
        assert_eq!(resolved.kind, ArchiveKind::Tar);
    }

    #[test]
    fn test_resolve_tar() {
        let resolved = resolve_archive_name("backup.2024.tar").unwrap();
        assert_eq!(resolved.name, "backup.2024");
        assert_eq!(resolved.suffix, ".tar");
    }

    #[test]
    fn test_resolve_zip() {
        let resolved = resolve_archive_name("data.zip").unwrap();
        assert_eq!(resolved.name, "data");
        assert_eq!(resolved.kind, ArchiveKind::Zip);
    }

    #[test]
    fn test_resolve_case_insensitive() {
        assert_eq!(resolve_archive_name("A.ZIP").unwrap().name, "A");
        assert_eq!(resolve_archive_name("B.Tar.Gz").unwrap().name, "B");
        assert_eq!(resolve_archive_name("C.TGZ").unwrap().name, "C");
    }

    #[test]
    fn test_resolve_preserves_name_case() {
        assert_eq!(resolve_archive_name("MyFiles.Zip").unwrap().name, "MyFiles");
    }

    #[test]
    fn test_resolve_non_ascii_name() {
        let resolved = resolve_archive_name("资料.zip").unwrap();
        assert_eq!(resolved.name, "资料");
    }

    #[test]
    fn test_resolve_unsupported() {
        assert!(resolve_archive_name("archive.rar").is_none());
        assert!(resolve_archive_name("archive.gz").is_none());
        assert!(resolve_archive_name("archive.7z").is_none());
        assert!(resolve_archive_name("zip").is_none());
        assert!(resolve_archive_name("").is_none());
    }

    #[test]
    fn test_resolve_suffix_only_is_unsupported() {
        assert!(resolve_archive_name(".zip").is_none());
        assert!(resolve_archive_name(".tar.gz").is_none());
        assert!(resolve_archive_name(".TGZ").is_none());
    }

    #[test]
    fn test_resolve_first_match_wins() {
        // ".tar.gz" is tried before ".tar"
        let resolved = resolve_archive_name("x.tar.gz").unwrap();
        assert_eq!(resolved.name, "x");
        // A trailing ".tar" after ".gz" is plain tar
        let resolved = resolve_archive_name("x.gz.tar").unwrap();
        assert_eq!(resolved.name, "x.gz");
    }

    #[test]
    fn test_detect_format_path() {
        let resolved = detect_format(&PathBuf::from("/data/in/nested.tgz")).unwrap();
        assert_eq!(resolved.name, "nested");
    }

    #[test]
    fn test_detect_format_unsupported() {
        assert!(matches!(
            detect_format(&PathBuf::from("/data/readme.md")),
            Err(ExtractionError::UnsupportedFormat)
        ));
        assert!(matches!(
            detect_format(&PathBuf::from("/")),
            Err(ExtractionError::UnsupportedFormat)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_detect_format_non_utf8_name() {
        use std::os::unix::ffi::OsStrExt;

        // "中" in GBK, followed by an upper-case suffix
        let path = Path::new(OsStr::from_bytes(b"/data/\xd6\xd0.ZIP"));
        let resolved = detect_format(path).unwrap();

        assert_eq!(resolved.name.as_bytes(), b"\xd6\xd0");
        assert_eq!(resolved.suffix, ".zip");
        assert_eq!(resolved.kind, ArchiveKind::Zip);
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_os_name_suffix_only() {
        use std::os::unix::ffi::OsStrExt;

        assert!(resolve_archive_os_name(OsStr::from_bytes(b".tgz")).is_none());
        assert!(resolve_archive_os_name(OsStr::from_bytes(b"\xff.rar")).is_none());
    }

    #[test]
    fn test_gzip_magic() {
        assert!(is_gzip_magic(&[0x1f, 0x8b, 0x08]));
        assert!(!is_gzip_magic(&[0x1f]));
        assert!(!is_gzip_magic(b"ustar"));
    }
}
