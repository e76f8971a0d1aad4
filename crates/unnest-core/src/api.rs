//! High-level public API for recursive archive extraction.

use std::path::Path;

use crate::ExtractConfig;
use crate::Result;
use crate::extraction::ExtractionEngine;
use crate::extraction::RecursiveScanner;
use crate::logging::LogSink;
use crate::report::ExtractionOutcome;
use crate::report::ScanReport;

/// Extracts one archive into the sibling directory named after it.
///
/// `dir/photos.tar.gz` is unpacked into `dir/photos/`. If the archive holds a
/// single top-level folder, that folder's content is placed there directly.
///
/// # Arguments
///
/// * `archive_path` - Path to the archive file
/// * `sink` - Receives user-facing log lines
/// * `config` - Extraction configuration
///
/// # Examples
///
/// ```no_run
/// use unnest_core::ExtractConfig;
/// use unnest_core::ExtractionOutcome;
/// use unnest_core::NoopSink;
/// use unnest_core::extract_archive;
///
/// match extract_archive("downloads/photos.zip", &NoopSink, &ExtractConfig::default()) {
///     ExtractionOutcome::Extracted { target, .. } => println!("-> {}", target.display()),
///     ExtractionOutcome::Failed(err) => eprintln!("failed: {err}"),
///     _ => {}
/// }
/// ```
pub fn extract_archive<P: AsRef<Path>>(
    archive_path: P,
    sink: &dyn LogSink,
    config: &ExtractConfig,
) -> ExtractionOutcome {
    ExtractionEngine::new(config.clone()).extract(archive_path.as_ref(), sink)
}

/// Extracts every archive under `root`, including archives found inside
/// extracted content, until a pass extracts nothing.
///
/// # Errors
///
/// Returns an error only if `root` cannot be read. Failures of individual
/// archives are logged and counted in the report.
///
/// # Examples
///
/// ```no_run
/// use unnest_core::ExtractConfig;
/// use unnest_core::LogCategory;
/// use unnest_core::recursive_extract;
///
/// # fn main() -> Result<(), unnest_core::ExtractionError> {
/// let print = |message: &str, category: LogCategory| println!("[{category}] {message}");
/// let report = recursive_extract("downloads", &print, &ExtractConfig::default())?;
/// println!("{} archive(s) in {} pass(es)", report.extracted, report.pass_count());
/// # Ok(())
/// # }
/// ```
pub fn recursive_extract<P: AsRef<Path>>(
    root: P,
    sink: &dyn LogSink,
    config: &ExtractConfig,
) -> Result<ScanReport> {
    RecursiveScanner::new(config.clone()).run(root.as_ref(), sink)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::logging::NoopSink;
    use crate::test_utils::create_test_zip;
    use tempfile::TempDir;

    #[test]
    fn test_extract_archive() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.zip");
        std::fs::write(&path, create_test_zip(vec![("f.txt", b"f")])).unwrap();

        let outcome = extract_archive(&path, &NoopSink, &ExtractConfig::default());
        assert!(outcome.is_extracted());
        assert!(temp.path().join("a/f.txt").is_file());
    }

    #[test]
    fn test_recursive_extract() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("a.zip"),
            create_test_zip(vec![("f.txt", b"f")]),
        )
        .unwrap();

        let report = recursive_extract(temp.path(), &NoopSink, &ExtractConfig::default()).unwrap();
        assert_eq!(report.extracted, 1);
        assert_eq!(report.pass_count(), 2);
    }
}
