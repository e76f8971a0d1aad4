//! Fixpoint scan over a directory tree.

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use walkdir::WalkDir;

use crate::ExtractConfig;
use crate::Result;
use crate::logging::LogCategory;
use crate::logging::LogSink;
use crate::report::PassSummary;
use crate::report::ScanReport;

use super::engine::ExtractionEngine;
use super::worker::CancelToken;

/// Repeatedly walks a tree and extracts every archive found, until a pass
/// extracts nothing.
///
/// Archives unpacked by one pass are picked up by the next, so nested
/// archives are handled to any depth. Each pass re-walks the tree from
/// scratch.
#[derive(Debug, Clone, Default)]
pub struct RecursiveScanner {
    engine: ExtractionEngine,
    cancel: CancelToken,
}

impl RecursiveScanner {
    /// Creates a scanner with the given configuration.
    #[must_use]
    pub fn new(config: ExtractConfig) -> Self {
        Self {
            engine: ExtractionEngine::new(config),
            cancel: CancelToken::new(),
        }
    }

    /// Uses `token` to stop the run early.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Runs passes over `root` until one extracts nothing, the pass limit is
    /// reached, or the run is cancelled.
    ///
    /// Per-archive failures are logged and counted, never returned.
    ///
    /// # Errors
    ///
    /// Returns an error only if `root` cannot be read.
    pub fn run(&self, root: &Path, sink: &dyn LogSink) -> Result<ScanReport> {
        let started = Instant::now();
        fs::read_dir(root)?;

        let mut report = ScanReport::new(root.to_path_buf());
        sink.log(
            &format!("Scanning: {}", root.display()),
            LogCategory::Path,
        );

        let max_passes = self.engine.config().max_passes;

        loop {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            if max_passes.is_some_and(|max| report.pass_count() >= max) {
                report.pass_limit_reached = true;
                break;
            }

            let number = report.pass_count() + 1;
            let mut pass = PassSummary::default();
            tracing::debug!(pass = number, root = %root.display(), "starting pass");

            for file in collect_files(root, sink) {
                if self.cancel.is_cancelled() {
                    report.cancelled = true;
                    break;
                }
                let outcome = self.engine.extract(&file, sink);
                report.record(&mut pass, &outcome);
            }

            report.passes.push(pass);
            sink.log(
                &format!("Pass {number}: {} archive(s) extracted", pass.extracted),
                LogCategory::Info,
            );

            if report.cancelled || pass.extracted == 0 {
                break;
            }
        }

        report.duration = started.elapsed();

        if report.cancelled {
            sink.log(
                &format!("Cancelled after {} pass(es)", report.pass_count()),
                LogCategory::Warning,
            );
        } else if report.pass_limit_reached {
            sink.log(
                &format!(
                    "Stopped at the limit of {} pass(es); archives may remain",
                    report.pass_count()
                ),
                LogCategory::Warning,
            );
        } else {
            sink.log("All archives extracted", LogCategory::Success);
        }

        Ok(report)
    }
}

/// Lists every regular file under `root`, sorted by name within each
/// directory. Symlinks are not followed; unreadable entries are logged and
/// skipped.
fn collect_files(root: &Path, sink: &dyn LogSink) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(error = %err, "walk error");
                let path = err
                    .path()
                    .map_or_else(|| root.display().to_string(), |p| p.display().to_string());
                sink.log(
                    &format!("Skipped unreadable path: {path} ({err})"),
                    LogCategory::Warning,
                );
            }
        }
    }
    files
}

/// Returns the directory to scan for a user-supplied path.
///
/// A file selects its parent directory, a directory is used as-is.
///
/// # Errors
///
/// Returns an I/O error if `input` does not exist.
pub fn resolve_scan_root(input: &Path) -> Result<PathBuf> {
    let metadata = fs::metadata(input)?;
    if metadata.is_dir() {
        return Ok(input.to_path_buf());
    }

    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(parent.to_path_buf()),
        _ => Ok(PathBuf::from(".")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::logging::MemorySink;
    use crate::test_utils::create_test_zip;
    use tempfile::TempDir;

    #[test]
    fn test_empty_tree_single_pass() {
        let temp = TempDir::new().unwrap();
        let sink = MemorySink::new();

        let report = RecursiveScanner::default().run(temp.path(), &sink).unwrap();

        assert_eq!(report.passes, vec![PassSummary::default()]);
        assert!(report.reached_fixpoint());
        assert_eq!(
            sink.messages(LogCategory::Path),
            vec![format!("Scanning: {}", temp.path().display())]
        );
        assert_eq!(
            sink.messages(LogCategory::Info),
            vec!["Pass 1: 0 archive(s) extracted".to_string()]
        );
        assert_eq!(
            sink.messages(LogCategory::Success),
            vec!["All archives extracted".to_string()]
        );
    }

    #[test]
    fn test_missing_root_is_error() {
        let temp = TempDir::new().unwrap();
        let result = RecursiveScanner::default().run(&temp.path().join("nope"), &MemorySink::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_collect_files_sorted_regular_only() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join("b.txt"), b"").unwrap();
        fs::write(temp.path().join("a.txt"), b"").unwrap();
        fs::write(temp.path().join("sub/c.txt"), b"").unwrap();

        let files = collect_files(temp.path(), &MemorySink::new());
        let names: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(temp.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.txt"),
                PathBuf::from("b.txt"),
                PathBuf::from("sub/c.txt")
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_archives_not_followed() {
        let outside = TempDir::new().unwrap();
        fs::write(
            outside.path().join("far.zip"),
            create_test_zip(vec![("x.txt", b"x")]),
        )
        .unwrap();
        let temp = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), temp.path().join("linked")).unwrap();

        let report = RecursiveScanner::default().run(temp.path(), &MemorySink::new()).unwrap();
        assert_eq!(report.extracted, 0);
        assert!(!outside.path().join("far").exists());
    }

    #[test]
    fn test_pass_limit() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("one.zip"),
            create_test_zip(vec![("x.txt", b"x")]),
        )
        .unwrap();
        let sink = MemorySink::new();

        let scanner = RecursiveScanner::new(ExtractConfig::default().with_max_passes(Some(1)));
        let report = scanner.run(temp.path(), &sink).unwrap();

        assert_eq!(report.pass_count(), 1);
        assert!(report.pass_limit_reached);
        assert!(!report.reached_fixpoint());
        assert_eq!(sink.messages(LogCategory::Warning).len(), 1);
        assert!(sink.messages(LogCategory::Success).iter().all(|m| m.starts_with("Extracted")));
    }

    #[test]
    fn test_cancelled_before_start() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("one.zip"),
            create_test_zip(vec![("x.txt", b"x")]),
        )
        .unwrap();
        let token = CancelToken::new();
        token.cancel();
        let sink = MemorySink::new();

        let report = RecursiveScanner::default()
            .with_cancel_token(token)
            .run(temp.path(), &sink)
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.pass_count(), 0);
        assert!(!temp.path().join("one").exists());
        assert_eq!(
            sink.messages(LogCategory::Warning),
            vec!["Cancelled after 0 pass(es)".to_string()]
        );
    }

    #[test]
    fn test_resolve_scan_root() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.zip");
        fs::write(&file, b"").unwrap();

        assert_eq!(resolve_scan_root(temp.path()).unwrap(), temp.path());
        assert_eq!(resolve_scan_root(&file).unwrap(), temp.path());
        assert!(resolve_scan_root(&temp.path().join("missing")).is_err());
    }
}
