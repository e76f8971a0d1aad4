//! Per-file extraction driver.

use std::fs;
use std::path::Path;

use crate::ExtractConfig;
use crate::ExtractionError;
use crate::Result;
use crate::flatten;
use crate::formats;
use crate::formats::ResolvedName;
use crate::formats::detect::detect_format;
use crate::logging::LogCategory;
use crate::logging::LogSink;
use crate::logging::truncate_reason;
use crate::relocate;
use crate::report::ExtractionOutcome;
use crate::report::UnpackReport;
use crate::types::StagingArea;
use crate::types::TargetDir;

/// Extracts single archives into sibling directories.
///
/// For `dir/name.ext` the content ends up in `dir/name/`, with a single
/// top-level folder unwrapped. Files without a recognized suffix and archives
/// whose target directory already exists are skipped silently.
///
/// # Examples
///
/// ```no_run
/// use unnest_core::ExtractConfig;
/// use unnest_core::MemorySink;
/// use unnest_core::extraction::ExtractionEngine;
///
/// let engine = ExtractionEngine::new(ExtractConfig::default());
/// let sink = MemorySink::new();
/// let outcome = engine.extract("downloads/photos.zip".as_ref(), &sink);
/// assert!(outcome.is_extracted());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExtractionEngine {
    config: ExtractConfig,
}

impl ExtractionEngine {
    /// Creates a new extraction engine with the given configuration.
    #[must_use]
    pub fn new(config: ExtractConfig) -> Self {
        Self { config }
    }

    /// Returns the engine's configuration.
    #[must_use]
    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Extracts `archive_path` next to itself.
    ///
    /// The source archive is only removed after its content has been fully
    /// moved into place, and only when `delete_after` is set. On failure the
    /// source is left alone and an empty target directory is removed.
    pub fn extract(&self, archive_path: &Path, sink: &dyn LogSink) -> ExtractionOutcome {
        let Ok(resolved) = detect_format(archive_path) else {
            return ExtractionOutcome::SkippedUnsupported;
        };

        let target = TargetDir::for_archive(archive_path, &resolved);
        if target.exists() {
            tracing::debug!(
                archive = %archive_path.display(),
                target = %target.as_path().display(),
                "target exists, skipping"
            );
            return ExtractionOutcome::SkippedExists;
        }

        let report = match self.unpack_into(archive_path, &resolved, &target) {
            Ok(report) => report,
            Err(err) => {
                self.log_failure("Extraction failed", archive_path, &err, sink);
                if target.remove_if_empty() {
                    tracing::debug!(target = %target.as_path().display(), "removed empty target");
                }
                return ExtractionOutcome::Failed(err);
            }
        };

        self.complete(archive_path, target, &report, sink)
    }

    /// Deletes the source if configured and reports success.
    fn complete(
        &self,
        archive_path: &Path,
        target: TargetDir,
        report: &UnpackReport,
        sink: &dyn LogSink,
    ) -> ExtractionOutcome {
        let source_deleted = if self.config.delete_after {
            if let Err(source) = fs::remove_file(archive_path) {
                let err = ExtractionError::DeletionFailed {
                    path: archive_path.to_path_buf(),
                    source,
                };
                self.log_failure("Extracted, but deletion failed", archive_path, &err, sink);
                log_warnings(report, sink);
                return ExtractionOutcome::Failed(err);
            }
            sink.log(
                &format!("Extracted and deleted: {}", archive_path.display()),
                LogCategory::Success,
            );
            true
        } else {
            sink.log(
                &format!("Extracted: {}", archive_path.display()),
                LogCategory::Success,
            );
            false
        };

        log_warnings(report, sink);
        ExtractionOutcome::Extracted {
            target: target.into_path_buf(),
            source_deleted,
        }
    }

    fn unpack_into(
        &self,
        archive_path: &Path,
        resolved: &ResolvedName,
        target: &TargetDir,
    ) -> Result<UnpackReport> {
        target.create()?;

        let staging = StagingArea::new(self.config.staging_root.as_deref())?;
        let report = formats::unpack(resolved.kind, archive_path, &staging, &self.config)?;

        let content_root = flatten::content_root(staging.path())?;
        let moved = relocate::relocate_children(&content_root, target.as_path())?;
        tracing::debug!(
            archive = %archive_path.display(),
            entries = moved,
            files = report.files_extracted,
            bytes = report.bytes_written,
            "relocated"
        );

        if let Err(e) = staging.close() {
            tracing::warn!(error = %e, "failed to remove staging area");
        }
        Ok(report)
    }

    fn log_failure(
        &self,
        headline: &str,
        archive_path: &Path,
        err: &ExtractionError,
        sink: &dyn LogSink,
    ) {
        sink.log(
            &format!("{headline}: {}", archive_path.display()),
            LogCategory::Error,
        );
        let reason = err.to_string();
        sink.log(
            &format!(
                "    Reason: {}...",
                truncate_reason(&reason, self.config.reason_limit)
            ),
            LogCategory::Info,
        );
    }
}

fn log_warnings(report: &UnpackReport, sink: &dyn LogSink) {
    for warning in &report.warnings {
        sink.log(warning, LogCategory::Warning);
    }
}
