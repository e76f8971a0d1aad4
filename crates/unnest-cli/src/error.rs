//! Error conversion utilities for CLI.
//!
//! Converts unnest-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.
//!
//! Only run-level failures reach this point. Per-archive failures are
//! reported through the log stream and never abort the command.

use anyhow::anyhow;
use std::path::Path;
use unnest_core::ExtractionError;

/// Converts `ExtractionError` to user-friendly anyhow error with context
pub fn convert_extraction_error(err: ExtractionError, path: &Path) -> anyhow::Error {
    match err {
        ExtractionError::Io(io_err) => {
            anyhow!("I/O error while processing '{}': {}", path.display(), io_err)
        }
        ExtractionError::RunInProgress => {
            anyhow!(
                "An extraction is already running for '{}'\n\
                 HINT: Wait for it to finish before starting another.",
                path.display()
            )
        }
        ExtractionError::WorkerPanicked => {
            anyhow!(
                "The extraction worker stopped unexpectedly while processing '{}'",
                path.display()
            )
        }
        _ => anyhow::Error::from(err).context(format!("Error processing '{}'", path.display())),
    }
}

/// Adds path context to an error from the extraction engine
pub fn add_path_context<T>(result: Result<T, ExtractionError>, path: &Path) -> anyhow::Result<T> {
    result.map_err(|e| convert_extraction_error(e, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_convert_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let converted = convert_extraction_error(ExtractionError::Io(io_err), Path::new("data"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn test_convert_run_in_progress() {
        let converted =
            convert_extraction_error(ExtractionError::RunInProgress, Path::new("downloads"));
        assert!(format!("{converted}").contains("already running"));
    }

    #[test]
    fn test_convert_worker_panicked() {
        let converted =
            convert_extraction_error(ExtractionError::WorkerPanicked, Path::new("downloads"));
        let msg = format!("{converted}");
        assert!(msg.contains("stopped unexpectedly"));
        assert!(msg.contains("downloads"));
    }

    #[test]
    fn test_fallback_keeps_source() {
        let err = ExtractionError::SecurityViolation {
            reason: "path contains null bytes".into(),
        };
        let converted = convert_extraction_error(err, Path::new("odd.tar"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("odd.tar"));
        assert!(msg.contains("null bytes"));
    }
}
