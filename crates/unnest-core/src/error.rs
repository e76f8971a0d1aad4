//! Error types for recursive archive extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ExtractionError`.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Errors that can occur while unpacking, relocating or scanning.
///
/// Skips are not errors: a file without a recognized suffix or whose target
/// directory already exists is reported through
/// [`ExtractionOutcome`](crate::ExtractionOutcome) instead.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive format is unsupported or unrecognized.
    #[error("unsupported archive format")]
    UnsupportedFormat,

    /// Archive is corrupted, truncated or uses an unsupported feature.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// Entry path would resolve outside the staging area.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending entry path.
        path: PathBuf,
    },

    /// Symlink target points outside the staging area.
    #[error("symlink target outside extraction directory: {path}")]
    SymlinkEscape {
        /// The symlink path.
        path: PathBuf,
    },

    /// Hardlink target is not inside the staging area.
    #[error("hardlink target outside extraction directory: {path}")]
    HardlinkEscape {
        /// The hardlink path.
        path: PathBuf,
    },

    /// Entry rejected by the path policy (NUL bytes, excessive depth).
    #[error("operation denied by security policy: {reason}")]
    SecurityViolation {
        /// Reason for the violation.
        reason: String,
    },

    /// The source archive could not be removed after a successful
    /// extraction. The target directory is already populated.
    #[error("extracted, but failed to delete source archive {path}: {source}")]
    DeletionFailed {
        /// The archive that could not be removed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A recursive extraction is already running on this worker.
    #[error("an extraction run is already in progress")]
    RunInProgress,

    /// The background worker panicked before producing a report.
    #[error("extraction worker panicked")]
    WorkerPanicked,
}

impl ExtractionError {
    /// Returns `true` if this error represents a rejected entry path or link.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use unnest_core::ExtractionError;
    ///
    /// let err = ExtractionError::PathTraversal {
    ///     path: PathBuf::from("../etc/passwd"),
    /// };
    /// assert!(err.is_security_violation());
    ///
    /// let err = ExtractionError::InvalidArchive("truncated".into());
    /// assert!(!err.is_security_violation());
    /// ```
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(
            self,
            Self::PathTraversal { .. }
                | Self::SymlinkEscape { .. }
                | Self::HardlinkEscape { .. }
                | Self::SecurityViolation { .. }
        )
    }

    /// Returns a context string for this error, if available.
    ///
    /// # Examples
    ///
    /// ```
    /// use unnest_core::ExtractionError;
    ///
    /// let err = ExtractionError::InvalidArchive("bad header".to_string());
    /// assert_eq!(err.context(), Some("bad header"));
    ///
    /// let err = ExtractionError::UnsupportedFormat;
    /// assert_eq!(err.context(), None);
    /// ```
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::InvalidArchive(msg) => Some(msg),
            Self::SecurityViolation { reason } => Some(reason),
            _ => None,
        }
    }
}

impl From<walkdir::Error> for ExtractionError {
    fn from(err: walkdir::Error) -> Self {
        let message = err.to_string();
        err.into_io_error()
            .map_or_else(|| Self::Io(std::io::Error::other(message)), Self::Io)
    }
}

impl From<zip::result::ZipError> for ExtractionError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io) => Self::Io(io),
            other => Self::InvalidArchive(other.to_string()),
        }
    }
}
