//! Outcomes and statistics of extraction operations.

use std::path::PathBuf;
use std::time::Duration;

use crate::ExtractionError;

/// Statistics of unpacking one archive into its staging area.
#[derive(Debug, Clone, Default)]
pub struct UnpackReport {
    /// Number of regular files written.
    pub files_extracted: usize,

    /// Number of directory entries created.
    pub directories_created: usize,

    /// Number of symlinks and hardlinks created.
    pub links_created: usize,

    /// Total bytes written to disk.
    pub bytes_written: u64,

    /// Number of entries skipped (disallowed links, special files).
    pub entries_skipped: usize,

    /// Warnings generated while unpacking.
    pub warnings: Vec<String>,
}

impl UnpackReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a skipped entry with the reason it was skipped.
    pub fn skip(&mut self, message: String) {
        self.entries_skipped += 1;
        self.warnings.push(message);
    }

    /// Returns total number of items created.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_extracted + self.directories_created + self.links_created
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Result of attempting to extract one file.
#[derive(Debug)]
pub enum ExtractionOutcome {
    /// The archive was unpacked into `target`.
    Extracted {
        /// Directory that received the content.
        target: PathBuf,
        /// Whether the source archive was removed afterwards.
        source_deleted: bool,
    },
    /// The file name carries no recognized archive suffix.
    SkippedUnsupported,
    /// The target directory already exists.
    SkippedExists,
    /// Extraction failed; the source archive is untouched unless the error is
    /// [`ExtractionError::DeletionFailed`].
    Failed(ExtractionError),
}

impl ExtractionOutcome {
    /// Returns `true` for [`ExtractionOutcome::Extracted`].
    #[must_use]
    pub const fn is_extracted(&self) -> bool {
        matches!(self, Self::Extracted { .. })
    }

    /// Returns `true` for [`ExtractionOutcome::Failed`].
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns the failure, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&ExtractionError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Per-pass statistics of a recursive run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Regular files visited in this pass.
    pub files_seen: usize,
    /// Archives extracted in this pass.
    pub extracted: usize,
    /// Archives that failed in this pass.
    pub failed: usize,
}

/// Report of a recursive extraction run.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Directory that was scanned.
    pub root: PathBuf,

    /// Completed passes, in order. The last one extracted nothing unless the
    /// run was cancelled or hit the pass limit.
    pub passes: Vec<PassSummary>,

    /// Total archives extracted.
    pub extracted: usize,

    /// Total extraction failures.
    pub failed: usize,

    /// Total files skipped because their target already existed.
    pub skipped_existing: usize,

    /// Total files skipped because they are not archives.
    pub skipped_unsupported: usize,

    /// Source archives removed after extraction.
    pub sources_deleted: usize,

    /// Whether the run was stopped by its cancellation token.
    pub cancelled: bool,

    /// Whether the run stopped at the configured pass limit.
    pub pass_limit_reached: bool,

    /// Wall-clock duration of the run.
    pub duration: Duration,
}

impl ScanReport {
    /// Creates an empty report for `root`.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            ..Self::default()
        }
    }

    /// Returns the number of passes run.
    #[must_use]
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Returns `true` if the run reached a pass with no extractions.
    #[must_use]
    pub fn reached_fixpoint(&self) -> bool {
        self.passes.last().is_some_and(|pass| pass.extracted == 0)
    }

    /// Folds one outcome into the running totals and the current pass.
    pub(crate) fn record(&mut self, pass: &mut PassSummary, outcome: &ExtractionOutcome) {
        pass.files_seen += 1;
        match outcome {
            ExtractionOutcome::Extracted { source_deleted, .. } => {
                pass.extracted += 1;
                self.extracted += 1;
                if *source_deleted {
                    self.sources_deleted += 1;
                }
            }
            ExtractionOutcome::SkippedUnsupported => self.skipped_unsupported += 1,
            ExtractionOutcome::SkippedExists => self.skipped_existing += 1,
            ExtractionOutcome::Failed(_) => {
                pass.failed += 1;
                self.failed += 1;
            }
        }
    }
}
