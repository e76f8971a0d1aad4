//! Background execution of recursive runs.
//!
//! A front end hands the scan to [`ExtractionWorker::start`] and keeps its own
//! thread free to render log events. At most one run is active per worker.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread;
use std::thread::JoinHandle;

use crate::ExtractConfig;
use crate::ExtractionError;
use crate::Result;
use crate::logging::LogSink;
use crate::report::ScanReport;

use super::scanner::RecursiveScanner;

/// Cooperative cancellation flag shared between a run and its owner.
///
/// The scanner checks it before every pass and every file; an archive that
/// is already being extracted is finished first.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Clears the worker's active flag when the run ends, including by panic.
struct ActiveGuard(Arc<AtomicBool>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs recursive extractions on a background thread, one at a time.
///
/// # Examples
///
/// ```no_run
/// use unnest_core::ChannelSink;
/// use unnest_core::ExtractConfig;
/// use unnest_core::extraction::ExtractionWorker;
///
/// # fn main() -> Result<(), unnest_core::ExtractionError> {
/// let worker = ExtractionWorker::new();
/// let (sink, events) = ChannelSink::channel();
/// let handle = worker.start("downloads".into(), ExtractConfig::default(), sink)?;
///
/// for event in events {
///     println!("[{}] {}", event.category, event.message);
/// }
/// let report = handle.join()?;
/// println!("{} archive(s) extracted", report.extracted);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExtractionWorker {
    active: Arc<AtomicBool>,
}

impl ExtractionWorker {
    /// Creates an idle worker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while a run started by this worker is in progress.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Starts a recursive run over `root` on a new thread.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::RunInProgress` if a run is already active.
    /// The request is rejected, not queued. Returns an I/O error if the
    /// thread cannot be spawned.
    pub fn start<S>(&self, root: PathBuf, config: ExtractConfig, sink: S) -> Result<RunHandle>
    where
        S: LogSink + 'static,
    {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ExtractionError::RunInProgress);
        }

        // Dropped with the closure if spawning fails
        let guard = ActiveGuard(Arc::clone(&self.active));
        let cancel = CancelToken::new();
        let scanner = RecursiveScanner::new(config).with_cancel_token(cancel.clone());

        let thread = thread::Builder::new()
            .name("unnest-worker".into())
            .spawn(move || {
                let _guard = guard;
                scanner.run(&root, &sink)
            })?;

        Ok(RunHandle { thread, cancel })
    }
}

/// Handle to a run started by [`ExtractionWorker::start`].
#[derive(Debug)]
pub struct RunHandle {
    thread: JoinHandle<Result<ScanReport>>,
    cancel: CancelToken,
}

impl RunHandle {
    /// Requests cancellation of the run.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns a clone of the run's cancellation token.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Returns `true` once the worker thread has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Waits for the run to finish and returns its report.
    ///
    /// # Errors
    ///
    /// Returns the scanner's error, or `ExtractionError::WorkerPanicked` if
    /// the worker thread panicked.
    pub fn join(self) -> Result<ScanReport> {
        self.thread
            .join()
            .map_err(|_| ExtractionError::WorkerPanicked)?
    }
}
