//! Spinner shown while a recursive run is in progress.

use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use std::time::Duration;
use unnest_core::LogCategory;
use unnest_core::LogEvent;

/// Terminal spinner tracking the current pass and archive.
///
/// Printed lines go through [`ScanProgress::suspend`] so the spinner is
/// redrawn below them. Cleared on drop.
pub struct ScanProgress {
    bar: ProgressBar,
    extracted: usize,
}

impl ScanProgress {
    /// Creates and starts a spinner.
    #[must_use]
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        // Template: "⠋ [3 extracted] Pass 2: 1 archive(s) extracted"
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} [{pos} extracted] {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message("Scanning");
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar, extracted: 0 }
    }

    /// Checks if we should show progress (TTY detection).
    #[must_use]
    pub fn should_show() -> bool {
        Term::stdout().is_term()
    }

    /// Updates the spinner from one log event.
    pub fn observe(&mut self, event: &LogEvent) {
        match event.category {
            LogCategory::Success if event.message.starts_with("Extracted") => {
                self.extracted += 1;
                self.bar.set_position(self.extracted as u64);
            }
            LogCategory::Path | LogCategory::Info if !event.message.starts_with(' ') => {
                self.bar.set_message(event.message.clone());
            }
            _ => {}
        }
    }

    /// Runs `f` with the spinner hidden.
    pub fn suspend<F: FnOnce()>(&self, f: F) {
        self.bar.suspend(f);
    }

    /// Number of extractions observed so far.
    #[must_use]
    pub const fn extracted(&self) -> usize {
        self.extracted
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ScanProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}
