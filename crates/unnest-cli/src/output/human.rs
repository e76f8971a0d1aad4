//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use std::time::Duration;
use unnest_core::LogCategory;
use unnest_core::LogEvent;
use unnest_core::ScanReport;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn render_event(&self, event: &LogEvent) -> String {
        let message = &event.message;
        if self.use_colors {
            match event.category {
                LogCategory::Info => message.clone(),
                LogCategory::Success => format!("{} {message}", style("✓").green().bold()),
                LogCategory::Warning => format!("{} {message}", style("⚠").yellow().bold()),
                LogCategory::Error => format!("{} {}", style("✗").red().bold(), style(message).red()),
                LogCategory::Path => style(message).cyan().to_string(),
            }
        } else {
            match event.category {
                LogCategory::Warning => format!("WARNING: {message}"),
                LogCategory::Error => format!("ERROR: {message}"),
                LogCategory::Info | LogCategory::Success | LogCategory::Path => message.clone(),
            }
        }
    }

    fn format_duration(duration: Duration) -> String {
        let secs = duration.as_secs();
        if secs >= 3600 {
            format!("{}h{}m", secs / 3600, (secs % 3600) / 60)
        } else if secs >= 60 {
            format!("{}m{}s", secs / 60, secs % 60)
        } else {
            format!("{:.1}s", duration.as_secs_f64())
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();

        for (count, c) in s.chars().rev().enumerate() {
            if count > 0 && count % 3 == 0 {
                result.push(',');
            }
            result.push(c);
        }

        result.chars().rev().collect()
    }

    fn summary_lines(&self, report: &ScanReport) -> Vec<String> {
        let mut lines = vec![
            format!(
                "  Archives extracted: {}",
                Self::format_number(report.extracted)
            ),
            format!("  Failed: {}", Self::format_number(report.failed)),
            format!("  Passes: {}", report.pass_count()),
        ];

        if self.verbose {
            lines.push(format!(
                "  Already extracted: {}",
                Self::format_number(report.skipped_existing)
            ));
            lines.push(format!(
                "  Other files: {}",
                Self::format_number(report.skipped_unsupported)
            ));
            lines.push(format!(
                "  Sources deleted: {}",
                Self::format_number(report.sources_deleted)
            ));
            lines.push(format!(
                "  Duration: {}",
                Self::format_duration(report.duration)
            ));
        }

        lines
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_event(&self, event: &LogEvent) {
        if self.quiet && event.category != LogCategory::Error {
            return;
        }
        let _ = self.term.write_line(&self.render_event(event));
    }

    fn format_scan_result(&self, report: &ScanReport, _events: &[LogEvent]) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let headline = if report.reached_fixpoint() {
            "Extraction complete"
        } else {
            "Extraction stopped early"
        };

        let _ = self.term.write_line("");
        if self.use_colors {
            let mark = if report.failed == 0 {
                style("✓").green().bold()
            } else {
                style("⚠").yellow().bold()
            };
            let _ = self.term.write_line(&format!("{mark} {headline}"));
        } else {
            let _ = self.term.write_line(headline);
        }

        for line in self.summary_lines(report) {
            let _ = self.term.write_line(&line);
        }

        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        let term = Term::stderr();
        if self.use_colors {
            let _ = term.write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = term.write_line(&format!("ERROR: {error:?}"));
        }
    }

    fn shows_progress(&self) -> bool {
        !self.quiet
    }
}
