//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use unnest_core::LogEvent;
use unnest_core::ScanReport;

/// Writes a single JSON document once the run has finished.
pub struct JsonFormatter;

#[derive(Debug, Serialize)]
struct PassOutput {
    pass: usize,
    files_seen: usize,
    extracted: usize,
    failed: usize,
}

#[derive(Debug, Serialize)]
struct EventOutput<'a> {
    category: &'static str,
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct ScanOutput<'a> {
    root: String,
    extracted: usize,
    failed: usize,
    skipped_existing: usize,
    skipped_unsupported: usize,
    sources_deleted: usize,
    completed: bool,
    cancelled: bool,
    pass_limit_reached: bool,
    duration_ms: u128,
    passes: Vec<PassOutput>,
    events: Vec<EventOutput<'a>>,
}

impl<'a> ScanOutput<'a> {
    fn new(report: &ScanReport, events: &'a [LogEvent]) -> Self {
        Self {
            root: report.root.display().to_string(),
            extracted: report.extracted,
            failed: report.failed,
            skipped_existing: report.skipped_existing,
            skipped_unsupported: report.skipped_unsupported,
            sources_deleted: report.sources_deleted,
            completed: report.reached_fixpoint(),
            cancelled: report.cancelled,
            pass_limit_reached: report.pass_limit_reached,
            duration_ms: report.duration.as_millis(),
            passes: report
                .passes
                .iter()
                .enumerate()
                .map(|(i, pass)| PassOutput {
                    pass: i + 1,
                    files_seen: pass.files_seen,
                    extracted: pass.extracted,
                    failed: pass.failed,
                })
                .collect(),
            events: events
                .iter()
                .map(|event| EventOutput {
                    category: event.category.as_str(),
                    message: &event.message,
                })
                .collect(),
        }
    }
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_event(&self, _event: &LogEvent) {
        // Events are part of the final document
    }

    fn format_scan_result(&self, report: &ScanReport, events: &[LogEvent]) -> Result<()> {
        let output = JsonOutput::success("extract", ScanOutput::new(report, events));
        Self::output(&output)
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::<()>::error("extract", format!("{error:#}"));
        let _ = Self::output(&output);
    }

    fn shows_progress(&self) -> bool {
        false
    }
}
