//! Output formatter trait for CLI results.

use anyhow::Result;
use serde::Serialize;
use unnest_core::LogEvent;
use unnest_core::ScanReport;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Render one log event as it arrives from the worker
    fn format_event(&self, event: &LogEvent);

    /// Format the result of a recursive run, with every event it produced
    fn format_scan_result(&self, report: &ScanReport, events: &[LogEvent]) -> Result<()>;

    /// Format error message
    fn format_error(&self, error: &anyhow::Error);

    /// Whether a progress spinner may be drawn alongside this output
    fn shows_progress(&self) -> bool;
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }
}

impl JsonOutput<()> {
    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}
