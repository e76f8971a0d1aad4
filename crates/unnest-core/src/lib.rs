//! Recursive archive extraction.
//!
//! `unnest-core` finds ZIP and TAR archives (optionally gzip-compressed)
//! under a directory and unpacks each one into a sibling directory named
//! after it, repeating until archives nested inside extracted content are
//! gone too. Entry paths are validated against the staging area they are
//! written to, a single top-level folder is unwrapped, and ZIP entry names
//! written in GBK without the UTF-8 flag are recovered.
//!
//! User-facing progress goes to a [`LogSink`]; diagnostics go through
//! `tracing`.
//!
//! # Examples
//!
//! ```no_run
//! use unnest_core::ExtractConfig;
//! use unnest_core::MemorySink;
//! use unnest_core::recursive_extract;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let sink = MemorySink::new();
//! let config = ExtractConfig::default().with_delete_after(true);
//! let report = recursive_extract("/data/downloads", &sink, &config)?;
//! println!(
//!     "Extracted {} archive(s) in {} pass(es)",
//!     report.extracted,
//!     report.pass_count()
//! );
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod copy;
pub mod error;
pub mod extraction;
pub mod flatten;
pub mod formats;
pub mod logging;
pub mod relocate;
pub mod report;
pub mod types;

#[doc(hidden)]
pub mod test_utils;

// Re-export main API types
pub use api::extract_archive;
pub use api::recursive_extract;
pub use config::ExtractConfig;
pub use error::ExtractionError;
pub use error::Result;
pub use extraction::CancelToken;
pub use extraction::ExtractionEngine;
pub use extraction::ExtractionWorker;
pub use extraction::RecursiveScanner;
pub use extraction::RunHandle;
pub use extraction::resolve_scan_root;
pub use formats::ArchiveKind;
pub use formats::detect::resolve_archive_name;
pub use formats::detect::resolve_archive_os_name;
pub use logging::ChannelSink;
pub use logging::LogCategory;
pub use logging::LogEvent;
pub use logging::LogSink;
pub use logging::MemorySink;
pub use logging::NoopSink;
pub use report::ExtractionOutcome;
pub use report::PassSummary;
pub use report::ScanReport;
pub use report::UnpackReport;
