//! Extraction drivers.
//!
//! [`ExtractionEngine`] handles one file, [`RecursiveScanner`] repeats the
//! engine over a tree until nothing is left to extract, and
//! [`ExtractionWorker`] runs a scanner on a background thread.

pub mod engine;
pub mod scanner;
pub mod worker;

pub use engine::ExtractionEngine;
pub use scanner::RecursiveScanner;
pub use scanner::resolve_scan_root;
pub use worker::CancelToken;
pub use worker::ExtractionWorker;
pub use worker::RunHandle;
