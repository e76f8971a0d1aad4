//! User-facing log events emitted by the extraction engine.
//!
//! The engine never renders anything itself. It hands each message and its
//! [`LogCategory`] to a [`LogSink`] supplied by the caller, synchronously and
//! on the thread running the extraction. Presentation layers that live on a
//! different thread use [`ChannelSink`] and drain the receiving end on their
//! own schedule.
//!
//! Developer diagnostics go through `tracing` instead and are not part of
//! this stream.

use std::fmt;
use std::sync::Mutex;
use std::sync::mpsc::Receiver;
use std::sync::mpsc::Sender;
use std::sync::mpsc::{self};

/// Category of a log event. Drives presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    /// Progress and detail lines.
    Info,
    /// An archive was extracted, or the run completed.
    Success,
    /// Something was skipped or the run stopped early.
    Warning,
    /// An archive failed to extract.
    Error,
    /// A filesystem path the run is operating on.
    Path,
}

impl LogCategory {
    /// Returns the lowercase name of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Path => "path",
        }
    }
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An owned log message with its category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Human-readable message.
    pub message: String,
    /// Presentation category.
    pub category: LogCategory,
}

impl LogEvent {
    /// Creates a new log event.
    pub fn new(message: impl Into<String>, category: LogCategory) -> Self {
        Self {
            message: message.into(),
            category,
        }
    }
}

/// Receiver of user-facing log events.
///
/// Implementations must not block the caller for long: the engine calls
/// `log` inline between filesystem operations. The trait requires
/// `Send + Sync` so a sink can be shared with a background worker.
///
/// # Examples
///
/// ```
/// use unnest_core::LogCategory;
/// use unnest_core::LogSink;
///
/// let sink = |message: &str, category: LogCategory| {
///     println!("[{category}] {message}");
/// };
/// sink.log("hello", LogCategory::Info);
/// ```
pub trait LogSink: Send + Sync {
    /// Records one message.
    fn log(&self, message: &str, category: LogCategory);
}

impl<F> LogSink for F
where
    F: Fn(&str, LogCategory) + Send + Sync,
{
    fn log(&self, message: &str, category: LogCategory) {
        self(message, category);
    }
}

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn log(&self, _message: &str, _category: LogCategory) {}
}

/// Sink that keeps every event in memory, in order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<LogEvent>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<LogEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Returns the messages recorded under `category`.
    #[must_use]
    pub fn messages(&self, category: LogCategory) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|event| event.category == category)
            .map(|event| event.message)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn log(&self, message: &str, category: LogCategory) {
        if let Ok(mut events) = self.events.lock() {
            events.push(LogEvent::new(message, category));
        }
    }
}

/// Sink that forwards events over an unbounded channel.
///
/// Sending never blocks. Events sent after the receiver has been dropped are
/// discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<LogEvent>,
}

impl ChannelSink {
    /// Creates a sink and the receiver that drains it.
    #[must_use]
    pub fn channel() -> (Self, Receiver<LogEvent>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }

    /// Wraps an existing sender.
    #[must_use]
    pub fn new(sender: Sender<LogEvent>) -> Self {
        Self { sender }
    }
}

impl LogSink for ChannelSink {
    fn log(&self, message: &str, category: LogCategory) {
        let _ = self.sender.send(LogEvent::new(message, category));
    }
}

/// Truncates a failure reason to at most `limit` characters.
///
/// The cut always lands on a character boundary.
#[must_use]
pub fn truncate_reason(reason: &str, limit: usize) -> &str {
    reason
        .char_indices()
        .nth(limit)
        .map_or(reason, |(index, _)| &reason[..index])
}
