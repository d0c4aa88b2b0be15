//! Method-call logging.
//!
//! [`logged`] and [`logged_async`] run a call between two timestamped lines.
//! The `#[logged]` attribute rewrites a function body into one of them, so the
//! function keeps its exact signature and receiver.
//!
//! ```
//! use garnish::logging::{logged, MemorySink};
//!
//! let sink = MemorySink::new();
//! let repos = logged(&sink, || vec!["garnish"]);
//!
//! assert_eq!(repos, vec!["garnish"]);
//! assert_eq!(sink.lines().len(), 2);
//! ```
//!
//! A panic inside the call unwinds past the wrapper, so the finish line is
//! only written for calls that return.

use chrono::{SecondsFormat, Utc};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

pub const START_PREFIX: &str = "Calling method at";
pub const FINISH_PREFIX: &str = "Method finished at";

/// Destination for the wrapper's lines
pub trait LogSink {
    fn write_line(&self, line: &str);
}

/// Writes each line to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stdout;

impl LogSink for Stdout {
    fn write_line(&self, line: &str) {
        println!("{line}");
    }
}

/// Keeps lines in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LogSink for MemorySink {
    fn write_line(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

impl<S: LogSink + ?Sized> LogSink for &S {
    fn write_line(&self, line: &str) {
        (**self).write_line(line)
    }
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn write_line(&self, line: &str) {
        (**self).write_line(line)
    }
}

/// Current UTC time as ISO-8601 with milliseconds, e.g. `2024-05-01T12:00:00.000Z`.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn logged<S, R, F>(sink: &S, call: F) -> R
where
    S: LogSink + ?Sized,
    F: FnOnce() -> R,
{
    sink.write_line(&format!("{START_PREFIX} {}", timestamp()));
    let result = call();
    sink.write_line(&format!("{FINISH_PREFIX} {}", timestamp()));
    result
}

pub async fn logged_async<S, F>(sink: &S, call: F) -> F::Output
where
    S: LogSink + ?Sized,
    F: Future,
{
    sink.write_line(&format!("{START_PREFIX} {}", timestamp()));
    let result = call.await;
    sink.write_line(&format!("{FINISH_PREFIX} {}", timestamp()));
    result
}
