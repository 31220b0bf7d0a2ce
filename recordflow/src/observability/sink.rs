//! Trace sink trait and implementations.

use tracing::{debug, info, Level};

/// Append-only destination for an invocation's trace lines.
///
/// Writing is fire-and-forget: implementations never report failure back
/// to the caller.
pub trait TraceSink: Send + Sync {
    /// Appends one trace line.
    fn write(&self, message: &str);
}

/// A sink that discards every line.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpTraceSink;

impl TraceSink for NoOpTraceSink {
    fn write(&self, _message: &str) {}
}

/// A sink that forwards trace lines to the `tracing` framework.
#[derive(Debug, Clone)]
pub struct LoggingTraceSink {
    level: Level,
}

impl Default for LoggingTraceSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingTraceSink {
    /// Creates a logging sink with the specified level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging sink.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }
}

impl TraceSink for LoggingTraceSink {
    fn write(&self, message: &str) {
        if self.level == Level::DEBUG {
            debug!(target: "recordflow::trace", "{}", message);
        } else {
            info!(target: "recordflow::trace", "{}", message);
        }
    }
}

/// A sink that keeps every line in memory, for tests.
#[derive(Debug, Default)]
pub struct CollectingTraceSink {
    lines: parking_lot::RwLock<Vec<String>>,
}

impl CollectingTraceSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected lines in write order.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.read().clone()
    }

    /// Returns the number of collected lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.read().len()
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.read().is_empty()
    }

    /// Clears all collected lines.
    pub fn clear(&self) {
        self.lines.write().clear();
    }

    /// Returns lines starting with a prefix.
    #[must_use]
    pub fn lines_starting_with(&self, prefix: &str) -> Vec<String> {
        self.lines
            .read()
            .iter()
            .filter(|line| line.starts_with(prefix))
            .cloned()
            .collect()
    }
}

impl TraceSink for CollectingTraceSink {
    fn write(&self, message: &str) {
        self.lines.write().push(message.to_string());
    }
}
