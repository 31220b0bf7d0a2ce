//! Observability utilities.

mod logging;
mod sink;

pub use logging::{init_logging, LogFormat, DEFAULT_FILTER};
pub use sink::{CollectingTraceSink, LoggingTraceSink, NoOpTraceSink, TraceSink};
