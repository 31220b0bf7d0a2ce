//! Guards that run on every exit path of an invocation.

use crate::context::{ContextualRecord, RuntimeContext};
use crate::core::SharedRecord;
use std::sync::Arc;
use std::time::Instant;

/// Writes the exit trace line when dropped, and logs how long the
/// invocation ran.
pub(crate) struct ExitTrace {
    handler: String,
    context: Arc<RuntimeContext>,
    started: Instant,
}

impl ExitTrace {
    pub(crate) fn new(handler: &str, context: Arc<RuntimeContext>) -> Self {
        Self {
            handler: handler.to_string(),
            context,
            started: Instant::now(),
        }
    }
}

impl Drop for ExitTrace {
    fn drop(&mut self) {
        let correlation_id = self.context.metadata().correlation_id;
        self.context.trace(&format!(
            "Exiting {}.execute() Correlation Id: {}",
            self.handler, correlation_id
        ));
        tracing::info!(
            handler = %self.handler,
            %correlation_id,
            duration_ms = self.started.elapsed().as_secs_f64() * 1000.0,
            "Invocation finished"
        );
    }
}

/// Detaches the record's context when dropped.
pub(crate) struct Attachment {
    record: SharedRecord,
}

impl Attachment {
    pub(crate) fn new(record: SharedRecord) -> Self {
        Self { record }
    }
}

impl Drop for Attachment {
    fn drop(&mut self) {
        self.record.release_context();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::InvocationMetadata;
    use crate::core::Record;
    use crate::observability::CollectingTraceSink;
    use crate::testing::InMemoryDataAccess;
    use uuid::Uuid;

    fn context(sink: &Arc<CollectingTraceSink>) -> Arc<RuntimeContext> {
        Arc::new(RuntimeContext::new(
            Arc::new(InMemoryDataAccess::new()),
            sink.clone(),
            InvocationMetadata::new("Update", "account", Uuid::new_v4()),
        ))
    }

    #[test]
    fn test_exit_trace_on_drop() {
        let sink = Arc::new(CollectingTraceSink::new());
        let ctx = context(&sink);
        let correlation_id = ctx.metadata().correlation_id;

        {
            let _exit = ExitTrace::new("AccountHandler", ctx);
            assert!(sink.is_empty());
        }

        assert_eq!(
            sink.lines(),
            vec![format!("Exiting AccountHandler.execute() Correlation Id: {correlation_id}")]
        );
    }

    #[test]
    fn test_exit_trace_on_panic_unwind() {
        let sink = Arc::new(CollectingTraceSink::new());
        let ctx = context(&sink);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _exit = ExitTrace::new("AccountHandler", ctx);
            panic!("rule bug");
        }));

        assert!(result.is_err());
        assert_eq!(sink.lines_starting_with("Exiting").len(), 1);
    }

    #[test]
    fn test_attachment_releases_context() {
        let sink = Arc::new(CollectingTraceSink::new());
        let record = SharedRecord::new(Record::new("account"));
        record.use_context(context(&sink));

        {
            let _attachment = Attachment::new(record.clone());
            assert!(record.has_context());
        }

        assert!(!record.has_context());
    }
}
