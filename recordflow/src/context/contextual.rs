//! Attaching runtime contexts to records.
//!
//! A [`SharedRecord`] carries no service fields. Instead, the invocation
//! attaches its [`RuntimeContext`] to the record's identity in a
//! process-wide weak side-table, and rules reach the services through the
//! [`ContextualRecord`] methods:
//!
//! ```rust,ignore
//! record.use_context(context);
//! record.trace("Validating account name")?;
//! let store = record.data_access()?;
//! ```

use super::{AssociationTable, InvocationMetadata, RuntimeContext};
use crate::core::{Record, SharedRecord};
use crate::errors::{ArgumentError, MissingContextError};
use crate::host::DataAccess;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::marker::PhantomData;
use std::sync::{Arc, LazyLock};

static ASSOCIATIONS: LazyLock<AssociationTable<RwLock<Record>, Arc<RuntimeContext>>> =
    LazyLock::new(AssociationTable::new);

/// What tracing an unattached record does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TracePolicy {
    /// Fail with [`MissingContextError`].
    #[default]
    StrictThrow,
    /// Discard the line.
    SafeNoOp,
}

thread_local! {
    static ACTIVE_POLICY: Cell<TracePolicy> = const { Cell::new(TracePolicy::StrictThrow) };
}

/// Returns the trace policy in effect on the current thread.
#[must_use]
pub fn active_trace_policy() -> TracePolicy {
    ACTIVE_POLICY.with(Cell::get)
}

/// Installs a trace policy on the current thread until dropped.
///
/// Scopes nest; dropping one restores the policy that was active when it
/// was entered.
///
/// The policy is thread-local. Work a rule hands to another thread runs
/// under that thread's policy, `StrictThrow` unless it enters its own
/// scope; use [`ContextualRecord::trace_with_policy`] to pass the policy
/// along explicitly.
#[must_use = "the policy is reverted as soon as the scope is dropped"]
pub struct TracePolicyScope {
    previous: TracePolicy,
    // The slot is thread-local, so the scope must be dropped on the thread
    // that entered it.
    _not_send: PhantomData<*const ()>,
}

impl TracePolicyScope {
    /// Activates `policy` on the current thread.
    pub fn enter(policy: TracePolicy) -> Self {
        let previous = ACTIVE_POLICY.with(|slot| slot.replace(policy));
        Self {
            previous,
            _not_send: PhantomData,
        }
    }
}

impl Drop for TracePolicyScope {
    fn drop(&mut self) {
        ACTIVE_POLICY.with(|slot| slot.set(self.previous));
    }
}

/// Attaches a context when both arguments are present.
///
/// This is the entry point for callers holding host-supplied values that
/// may be missing; rule code uses [`ContextualRecord::use_context`].
///
/// # Errors
///
/// Returns `ArgumentError` naming the first absent argument.
pub fn attach(
    record: Option<&SharedRecord>,
    context: Option<Arc<RuntimeContext>>,
) -> Result<(), ArgumentError> {
    let record = record.ok_or_else(|| ArgumentError::new("record"))?;
    let context = context.ok_or_else(|| ArgumentError::new("context"))?;
    record.use_context(context);
    Ok(())
}

/// Runtime services reachable from a record.
pub trait ContextualRecord {
    /// Attaches `context`, replacing any context attached before.
    fn use_context(&self, context: Arc<RuntimeContext>);

    /// Returns true if a context is attached.
    fn has_context(&self) -> bool;

    /// Returns the attached context.
    ///
    /// # Errors
    ///
    /// Returns `MissingContextError` if none is attached.
    fn context(&self) -> Result<Arc<RuntimeContext>, MissingContextError>;

    /// Detaches and returns the context, if one was attached.
    fn release_context(&self) -> Option<Arc<RuntimeContext>>;

    /// Returns the data-access handle of the attached context.
    ///
    /// # Errors
    ///
    /// Returns `MissingContextError` if none is attached, whatever the
    /// trace policy.
    fn data_access(&self) -> Result<Arc<dyn DataAccess>, MissingContextError>;

    /// Returns the invocation metadata of the attached context.
    ///
    /// # Errors
    ///
    /// Returns `MissingContextError` if none is attached, whatever the
    /// trace policy.
    fn metadata(&self) -> Result<InvocationMetadata, MissingContextError>;

    /// Writes a trace line under the active trace policy.
    ///
    /// # Errors
    ///
    /// Returns `MissingContextError` if none is attached and the policy is
    /// [`TracePolicy::StrictThrow`].
    fn trace(&self, message: &str) -> Result<(), MissingContextError>;

    /// Writes a lazily built trace line under the active trace policy.
    ///
    /// `message` only runs when a trace sink is available.
    ///
    /// # Errors
    ///
    /// As for [`trace`](ContextualRecord::trace).
    fn trace_with<F>(&self, message: F) -> Result<(), MissingContextError>
    where
        F: FnOnce() -> String;

    /// Writes a lazily built trace line under an explicit policy.
    ///
    /// # Errors
    ///
    /// As for [`trace`](ContextualRecord::trace), with `policy` in place of
    /// the active one.
    fn trace_with_policy<F>(&self, policy: TracePolicy, message: F) -> Result<(), MissingContextError>
    where
        F: FnOnce() -> String;
}

impl SharedRecord {
    fn missing(&self, operation: &str) -> MissingContextError {
        // try_read: the caller may be holding the write lock.
        let logical_name = self
            .cell()
            .try_read()
            .map_or_else(|| "<locked>".to_string(), |record| record.logical_name.clone());
        MissingContextError::new(logical_name, operation)
    }

    fn sink_under(&self, policy: TracePolicy) -> Result<Option<Arc<RuntimeContext>>, MissingContextError> {
        match ASSOCIATIONS.try_get(self.cell()) {
            Some(context) => Ok(Some(context)),
            None => match policy {
                TracePolicy::StrictThrow => Err(self.missing("trace")),
                TracePolicy::SafeNoOp => Ok(None),
            },
        }
    }
}

impl ContextualRecord for SharedRecord {
    fn use_context(&self, context: Arc<RuntimeContext>) {
        ASSOCIATIONS.attach(self.cell(), context);
    }

    fn has_context(&self) -> bool {
        ASSOCIATIONS.has(self.cell())
    }

    fn context(&self) -> Result<Arc<RuntimeContext>, MissingContextError> {
        ASSOCIATIONS
            .try_get(self.cell())
            .ok_or_else(|| self.missing("context"))
    }

    fn release_context(&self) -> Option<Arc<RuntimeContext>> {
        ASSOCIATIONS.release(self.cell())
    }

    fn data_access(&self) -> Result<Arc<dyn DataAccess>, MissingContextError> {
        ASSOCIATIONS
            .try_get(self.cell())
            .map(|context| Arc::clone(context.data_access()))
            .ok_or_else(|| self.missing("data_access"))
    }

    fn metadata(&self) -> Result<InvocationMetadata, MissingContextError> {
        ASSOCIATIONS
            .try_get(self.cell())
            .map(|context| context.metadata().clone())
            .ok_or_else(|| self.missing("metadata"))
    }

    fn trace(&self, message: &str) -> Result<(), MissingContextError> {
        if let Some(context) = self.sink_under(active_trace_policy())? {
            context.trace(message);
        }
        Ok(())
    }

    fn trace_with<F>(&self, message: F) -> Result<(), MissingContextError>
    where
        F: FnOnce() -> String,
    {
        self.trace_with_policy(active_trace_policy(), message)
    }

    fn trace_with_policy<F>(&self, policy: TracePolicy, message: F) -> Result<(), MissingContextError>
    where
        F: FnOnce() -> String,
    {
        if let Some(context) = self.sink_under(policy)? {
            context.trace(&message());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::CollectingTraceSink;
    use crate::testing::InMemoryDataAccess;
    use std::sync::atomic::{AtomicBool, Ordering};
    use uuid::Uuid;

    fn context_with(sink: &Arc<CollectingTraceSink>) -> Arc<RuntimeContext> {
        Arc::new(RuntimeContext::new(
            Arc::new(InMemoryDataAccess::new()),
            sink.clone(),
            InvocationMetadata::new("Update", "account", Uuid::new_v4()),
        ))
    }

    fn account() -> SharedRecord {
        SharedRecord::new(Record::new("account"))
    }

    #[test]
    fn test_use_then_context() {
        let sink = Arc::new(CollectingTraceSink::new());
        let record = account();
        let context = context_with(&sink);

        record.use_context(context.clone());

        assert!(record.has_context());
        assert!(Arc::ptr_eq(&record.context().unwrap(), &context));
        assert_eq!(record.metadata().unwrap(), context.metadata().clone());
    }

    #[test]
    fn test_reattach_replaces_context() {
        let sink = Arc::new(CollectingTraceSink::new());
        let record = account();
        let first = context_with(&sink);
        let second = context_with(&sink);

        record.use_context(first);
        record.use_context(second.clone());

        assert!(Arc::ptr_eq(&record.context().unwrap(), &second));
    }

    #[test]
    fn test_unattached_context_fails() {
        let record = account();

        let err = record.context().unwrap_err();
        assert_eq!(err.logical_name, "account");
        assert_eq!(err.operation, "context");
        assert!(record.data_access().is_err());
        assert!(record.metadata().is_err());
    }

    #[test]
    fn test_context_follows_clones_of_the_handle() {
        let sink = Arc::new(CollectingTraceSink::new());
        let record = account();
        let clone = record.clone();
        record.use_context(context_with(&sink));

        clone.trace("from the clone").unwrap();
        assert_eq!(sink.lines(), vec!["from the clone".to_string()]);

        let copy = SharedRecord::new(record.snapshot());
        assert!(!copy.has_context());
    }

    #[test]
    fn test_release_context() {
        let sink = Arc::new(CollectingTraceSink::new());
        let record = account();
        record.use_context(context_with(&sink));

        assert!(record.release_context().is_some());
        assert!(!record.has_context());
    }

    #[test]
    fn test_attach_rejects_absent_arguments() {
        let sink = Arc::new(CollectingTraceSink::new());
        let record = account();

        assert_eq!(attach(None, Some(context_with(&sink))).unwrap_err().name, "record");
        assert_eq!(attach(Some(&record), None).unwrap_err().name, "context");
        assert!(!record.has_context());

        attach(Some(&record), Some(context_with(&sink))).unwrap();
        assert!(record.has_context());
    }

    #[test]
    fn test_trace_forwards_to_sink() {
        let sink = Arc::new(CollectingTraceSink::new());
        let record = account();
        record.use_context(context_with(&sink));

        record.trace("plain").unwrap();
        record.trace_with(|| format!("lazy {}", 42)).unwrap();

        assert_eq!(sink.lines(), vec!["plain".to_string(), "lazy 42".to_string()]);
    }

    #[test]
    fn test_trace_strict_by_default() {
        let record = account();

        assert_eq!(active_trace_policy(), TracePolicy::StrictThrow);
        let err = record.trace("nobody listens").unwrap_err();
        assert_eq!(err.operation, "trace");
    }

    #[test]
    fn test_trace_safe_noop_skips_producer() {
        let record = account();
        let called = AtomicBool::new(false);

        let _scope = TracePolicyScope::enter(TracePolicy::SafeNoOp);
        record.trace("discarded").unwrap();
        record
            .trace_with(|| {
                called.store(true, Ordering::SeqCst);
                "never built".to_string()
            })
            .unwrap();

        assert!(!called.load(Ordering::SeqCst));
    }

    #[test]
    fn test_safe_noop_does_not_cover_service_access() {
        let record = account();
        let _scope = TracePolicyScope::enter(TracePolicy::SafeNoOp);

        assert!(record.trace("ok").is_ok());
        assert!(record.data_access().is_err());
        assert!(record.context().is_err());
    }

    #[test]
    fn test_policy_scopes_nest_and_restore() {
        {
            let _outer = TracePolicyScope::enter(TracePolicy::SafeNoOp);
            {
                let _inner = TracePolicyScope::enter(TracePolicy::StrictThrow);
                assert_eq!(active_trace_policy(), TracePolicy::StrictThrow);
            }
            assert_eq!(active_trace_policy(), TracePolicy::SafeNoOp);
        }
        assert_eq!(active_trace_policy(), TracePolicy::StrictThrow);
    }

    #[test]
    fn test_explicit_policy_overrides_active() {
        let record = account();

        assert!(record
            .trace_with_policy(TracePolicy::SafeNoOp, || "x".to_string())
            .is_ok());

        let _scope = TracePolicyScope::enter(TracePolicy::SafeNoOp);
        assert!(record
            .trace_with_policy(TracePolicy::StrictThrow, || "x".to_string())
            .is_err());
    }

    #[test]
    fn test_missing_context_while_write_locked() {
        let record = account();
        let _guard = record.write();

        let err = record.trace("locked").unwrap_err();
        assert_eq!(err.logical_name, "<locked>");
    }

    #[test]
    fn test_policy_serialization() {
        assert_eq!(
            serde_json::to_string(&TracePolicy::SafeNoOp).unwrap(),
            r#""safe_no_op""#
        );
    }

    #[test]
    fn test_policy_does_not_cross_threads() {
        let record = SharedRecord::new(Record::new("account"));
        let _safe = TracePolicyScope::enter(TracePolicy::SafeNoOp);
        assert!(record.trace("local").is_ok());

        std::thread::scope(|scope| {
            let worker = scope.spawn(|| {
                let inherited = active_trace_policy();
                let implicit = record.trace("worker").is_err();
                let explicit = record.trace_with_policy(TracePolicy::SafeNoOp, || "worker".to_string());
                (inherited, implicit, explicit)
            });
            let (inherited, implicit_failed, explicit) = worker.join().unwrap();

            assert_eq!(inherited, TracePolicy::StrictThrow);
            assert!(implicit_failed);
            assert!(explicit.is_ok());
        });
    }
}
