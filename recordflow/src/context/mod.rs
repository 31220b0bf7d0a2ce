//! Runtime context management for record invocations.
//!
//! This module provides:
//! - Invocation metadata and the immutable per-invocation runtime context
//! - A weak, identity-keyed side-table for associating values with records
//! - The facade rules use to reach runtime services through a record

mod association;
#[cfg(test)]
mod context_tests;
mod contextual;
mod metadata;
mod runtime;

pub use association::AssociationTable;
pub use contextual::{attach, active_trace_policy, ContextualRecord, TracePolicy, TracePolicyScope};
pub use metadata::InvocationMetadata;
pub use runtime::RuntimeContext;
