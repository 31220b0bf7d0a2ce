//! # Recordflow
//!
//! Business rules for record-change events raised by a host platform.
//!
//! Recordflow runs ordered rule pipelines against the record an event
//! carries, with support for:
//!
//! - **Ambient context**: rules reach the invocation's data access, trace
//!   sink and metadata through the record itself, without extra parameters
//! - **Pre-image merging**: partial change payloads are completed from the
//!   record's prior state before any rule runs
//! - **Rule pipelines**: ordered, short-circuiting rule chains registered
//!   per record type and message
//! - **Invocation handling**: host services in, entry and exit traces
//!   guaranteed, host faults translated on the way out
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use recordflow::prelude::*;
//!
//! let handler = InvocationHandler::new(
//!     "PluginAccountUpdatePreOperation",
//!     HandlerConfig::from_registration(unsecure_config)?,
//!     RuleRegistry::new().with(
//!         "account",
//!         "Update",
//!         RulePipeline::new("account-update")
//!             .rule("ensure_name", ensure_account_name_greater_than_three_chars),
//!     ),
//! );
//!
//! let report = handler.execute(&host_invocation)?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod context;
pub mod core;
pub mod errors;
pub mod handler;
pub mod host;
pub mod merge;
pub mod observability;
pub mod pipeline;
pub mod rules;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::context::{
        attach, ContextualRecord, InvocationMetadata, RuntimeContext, TracePolicy,
    };
    pub use crate::core::{
        AttributeValue, ColumnSet, EntityReference, ExecutionStage, OperationStatus, Record,
        SharedRecord,
    };
    pub use crate::errors::{
        ArgumentError, ConfigurationError, DomainValidationError, HostCommunicationFault,
        MissingContextError, PluginFault, RecordflowError,
    };
    pub use crate::handler::{HandlerConfig, InvocationHandler, InvocationOutcome, InvocationReport};
    pub use crate::host::{DataAccess, DataAccessFactory, HostExecutionContext, HostInvocation};
    pub use crate::merge::merge_pre_image;
    pub use crate::observability::{
        init_logging, CollectingTraceSink, LogFormat, LoggingTraceSink, NoOpTraceSink, TraceSink,
    };
    pub use crate::pipeline::{Rule, RulePipeline, RuleRegistry, RuleResult};
    pub use crate::rules::{
        ensure_account_name_greater_than_three_chars, ensure_primary_contact_has_city,
        AccountRuleSettings,
    };
}
