//! Invocation handling.
//!
//! An [`InvocationHandler`] is the entry point the host calls for each
//! registered step. It builds the [`RuntimeContext`](crate::context::RuntimeContext),
//! loads and merges the record images, attaches the context, runs the
//! pipeline registered for the record event and writes entry and exit
//! traces around all of it.

mod config;
mod guards;
mod invocation;

pub(crate) use config::parse_settings;
pub use config::{HandlerConfig, DEFAULT_PRE_IMAGE};
pub use invocation::{InvocationHandler, InvocationOutcome, InvocationReport};
