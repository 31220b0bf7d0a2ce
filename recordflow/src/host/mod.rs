//! Interfaces to the external host runtime.
//!
//! The host dispatches invocations, supplies the change payload and images,
//! and owns the record store and the trace log. Only the surface this crate
//! consumes is modelled here.

mod invocation;
mod services;

pub use invocation::{HostExecutionContext, HostInvocation, Parameter, TARGET_PARAMETER};
pub use services::{DataAccess, DataAccessFactory};

#[cfg(test)]
pub use services::MockDataAccess;
