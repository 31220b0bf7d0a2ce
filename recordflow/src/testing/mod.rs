//! Testing utilities for recordflow handlers and rules.
//!
//! This module provides:
//! - An in-memory data-access store that records calls
//! - A host invocation fixture builder
//! - Trace assertions

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{assert_entry_exit, assert_not_traced, assert_traced};
pub use fixtures::TestInvocation;
pub use mocks::{DataAccessCall, InMemoryDataAccess, InMemoryDataAccessFactory};
