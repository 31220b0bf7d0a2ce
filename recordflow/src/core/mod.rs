//! Core domain model types for recordflow.
//!
//! This module contains the record model the rest of the crate works on:
//! - Typed attribute values and record references
//! - The record bag and its shared per-invocation handle
//! - Host operation status and pipeline stage enums

mod record;
mod reference;
mod status;
mod value;

pub use record::{Record, SharedRecord};
pub use reference::{ColumnSet, EntityReference};
pub use status::{ExecutionStage, OperationStatus};
pub use value::AttributeValue;
