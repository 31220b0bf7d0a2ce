//! Rule pipelines.
//!
//! This module provides:
//! - Named rules with a uniform record-in, record-out signature
//! - Ordered, short-circuiting pipeline execution
//! - A registry selecting the pipeline for a record event

mod registry;
mod rules;

pub use registry::{RuleKey, RuleRegistry};
pub use rules::{PipelineRun, Rule, RuleFn, RulePipeline, RuleResult};
