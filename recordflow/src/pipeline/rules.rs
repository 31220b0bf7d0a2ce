//! Ordered rule execution against one record.

use crate::core::SharedRecord;
use crate::errors::RecordflowError;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// What a rule returns: the record to hand to the next rule, or the error
/// that stops the chain.
pub type RuleResult = Result<SharedRecord, RecordflowError>;

/// A rule body.
pub type RuleFn = Arc<dyn Fn(SharedRecord) -> RuleResult + Send + Sync>;

/// A named validation or mutation step.
#[derive(Clone)]
pub struct Rule {
    name: String,
    step: RuleFn,
}

impl Rule {
    /// Creates a rule from a function or closure.
    pub fn new<F>(name: impl Into<String>, step: F) -> Self
    where
        F: Fn(SharedRecord) -> RuleResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            step: Arc::new(step),
        }
    }

    /// Returns the rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the rule.
    pub fn apply(&self, record: SharedRecord) -> RuleResult {
        (self.step)(record)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish_non_exhaustive()
    }
}

/// The result of a pipeline run that reached the end.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// The record returned by the last rule.
    pub record: SharedRecord,
    /// Names of the rules that ran, in order.
    pub executed: Vec<String>,
}

/// An ordered sequence of rules.
///
/// Running the pipeline passes the record through each rule in turn. The
/// first error stops the chain and is returned as-is; changes made by
/// earlier rules are kept.
#[derive(Debug, Clone, Default)]
pub struct RulePipeline {
    name: String,
    rules: Vec<Rule>,
}

impl RulePipeline {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    /// Appends a rule.
    #[must_use]
    pub fn rule<F>(mut self, name: impl Into<String>, step: F) -> Self
    where
        F: Fn(SharedRecord) -> RuleResult + Send + Sync + 'static,
    {
        self.rules.push(Rule::new(name, step));
        self
    }

    /// Appends an already-built rule.
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the rule names in execution order.
    #[must_use]
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(Rule::name).collect()
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the pipeline has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs every rule in order.
    ///
    /// # Errors
    ///
    /// Returns the first error a rule returns; later rules do not run.
    pub fn run(&self, record: SharedRecord) -> Result<PipelineRun, RecordflowError> {
        let mut current = record;
        let mut executed = Vec::with_capacity(self.rules.len());

        for rule in &self.rules {
            debug!(pipeline = %self.name, rule = %rule.name, "Running rule");
            current = match rule.apply(current) {
                Ok(next) => next,
                Err(err) => {
                    warn!(
                        pipeline = %self.name,
                        rule = %rule.name,
                        kind = err.kind(),
                        error = %err,
                        "Rule stopped the pipeline"
                    );
                    return Err(err);
                }
            };
            executed.push(rule.name.clone());
        }

        Ok(PipelineRun {
            record: current,
            executed,
        })
    }
}
