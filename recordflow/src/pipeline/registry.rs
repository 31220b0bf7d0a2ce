//! Registry mapping record events to rule pipelines.

use super::RulePipeline;
use std::collections::HashMap;
use std::fmt;

/// The event a pipeline is registered for.
///
/// Entity and message names are compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleKey {
    entity: String,
    message: String,
}

impl RuleKey {
    /// Creates a key for a message on a record type.
    #[must_use]
    pub fn new(entity: &str, message: &str) -> Self {
        Self {
            entity: entity.to_ascii_lowercase(),
            message: message.to_ascii_lowercase(),
        }
    }

    /// Returns the normalized entity name.
    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Returns the normalized message name.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity, self.message)
    }
}

/// Rule pipelines keyed by record type and message.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    pipelines: HashMap<RuleKey, RulePipeline>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pipeline, builder style.
    #[must_use]
    pub fn with(mut self, entity: &str, message: &str, pipeline: RulePipeline) -> Self {
        self.register(entity, message, pipeline);
        self
    }

    /// Registers a pipeline, replacing any pipeline under the same key.
    /// Returns the replaced pipeline.
    pub fn register(&mut self, entity: &str, message: &str, pipeline: RulePipeline) -> Option<RulePipeline> {
        let key = RuleKey::new(entity, message);
        tracing::debug!(key = %key, rules = pipeline.len(), "Registered rule pipeline");
        self.pipelines.insert(key, pipeline)
    }

    /// Looks up the pipeline for a message on a record type.
    #[must_use]
    pub fn resolve(&self, entity: &str, message: &str) -> Option<&RulePipeline> {
        self.pipelines.get(&RuleKey::new(entity, message))
    }

    /// Returns all registered keys.
    #[must_use]
    pub fn keys(&self) -> Vec<&RuleKey> {
        self.pipelines.keys().collect()
    }

    /// Returns the number of registered pipelines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}
