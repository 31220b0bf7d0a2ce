//! Invocation metadata supplied by the host.

use crate::core::ExecutionStage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one host invocation: who triggered it, what it is about, and
/// the correlation id tying its trace lines together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationMetadata {
    /// The user the invocation acts as.
    pub user_id: Uuid,

    /// The user whose action started the operation.
    pub initiating_user_id: Uuid,

    /// Correlation id shared by every invocation of one host operation.
    pub correlation_id: Uuid,

    /// The host message (e.g. `Create`, `Update`).
    pub message_name: String,

    /// Logical name of the record type the message targets.
    pub primary_entity_name: String,

    /// Pipeline stage of the registered step.
    #[serde(default)]
    pub stage: ExecutionStage,

    /// Nesting depth; 1 for a direct user action.
    #[serde(default = "default_depth")]
    pub depth: u32,
}

const fn default_depth() -> u32 {
    1
}

impl InvocationMetadata {
    /// Creates metadata for a message on a record type, with a fresh
    /// correlation id and the same acting and initiating user.
    #[must_use]
    pub fn new(
        message_name: impl Into<String>,
        primary_entity_name: impl Into<String>,
        user_id: Uuid,
    ) -> Self {
        Self {
            user_id,
            initiating_user_id: user_id,
            correlation_id: Uuid::new_v4(),
            message_name: message_name.into(),
            primary_entity_name: primary_entity_name.into(),
            stage: ExecutionStage::default(),
            depth: default_depth(),
        }
    }

    /// Sets the initiating user.
    #[must_use]
    pub fn with_initiating_user_id(mut self, user_id: Uuid) -> Self {
        self.initiating_user_id = user_id;
        self
    }

    /// Sets the correlation id.
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = correlation_id;
        self
    }

    /// Sets the stage.
    #[must_use]
    pub fn with_stage(mut self, stage: ExecutionStage) -> Self {
        self.stage = stage;
        self
    }

    /// Sets the depth.
    #[must_use]
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }
}
