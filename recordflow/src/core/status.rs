//! Operation status and pipeline stage enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status reported back to the host when an invocation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    /// The operation failed.
    Failed,
    /// The operation was canceled by business logic.
    Canceled,
}

impl Default for OperationStatus {
    fn default() -> Self {
        Self::Failed
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed => write!(f, "failed"),
            Self::Canceled => write!(f, "canceled"),
        }
    }
}

/// Where in the host's event pipeline an invocation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStage {
    /// Before the host validates the operation.
    PreValidation,
    /// Inside the transaction, before the write.
    PreOperation,
    /// Inside the transaction, after the write.
    PostOperation,
}

impl Default for ExecutionStage {
    fn default() -> Self {
        Self::PreOperation
    }
}

impl fmt::Display for ExecutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreValidation => write!(f, "pre_validation"),
            Self::PreOperation => write!(f, "pre_operation"),
            Self::PostOperation => write!(f, "post_operation"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_status_display() {
        assert_eq!(OperationStatus::Canceled.to_string(), "canceled");
        assert_eq!(OperationStatus::Failed.to_string(), "failed");
        assert_eq!(OperationStatus::default(), OperationStatus::Failed);
    }

    #[test]
    fn test_operation_status_serialize() {
        let json = serde_json::to_string(&OperationStatus::Canceled).unwrap();
        assert_eq!(json, r#""canceled""#);

        let status: OperationStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, OperationStatus::Canceled);
    }

    #[test]
    fn test_execution_stage_display() {
        assert_eq!(ExecutionStage::PreValidation.to_string(), "pre_validation");
        assert_eq!(ExecutionStage::PostOperation.to_string(), "post_operation");
        assert_eq!(ExecutionStage::default(), ExecutionStage::PreOperation);
    }
}
