//! Error types for recordflow.
//!
//! Every failure an invocation can end with is one of the structs below,
//! unified in [`RecordflowError`].

use crate::core::OperationStatus;
use std::collections::HashMap;
use thiserror::Error;

/// The main error type for recordflow operations.
#[derive(Debug, Error)]
pub enum RecordflowError {
    /// A required host service, parameter or image is missing.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// Runtime services were accessed before a context was attached.
    #[error("{0}")]
    MissingContext(#[from] MissingContextError),

    /// A rule rejected the record.
    #[error("{0}")]
    DomainValidation(#[from] DomainValidationError),

    /// A call to the host's data service failed.
    #[error("{0}")]
    HostCommunication(#[from] HostCommunicationFault),

    /// A host fault produced at the invocation boundary.
    #[error("{0}")]
    Fault(#[from] PluginFault),

    /// A required argument was absent.
    #[error("{0}")]
    Argument(#[from] ArgumentError),
}

impl RecordflowError {
    /// Returns a short machine-readable name for the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "ConfigurationError",
            Self::MissingContext(_) => "MissingContextError",
            Self::DomainValidation(_) => "DomainValidationError",
            Self::HostCommunication(_) => "HostCommunicationFault",
            Self::Fault(_) => "PluginFault",
            Self::Argument(_) => "ArgumentError",
        }
    }

    /// Returns the status the host should report for this error.
    #[must_use]
    pub fn status(&self) -> OperationStatus {
        match self {
            Self::DomainValidation(err) => err.status,
            Self::Fault(fault) => fault.status,
            _ => OperationStatus::Failed,
        }
    }

    /// Returns true for expected, user-facing rule failures.
    #[must_use]
    pub fn is_domain_validation(&self) -> bool {
        matches!(self, Self::DomainValidation(_))
    }

    /// Converts to a dictionary representation for the host.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!(self.kind()));
        map.insert("status".to_string(), serde_json::json!(self.status()));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

/// Error raised when the host registration or invocation is incomplete.
///
/// These indicate a setup defect and are never retryable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A host service was not supplied.
    #[error("Required host service not supplied: {service}")]
    MissingService {
        /// The service name.
        service: String,
    },

    /// An input parameter was not supplied.
    #[error("Input parameter '{name}' not supplied")]
    MissingParameter {
        /// The parameter name.
        name: String,
    },

    /// An input parameter did not hold a record.
    #[error("Input parameter '{name}' is not a record")]
    ParameterNotRecord {
        /// The parameter name.
        name: String,
    },

    /// A pre-image was not registered for the step.
    #[error("Image '{name}' not supplied; check the step's image registration")]
    MissingImage {
        /// The image name.
        name: String,
    },

    /// Registration configuration could not be read.
    #[error("Invalid handler configuration: {reason}")]
    InvalidConfiguration {
        /// Why the configuration was rejected.
        reason: String,
    },
}

impl ConfigurationError {
    /// Creates a missing service error.
    #[must_use]
    pub fn missing_service(service: impl Into<String>) -> Self {
        Self::MissingService {
            service: service.into(),
        }
    }

    /// Creates a missing parameter error.
    #[must_use]
    pub fn missing_parameter(name: impl Into<String>) -> Self {
        Self::MissingParameter { name: name.into() }
    }

    /// Creates a parameter type error.
    #[must_use]
    pub fn parameter_not_record(name: impl Into<String>) -> Self {
        Self::ParameterNotRecord { name: name.into() }
    }

    /// Creates a missing image error.
    #[must_use]
    pub fn missing_image(name: impl Into<String>) -> Self {
        Self::MissingImage { name: name.into() }
    }

    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}

/// Error raised when a record's runtime services are used before a context
/// was attached to it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Context not set on '{logical_name}' record: call use_context before {operation}")]
pub struct MissingContextError {
    /// Logical name of the record.
    pub logical_name: String,
    /// The operation that needed the context.
    pub operation: String,
}

impl MissingContextError {
    /// Creates a new missing context error.
    #[must_use]
    pub fn new(logical_name: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            operation: operation.into(),
        }
    }
}

/// Error raised by a rule when the record breaks a business invariant.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct DomainValidationError {
    /// Status reported to the host.
    pub status: OperationStatus,
    /// User-facing message.
    pub message: String,
}

impl DomainValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub fn new(status: OperationStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Creates a validation error that cancels the operation.
    #[must_use]
    pub fn canceled(message: impl Into<String>) -> Self {
        Self::new(OperationStatus::Canceled, message)
    }
}

/// Error raised when a call through the data-access handle fails on the
/// host side.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Host call '{operation}' failed: {message}")]
pub struct HostCommunicationFault {
    /// The data-access operation (`create`, `update`, `retrieve`).
    pub operation: String,
    /// The host's message.
    pub message: String,
}

impl HostCommunicationFault {
    /// Creates a new host communication fault.
    #[must_use]
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// The host's own fault wrapper, produced at the invocation boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct PluginFault {
    /// Status reported to the host.
    pub status: OperationStatus,
    /// Message surfaced to the host's caller.
    pub message: String,
    /// The fault this one wraps, if any.
    #[source]
    pub source: Option<HostCommunicationFault>,
}

impl PluginFault {
    /// Wraps a host communication fault, keeping its message.
    #[must_use]
    pub fn from_host_fault(fault: HostCommunicationFault) -> Self {
        Self {
            status: OperationStatus::Failed,
            message: format!("OrganizationServiceFault: {}", fault.message),
            source: Some(fault),
        }
    }
}

/// Error raised when a required argument is absent.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Argument '{name}' must be supplied")]
pub struct ArgumentError {
    /// The argument name.
    pub name: String,
}

impl ArgumentError {
    /// Creates a new argument error.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_domain_validation_status_flows_through() {
        let err: RecordflowError =
            DomainValidationError::canceled("Account name must be greater than 3 characters.").into();

        assert_eq!(err.status(), OperationStatus::Canceled);
        assert!(err.is_domain_validation());
        assert_eq!(err.to_string(), "Account name must be greater than 3 characters.");
    }

    #[test]
    fn test_plugin_fault_wraps_host_fault() {
        let fault = PluginFault::from_host_fault(HostCommunicationFault::new("update", "timeout"));

        assert_eq!(fault.message, "OrganizationServiceFault: timeout");
        assert_eq!(fault.status, OperationStatus::Failed);
        assert!(fault.source().is_some());
    }

    #[test]
    fn test_missing_context_message() {
        let err = MissingContextError::new("account", "trace");
        assert!(err.to_string().contains("use_context"));
        assert!(err.to_string().contains("account"));
    }

    #[test]
    fn test_error_to_dict() {
        let err: RecordflowError = ConfigurationError::missing_image("pre").into();
        let dict = err.to_dict();

        assert_eq!(dict.get("type").unwrap(), "ConfigurationError");
        assert_eq!(dict.get("status").unwrap(), "failed");
        assert!(dict.get("message").unwrap().as_str().unwrap().contains("pre"));
    }
}
