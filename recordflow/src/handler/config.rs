//! Handler configuration.

use crate::context::TracePolicy;
use crate::errors::ConfigurationError;
use crate::host::TARGET_PARAMETER;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Pre-image name used when the registration does not name one.
pub const DEFAULT_PRE_IMAGE: &str = "pre";

/// Per-handler settings, normally read from the step's registration
/// configuration string.
///
/// Every field is optional in the JSON form:
///
/// ```json
/// { "trace_policy": "safe_no_op", "target_parameter": "Target", "pre_image": null }
/// ```
///
/// `"pre_image": null` registers a step without a pre-image (create
/// events); omitting the field keeps the default `"pre"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    /// What tracing an unattached record does during this handler's
    /// invocations.
    pub trace_policy: TracePolicy,
    /// Input parameter holding the changed record.
    pub target_parameter: String,
    /// Pre-image to merge into the target, if the step has one.
    pub pre_image: Option<String>,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            trace_policy: TracePolicy::default(),
            target_parameter: TARGET_PARAMETER.to_string(),
            pre_image: Some(DEFAULT_PRE_IMAGE.to_string()),
        }
    }
}

impl HandlerConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the registration configuration string. Absent or blank
    /// strings give the default configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidConfiguration` if the string is
    /// not a valid configuration object.
    pub fn from_registration(unsecure: Option<&str>) -> Result<Self, ConfigurationError> {
        match unsecure.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(json) => Self::from_json(json),
        }
    }

    /// Parses a JSON configuration object.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidConfiguration` on malformed JSON,
    /// JSON that is not an object, or unexpected field types.
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        parse_settings(json)
    }

    /// Sets the trace policy.
    #[must_use]
    pub fn with_trace_policy(mut self, policy: TracePolicy) -> Self {
        self.trace_policy = policy;
        self
    }

    /// Sets the target parameter name.
    #[must_use]
    pub fn with_target_parameter(mut self, name: impl Into<String>) -> Self {
        self.target_parameter = name.into();
        self
    }

    /// Sets the pre-image name.
    #[must_use]
    pub fn with_pre_image(mut self, name: impl Into<String>) -> Self {
        self.pre_image = Some(name.into());
        self
    }

    /// Registers the step without a pre-image.
    #[must_use]
    pub fn without_pre_image(mut self) -> Self {
        self.pre_image = None;
        self
    }
}

/// Parses a settings object. Only JSON objects are accepted; serde would
/// otherwise fill struct fields from an array by position.
pub(crate) fn parse_settings<T: DeserializeOwned>(json: &str) -> Result<T, ConfigurationError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| ConfigurationError::invalid(e.to_string()))?;
    if !value.is_object() {
        return Err(ConfigurationError::invalid("expected a JSON object"));
    }
    serde_json::from_value(value).map_err(|e| ConfigurationError::invalid(e.to_string()))
}
