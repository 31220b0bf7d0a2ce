//! What the host hands to an invocation.

use super::DataAccessFactory;
use crate::context::InvocationMetadata;
use crate::core::{AttributeValue, EntityReference, Record};
use crate::observability::TraceSink;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Name of the input parameter holding the changed record.
pub const TARGET_PARAMETER: &str = "Target";

/// A value in the host's input parameter collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Parameter {
    /// A full record payload.
    Record(Record),
    /// A reference to a stored record.
    Reference(EntityReference),
    /// A scalar value.
    Value(AttributeValue),
}

impl Parameter {
    /// Returns the record payload, if this parameter holds one.
    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }
}

/// The host's description of one event: metadata, the change payload and
/// the registered images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostExecutionContext {
    /// Invocation metadata.
    pub metadata: InvocationMetadata,
    /// Input parameters keyed by name.
    #[serde(default)]
    pub input_parameters: HashMap<String, Parameter>,
    /// Snapshots of the record before the change, keyed by image name.
    #[serde(default)]
    pub pre_images: HashMap<String, Record>,
    /// Snapshots of the record after the change, keyed by image name.
    #[serde(default)]
    pub post_images: HashMap<String, Record>,
}

impl HostExecutionContext {
    /// Creates an execution context with no parameters or images.
    #[must_use]
    pub fn new(metadata: InvocationMetadata) -> Self {
        Self {
            metadata,
            input_parameters: HashMap::new(),
            pre_images: HashMap::new(),
            post_images: HashMap::new(),
        }
    }

    /// Sets the `Target` parameter to a record.
    #[must_use]
    pub fn with_target(self, record: Record) -> Self {
        self.with_input(TARGET_PARAMETER, Parameter::Record(record))
    }

    /// Adds an input parameter.
    #[must_use]
    pub fn with_input(mut self, name: impl Into<String>, parameter: Parameter) -> Self {
        self.input_parameters.insert(name.into(), parameter);
        self
    }

    /// Adds a pre-image.
    #[must_use]
    pub fn with_pre_image(mut self, name: impl Into<String>, record: Record) -> Self {
        self.pre_images.insert(name.into(), record);
        self
    }

    /// Adds a post-image.
    #[must_use]
    pub fn with_post_image(mut self, name: impl Into<String>, record: Record) -> Self {
        self.post_images.insert(name.into(), record);
        self
    }

    /// Gets an input parameter.
    #[must_use]
    pub fn input(&self, name: &str) -> Option<&Parameter> {
        self.input_parameters.get(name)
    }

    /// Gets a pre-image.
    #[must_use]
    pub fn pre_image(&self, name: &str) -> Option<&Record> {
        self.pre_images.get(name)
    }

    /// Gets a post-image.
    #[must_use]
    pub fn post_image(&self, name: &str) -> Option<&Record> {
        self.post_images.get(name)
    }
}

/// Everything the host supplies for one call. Any piece may be missing;
/// the handler reports missing pieces as configuration errors.
#[derive(Clone, Default)]
pub struct HostInvocation {
    execution: Option<HostExecutionContext>,
    tracer: Option<Arc<dyn TraceSink>>,
    data_access_factory: Option<Arc<dyn DataAccessFactory>>,
}

impl HostInvocation {
    /// Creates an invocation with no services.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the execution context.
    #[must_use]
    pub fn with_execution(mut self, execution: HostExecutionContext) -> Self {
        self.execution = Some(execution);
        self
    }

    /// Sets the trace sink.
    #[must_use]
    pub fn with_tracer(mut self, tracer: Arc<dyn TraceSink>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Sets the data-access factory.
    #[must_use]
    pub fn with_data_access_factory(mut self, factory: Arc<dyn DataAccessFactory>) -> Self {
        self.data_access_factory = Some(factory);
        self
    }

    /// Returns the execution context.
    #[must_use]
    pub fn execution(&self) -> Option<&HostExecutionContext> {
        self.execution.as_ref()
    }

    /// Returns the trace sink.
    #[must_use]
    pub fn tracer(&self) -> Option<&Arc<dyn TraceSink>> {
        self.tracer.as_ref()
    }

    /// Returns the data-access factory.
    #[must_use]
    pub fn data_access_factory(&self) -> Option<&Arc<dyn DataAccessFactory>> {
        self.data_access_factory.as_ref()
    }
}

impl fmt::Debug for HostInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostInvocation")
            .field("execution", &self.execution)
            .field("has_tracer", &self.tracer.is_some())
            .field("has_data_access_factory", &self.data_access_factory.is_some())
            .finish()
    }
}
