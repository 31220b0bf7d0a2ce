//! The per-invocation runtime context.

use super::InvocationMetadata;
use crate::errors::ConfigurationError;
use crate::host::{DataAccess, HostInvocation};
use crate::observability::TraceSink;
use std::fmt;
use std::sync::Arc;

/// The services one invocation's rules run against.
///
/// Built once at the start of an invocation and never mutated afterwards.
pub struct RuntimeContext {
    /// Record store access, acting as the invocation's user.
    data_access: Arc<dyn DataAccess>,
    /// Host trace sink.
    tracer: Arc<dyn TraceSink>,
    /// Who, what and which correlation id.
    metadata: InvocationMetadata,
}

impl RuntimeContext {
    /// Creates a context from already-resolved services.
    #[must_use]
    pub fn new(
        data_access: Arc<dyn DataAccess>,
        tracer: Arc<dyn TraceSink>,
        metadata: InvocationMetadata,
    ) -> Self {
        Self {
            data_access,
            tracer,
            metadata,
        }
    }

    /// Resolves the services a host invocation supplies.
    ///
    /// The data-access handle is created for the invocation's acting user.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::MissingService` if the execution
    /// context, trace sink or data-access factory is absent.
    pub fn from_host(host: &HostInvocation) -> Result<Self, ConfigurationError> {
        let execution = host
            .execution()
            .ok_or_else(|| ConfigurationError::missing_service("execution context"))?;
        let tracer = host
            .tracer()
            .cloned()
            .ok_or_else(|| ConfigurationError::missing_service("trace sink"))?;
        let factory = host
            .data_access_factory()
            .ok_or_else(|| ConfigurationError::missing_service("data access factory"))?;

        let metadata = execution.metadata.clone();
        let data_access = factory.create_for_user(metadata.user_id);

        Ok(Self::new(data_access, tracer, metadata))
    }

    /// Returns the data-access handle.
    #[must_use]
    pub fn data_access(&self) -> &Arc<dyn DataAccess> {
        &self.data_access
    }

    /// Returns the trace sink.
    #[must_use]
    pub fn tracer(&self) -> &Arc<dyn TraceSink> {
        &self.tracer
    }

    /// Returns the invocation metadata.
    #[must_use]
    pub fn metadata(&self) -> &InvocationMetadata {
        &self.metadata
    }

    /// Writes a line to the trace sink.
    pub fn trace(&self, message: &str) {
        self.tracer.write(message);
    }
}

impl fmt::Debug for RuntimeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeContext")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}
