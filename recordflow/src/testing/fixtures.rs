//! Test fixtures for invocation testing.

use std::sync::Arc;

use crate::context::InvocationMetadata;
use crate::core::Record;
use crate::host::{HostExecutionContext, HostInvocation};
use crate::observability::CollectingTraceSink;
use uuid::Uuid;

use super::mocks::{InMemoryDataAccess, InMemoryDataAccessFactory};

/// A host invocation builder backed by in-memory services.
///
/// The primary entity name is taken from the target record.
#[derive(Debug)]
pub struct TestInvocation {
    metadata: InvocationMetadata,
    execution: HostExecutionContext,
    store: Arc<InMemoryDataAccess>,
    factory: Arc<InMemoryDataAccessFactory>,
    sink: Arc<CollectingTraceSink>,
}

impl TestInvocation {
    /// Creates an invocation of `message` with `target` as its target.
    #[must_use]
    pub fn new(message: &str, target: Record) -> Self {
        let metadata = InvocationMetadata::new(message, target.logical_name.clone(), Uuid::new_v4());
        let store = Arc::new(InMemoryDataAccess::new());
        Self {
            execution: HostExecutionContext::new(metadata.clone()).with_target(target),
            metadata,
            factory: Arc::new(InMemoryDataAccessFactory::new(store.clone())),
            store,
            sink: Arc::new(CollectingTraceSink::new()),
        }
    }

    /// Adds a pre-image.
    #[must_use]
    pub fn with_pre_image(mut self, name: &str, record: Record) -> Self {
        self.execution = self.execution.with_pre_image(name, record);
        self
    }

    /// Replaces the backing store.
    #[must_use]
    pub fn with_store(mut self, store: Arc<InMemoryDataAccess>) -> Self {
        self.factory = Arc::new(InMemoryDataAccessFactory::new(store.clone()));
        self.store = store;
        self
    }

    /// Sets the acting user.
    #[must_use]
    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.metadata.user_id = user_id;
        self.execution.metadata.user_id = user_id;
        self
    }

    /// Builds the host invocation.
    #[must_use]
    pub fn host(&self) -> HostInvocation {
        HostInvocation::new()
            .with_execution(self.execution.clone())
            .with_tracer(self.sink.clone())
            .with_data_access_factory(self.factory.clone())
    }

    /// Returns the invocation metadata.
    #[must_use]
    pub fn metadata(&self) -> &InvocationMetadata {
        &self.metadata
    }

    /// Returns the backing store.
    #[must_use]
    pub fn store(&self) -> Arc<InMemoryDataAccess> {
        self.store.clone()
    }

    /// Returns the factory handing out the store.
    #[must_use]
    pub fn factory(&self) -> Arc<InMemoryDataAccessFactory> {
        self.factory.clone()
    }

    /// Returns the trace sink.
    #[must_use]
    pub fn sink(&self) -> Arc<CollectingTraceSink> {
        self.sink.clone()
    }
}
