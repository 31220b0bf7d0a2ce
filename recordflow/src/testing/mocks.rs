//! In-memory host services for testing.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::{ColumnSet, EntityReference, Record};
use crate::errors::HostCommunicationFault;
use crate::host::{DataAccess, DataAccessFactory};

/// A call made through [`InMemoryDataAccess`].
#[derive(Debug, Clone, PartialEq)]
pub enum DataAccessCall {
    /// `create` with the submitted record.
    Create(Record),
    /// `update` with the submitted record.
    Update(Record),
    /// `retrieve` of a reference.
    Retrieve(EntityReference),
}

/// A record store held in memory that records every call.
#[derive(Debug, Default)]
pub struct InMemoryDataAccess {
    records: Mutex<HashMap<Uuid, Record>>,
    calls: Mutex<Vec<DataAccessCall>>,
    fail_next: Mutex<Option<String>>,
}

impl InMemoryDataAccess {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a stored record. Records without an id are ignored.
    #[must_use]
    pub fn with_record(self, record: Record) -> Self {
        if let Some(id) = record.id {
            self.records.lock().insert(id, record);
        }
        self
    }

    /// Makes the next call fail with `message`.
    pub fn fail_next(&self, message: impl Into<String>) {
        *self.fail_next.lock() = Some(message.into());
    }

    /// Returns every call, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<DataAccessCall> {
        self.calls.lock().clone()
    }

    /// Returns the records passed to `create`.
    #[must_use]
    pub fn creates(&self) -> Vec<Record> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                DataAccessCall::Create(record) => Some(record.clone()),
                _ => None,
            })
            .collect()
    }

    /// Returns the records passed to `update`.
    #[must_use]
    pub fn updates(&self) -> Vec<Record> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                DataAccessCall::Update(record) => Some(record.clone()),
                _ => None,
            })
            .collect()
    }

    /// Returns the stored state of a record.
    #[must_use]
    pub fn stored(&self, id: Uuid) -> Option<Record> {
        self.records.lock().get(&id).cloned()
    }

    fn begin(&self, operation: &str, call: DataAccessCall) -> Result<(), HostCommunicationFault> {
        self.calls.lock().push(call);
        match self.fail_next.lock().take() {
            Some(message) => Err(HostCommunicationFault::new(operation, message)),
            None => Ok(()),
        }
    }
}

impl DataAccess for InMemoryDataAccess {
    fn create(&self, record: &Record) -> Result<Uuid, HostCommunicationFault> {
        self.begin("create", DataAccessCall::Create(record.clone()))?;
        let id = record.id.unwrap_or_else(Uuid::new_v4);
        self.records.lock().insert(id, record.clone().with_id(id));
        Ok(id)
    }

    fn update(&self, record: &Record) -> Result<(), HostCommunicationFault> {
        self.begin("update", DataAccessCall::Update(record.clone()))?;
        let id = record
            .id
            .ok_or_else(|| HostCommunicationFault::new("update", "Record id is required"))?;
        let mut records = self.records.lock();
        let stored = records
            .entry(id)
            .or_insert_with(|| Record::new(record.logical_name.clone()).with_id(id));
        for (key, value) in &record.attributes {
            stored.attributes.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    fn retrieve(
        &self,
        reference: &EntityReference,
        columns: &ColumnSet,
    ) -> Result<Record, HostCommunicationFault> {
        self.begin("retrieve", DataAccessCall::Retrieve(reference.clone()))?;
        let records = self.records.lock();
        let stored = records.get(&reference.id).ok_or_else(|| {
            HostCommunicationFault::new(
                "retrieve",
                format!("{} With Id = {} Does Not Exist", reference.logical_name, reference.id),
            )
        })?;

        let mut found = Record::new(stored.logical_name.clone()).with_id(reference.id);
        for (key, value) in &stored.attributes {
            if columns.includes(key) {
                found.attributes.insert(key.clone(), value.clone());
            }
        }
        Ok(found)
    }
}

/// Hands out one shared [`InMemoryDataAccess`] and records which users
/// asked for it.
#[derive(Debug)]
pub struct InMemoryDataAccessFactory {
    store: Arc<InMemoryDataAccess>,
    requested: Mutex<Vec<Uuid>>,
}

impl InMemoryDataAccessFactory {
    /// Creates a factory over `store`.
    #[must_use]
    pub fn new(store: Arc<InMemoryDataAccess>) -> Self {
        Self {
            store,
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Returns the users handles were created for, in order.
    #[must_use]
    pub fn requested_users(&self) -> Vec<Uuid> {
        self.requested.lock().clone()
    }
}

impl DataAccessFactory for InMemoryDataAccessFactory {
    fn create_for_user(&self, user_id: Uuid) -> Arc<dyn DataAccess> {
        self.requested.lock().push(user_id);
        self.store.clone()
    }
}
