//! The record model and its shared per-invocation handle.

use super::{AttributeValue, EntityReference};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// A schema-less business record: a logical name, an optional id and a bag
/// of typed attributes.
///
/// The shape is owned by the host's schema tooling. Nothing in this crate
/// adds fields to it; runtime services are attached from the outside (see
/// [`crate::context::ContextualRecord`]).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    /// Logical name of the record type (e.g. `account`).
    pub logical_name: String,
    /// Record id, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Attribute values keyed by attribute name.
    #[serde(default)]
    pub attributes: HashMap<String, AttributeValue>,
}

impl Record {
    /// Creates an empty record of the given type.
    #[must_use]
    pub fn new(logical_name: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            id: None,
            attributes: HashMap::new(),
        }
    }

    /// Sets the id.
    #[must_use]
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Gets an attribute value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Gets a text attribute.
    #[must_use]
    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AttributeValue::as_text)
    }

    /// Gets a lookup attribute.
    #[must_use]
    pub fn get_reference(&self, key: &str) -> Option<&EntityReference> {
        self.get(key).and_then(AttributeValue::as_reference)
    }

    /// Checks whether the attribute is present, cleared values included.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Marks an attribute as explicitly cleared.
    pub fn clear_value(&mut self, key: impl Into<String>) {
        self.attributes.insert(key.into(), AttributeValue::Cleared);
    }

    /// Removes an attribute entirely.
    pub fn remove(&mut self, key: &str) -> Option<AttributeValue> {
        self.attributes.remove(key)
    }

    /// Returns the number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns true if the record has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Returns a reference to this record, if it has an id.
    #[must_use]
    pub fn to_reference(&self) -> Option<EntityReference> {
        self.id.map(|id| EntityReference::new(&self.logical_name, id))
    }
}

/// Shared handle to the record one invocation works on.
///
/// Cloning the handle clones the pointer, not the record: every clone has
/// the same identity, and that identity is what runtime contexts are
/// attached to.
#[derive(Clone)]
pub struct SharedRecord {
    cell: Arc<RwLock<Record>>,
}

impl SharedRecord {
    /// Wraps a record in a new handle with a fresh identity.
    #[must_use]
    pub fn new(record: Record) -> Self {
        Self {
            cell: Arc::new(RwLock::new(record)),
        }
    }

    /// Locks the record for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, Record> {
        self.cell.read()
    }

    /// Locks the record for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, Record> {
        self.cell.write()
    }

    /// Returns the logical name.
    #[must_use]
    pub fn logical_name(&self) -> String {
        self.cell.read().logical_name.clone()
    }

    /// Returns the record id.
    #[must_use]
    pub fn id(&self) -> Option<Uuid> {
        self.cell.read().id
    }

    /// Gets a copy of an attribute value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<AttributeValue> {
        self.cell.read().get(key).cloned()
    }

    /// Sets an attribute value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.cell.write().set(key, value);
    }

    /// Returns a detached copy of the record.
    #[must_use]
    pub fn snapshot(&self) -> Record {
        self.cell.read().clone()
    }

    /// Returns true if both handles point at the same record.
    #[must_use]
    pub fn same_record(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }

    /// The identity-bearing allocation behind the handle.
    pub(crate) fn cell(&self) -> &Arc<RwLock<Record>> {
        &self.cell
    }
}

impl From<Record> for SharedRecord {
    fn from(record: Record) -> Self {
        Self::new(record)
    }
}

impl fmt::Debug for SharedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedRecord")
            .field("record", &*self.cell.read())
            .finish()
    }
}
