//! Service interfaces the host supplies to an invocation.

use crate::core::{ColumnSet, EntityReference, Record};
use crate::errors::HostCommunicationFault;
use std::sync::Arc;
use uuid::Uuid;

/// Read/write access to the host's record store, scoped to one user.
///
/// Implementations forward each call to the host and report host-side
/// failures as [`HostCommunicationFault`]; nothing here retries.
#[cfg_attr(test, mockall::automock)]
pub trait DataAccess: Send + Sync {
    /// Creates a record and returns its new id.
    fn create(&self, record: &Record) -> Result<Uuid, HostCommunicationFault>;

    /// Writes the attributes present on `record` to the stored record with
    /// the same id.
    fn update(&self, record: &Record) -> Result<(), HostCommunicationFault>;

    /// Loads the selected attributes of a stored record.
    fn retrieve(
        &self,
        reference: &EntityReference,
        columns: &ColumnSet,
    ) -> Result<Record, HostCommunicationFault>;
}

/// Produces data-access handles acting as a given user.
pub trait DataAccessFactory: Send + Sync {
    /// Returns a handle whose calls run with `user_id`'s permissions.
    fn create_for_user(&self, user_id: Uuid) -> Arc<dyn DataAccess>;
}
