//! References to records and column selections.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Points at a stored record by logical name and id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityReference {
    /// Logical name of the referenced record type (e.g. `contact`).
    pub logical_name: String,
    /// Id of the referenced record.
    pub id: Uuid,
    /// Display name, when the host supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EntityReference {
    /// Creates a new reference.
    #[must_use]
    pub fn new(logical_name: impl Into<String>, id: Uuid) -> Self {
        Self {
            logical_name: logical_name.into(),
            id,
            name: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl fmt::Display for EntityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.logical_name, self.id)
    }
}

/// The set of attributes to load when retrieving a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSet {
    /// Whether every attribute should be loaded.
    pub all_columns: bool,
    /// The attributes to load when `all_columns` is false.
    pub columns: Vec<String>,
}

impl ColumnSet {
    /// Selects the given attributes.
    #[must_use]
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            all_columns: false,
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Selects every attribute.
    #[must_use]
    pub fn all() -> Self {
        Self {
            all_columns: true,
            columns: Vec::new(),
        }
    }

    /// Returns true if the attribute is part of the selection.
    #[must_use]
    pub fn includes(&self, column: &str) -> bool {
        self.all_columns || self.columns.iter().any(|c| c == column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_display() {
        let id = Uuid::new_v4();
        let reference = EntityReference::new("contact", id);
        assert_eq!(reference.to_string(), format!("contact({id})"));
    }

    #[test]
    fn test_column_set_includes() {
        let columns = ColumnSet::new(["address1_city"]);
        assert!(columns.includes("address1_city"));
        assert!(!columns.includes("name"));
        assert!(ColumnSet::all().includes("name"));
    }
}
