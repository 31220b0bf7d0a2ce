//! Account rules.

use crate::context::ContextualRecord;
use crate::core::{ColumnSet, Record, SharedRecord};
use crate::errors::{ConfigurationError, DomainValidationError};
use crate::handler::parse_settings;
use crate::pipeline::{RulePipeline, RuleResult};
use serde::{Deserialize, Serialize};

/// Attribute holding the account name.
pub const NAME: &str = "name";
/// Relation from an account to its primary contact.
pub const PRIMARY_CONTACT: &str = "primarycontactid";
/// Contact city attribute.
pub const CONTACT_CITY: &str = "address1_city";

/// Settings for the account update pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountRuleSettings {
    /// City written to primary contacts that have none.
    pub default_city: String,
    /// Names must be longer than this many characters.
    pub min_name_length: usize,
}

impl Default for AccountRuleSettings {
    fn default() -> Self {
        Self {
            default_city: "Wellington".to_string(),
            min_name_length: 3,
        }
    }
}

impl AccountRuleSettings {
    /// Parses settings from JSON, defaulting absent fields.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidConfiguration` on malformed JSON
    /// or JSON that is not an object.
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        parse_settings(json)
    }
}

/// Rejects accounts whose name is missing, blank or three characters or
/// fewer.
///
/// # Errors
///
/// Returns a `Canceled` `DomainValidationError`, or `MissingContextError`
/// if no context is attached under the strict trace policy.
pub fn ensure_account_name_greater_than_three_chars(record: SharedRecord) -> RuleResult {
    ensure_account_name_longer_than(3)(record)
}

/// Builds a rule rejecting names of `min_length` characters or fewer.
pub fn ensure_account_name_longer_than(
    min_length: usize,
) -> impl Fn(SharedRecord) -> RuleResult + Send + Sync + 'static {
    move |record: SharedRecord| {
        record.trace_with(|| format!("Validating account name length for account {}", display_id(&record)))?;

        let too_short = record
            .get(NAME)
            .as_ref()
            .and_then(|value| value.as_text())
            .map_or(true, |name| name.trim().is_empty() || name.chars().count() <= min_length);

        if too_short {
            return Err(DomainValidationError::canceled(format!(
                "Account name must be greater than {min_length} characters."
            ))
            .into());
        }
        Ok(record)
    }
}

/// Builds a rule that gives the account's primary contact `default_city`
/// when the contact has no city.
///
/// Accounts without a primary contact pass untouched. The contact is
/// updated with only the city attribute.
pub fn ensure_primary_contact_has_city(
    default_city: impl Into<String>,
) -> impl Fn(SharedRecord) -> RuleResult + Send + Sync + 'static {
    let default_city = default_city.into();
    move |record: SharedRecord| {
        let user_id = record.metadata()?.user_id;
        let contact = record
            .get(PRIMARY_CONTACT)
            .and_then(|value| value.as_reference().cloned());

        record.trace(&format!(
            "User {user_id} checking primary contact for account {} using {}",
            display_id(&record),
            contact.as_ref().map_or_else(|| "none".to_string(), ToString::to_string)
        ))?;

        let Some(contact) = contact else {
            record.trace("No primary contact set, skipping")?;
            return Ok(record);
        };

        let store = record.data_access()?;
        let stored = store.retrieve(&contact, &ColumnSet::new([CONTACT_CITY]))?;
        let has_city = stored
            .get(CONTACT_CITY)
            .is_some_and(|city| !city.is_cleared());

        if !has_city {
            let patch = Record::new(contact.logical_name.clone())
                .with_id(contact.id)
                .with_attribute(CONTACT_CITY, default_city.as_str());
            store.update(&patch)?;
            tracing::debug!(contact = %contact.id, city = %default_city, "Set primary contact city");
            record.trace_with(|| format!("Primary contact {} flagged by {user_id}", contact.id))?;
        }
        Ok(record)
    }
}

/// The account update pipeline: city backfill, then name validation.
#[must_use]
pub fn account_update_pipeline(settings: &AccountRuleSettings) -> RulePipeline {
    RulePipeline::new("account-update")
        .rule(
            "ensure_primary_contact_has_city",
            ensure_primary_contact_has_city(settings.default_city.clone()),
        )
        .rule(
            "ensure_account_name_greater_than_three_chars",
            ensure_account_name_longer_than(settings.min_name_length),
        )
}

fn display_id(record: &SharedRecord) -> String {
    record
        .id()
        .map_or_else(|| "(unsaved)".to_string(), |id| id.to_string())
}
