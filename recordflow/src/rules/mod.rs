//! Business rules for accounts and contacts, and the registry wiring them
//! to record events.

pub mod account;
pub mod contact;

pub use account::{
    account_update_pipeline, ensure_account_name_greater_than_three_chars,
    ensure_account_name_longer_than, ensure_primary_contact_has_city, AccountRuleSettings,
};
pub use contact::{contact_create_pipeline, create_welcome_task};

use crate::pipeline::RuleRegistry;

/// Registers the account update and contact create pipelines.
#[must_use]
pub fn default_registry(settings: &AccountRuleSettings) -> RuleRegistry {
    RuleRegistry::new()
        .with("account", "Update", account_update_pipeline(settings))
        .with("contact", "Create", contact_create_pipeline())
}
