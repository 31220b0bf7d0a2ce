//! Contact rules.

use crate::context::ContextualRecord;
use crate::core::{Record, SharedRecord};
use crate::pipeline::{RulePipeline, RuleResult};
use chrono::{Duration, Utc};

/// Logical name of the task record type.
pub const TASK: &str = "task";

/// Creates a welcome e-mail task regarding a newly created contact.
///
/// The task is scheduled to start now and end an hour later. It regards
/// the contact when the contact already has an id.
///
/// # Errors
///
/// Returns `MissingContextError` without an attached context, or
/// `HostCommunicationFault` if the create call fails.
pub fn create_welcome_task(record: SharedRecord) -> RuleResult {
    let (first_name, email, regarding) = {
        let contact = record.read();
        (
            contact.get_text("firstname").unwrap_or_default().to_string(),
            contact.get_text("emailaddress1").unwrap_or_default().to_string(),
            contact.to_reference(),
        )
    };
    record.trace(&format!("email = {email}"))?;

    let now = Utc::now();
    let mut task = Record::new(TASK)
        .with_attribute("subject", "Welcome Email")
        .with_attribute(
            "description",
            format!("Welcome to our organization, {first_name}. Your email is {email}"),
        )
        .with_attribute("category", "Email")
        .with_attribute("actualdurationminutes", 30_i64)
        .with_attribute("scheduledstart", now)
        .with_attribute("scheduledend", now + Duration::hours(1));
    if let Some(regarding) = regarding {
        task.set("regardingobjectid", regarding);
    }

    record.trace("Creating Task")?;
    let task_id = record.data_access()?.create(&task)?;
    tracing::debug!(%task_id, "Created welcome task");
    record.trace("Task Created")?;
    Ok(record)
}

/// The contact create pipeline.
#[must_use]
pub fn contact_create_pipeline() -> RulePipeline {
    RulePipeline::new("contact-create").rule("create_welcome_task", create_welcome_task)
}
