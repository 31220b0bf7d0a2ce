//! Cross-cutting tests for context attachment, merging and invocations.

#[cfg(test)]
mod tests {
    use crate::context::{
        attach, ContextualRecord, InvocationMetadata, RuntimeContext, TracePolicy, TracePolicyScope,
    };
    use crate::core::{AttributeValue, EntityReference, OperationStatus, Record, SharedRecord};
    use crate::errors::RecordflowError;
    use crate::handler::{HandlerConfig, InvocationHandler, InvocationOutcome};
    use crate::merge::merge_pre_image;
    use crate::observability::{CollectingTraceSink, NoOpTraceSink};
    use crate::rules::{default_registry, AccountRuleSettings};
    use crate::testing::{
        assert_entry_exit, assert_not_traced, assert_traced, InMemoryDataAccess, TestInvocation,
    };
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::sync::Arc;
    use uuid::Uuid;

    fn context() -> Arc<RuntimeContext> {
        Arc::new(RuntimeContext::new(
            Arc::new(InMemoryDataAccess::new()),
            Arc::new(NoOpTraceSink),
            InvocationMetadata::new("Update", "account", Uuid::new_v4()),
        ))
    }

    fn account_handler() -> InvocationHandler {
        InvocationHandler::new(
            "PluginAccountUpdatePreOperation",
            HandlerConfig::default(),
            default_registry(&AccountRuleSettings::default()),
        )
    }

    #[test]
    fn test_attach_then_lookup_and_last_write_wins() {
        let record = SharedRecord::new(Record::new("account"));
        let first = context();
        let second = context();

        attach(Some(&record), Some(first.clone())).unwrap();
        assert!(Arc::ptr_eq(&record.context().unwrap(), &first));

        attach(Some(&record), Some(second.clone())).unwrap();
        assert!(Arc::ptr_eq(&record.context().unwrap(), &second));
    }

    #[test]
    fn test_attach_rejects_absent_arguments() {
        let record = SharedRecord::new(Record::new("account"));

        assert_eq!(attach(None, Some(context())).unwrap_err().to_string(), "Argument 'record' must be supplied");
        assert_eq!(attach(Some(&record), None).unwrap_err().to_string(), "Argument 'context' must be supplied");
        assert!(!record.has_context());
    }

    #[test]
    fn test_never_attached_record_has_no_context() {
        let record = SharedRecord::new(Record::new("contact"));

        assert!(record.context().is_err());
        assert!(record.data_access().is_err());
        assert!(record.metadata().is_err());
    }

    #[test]
    fn test_equal_records_do_not_share_context() {
        let a = SharedRecord::new(Record::new("account").with_attribute("name", "Same"));
        let b = SharedRecord::new(Record::new("account").with_attribute("name", "Same"));

        a.use_context(context());

        assert!(a.has_context());
        assert!(!b.has_context());
        assert!(a.clone().has_context());
    }

    #[test]
    fn test_trace_policy_on_unattached_record() {
        let record = SharedRecord::new(Record::new("account"));

        {
            let _strict = TracePolicyScope::enter(TracePolicy::StrictThrow);
            assert!(record.trace("x").is_err());
        }
        {
            let _safe = TracePolicyScope::enter(TracePolicy::SafeNoOp);
            let calls = Cell::new(0);
            record
                .trace_with(|| {
                    calls.set(calls.get() + 1);
                    "expensive".to_string()
                })
                .unwrap();
            assert_eq!(calls.get(), 0);
            // Service access is never suppressed.
            assert!(record.data_access().is_err());
        }
    }

    #[test]
    fn test_merge_properties() {
        let pres = [
            Record::new("account"),
            Record::new("account").with_attribute("city", "Auckland"),
            Record::new("account")
                .with_attribute("name", "Old")
                .with_attribute("city", "Auckland")
                .with_attribute("employees", 4_i64),
        ];
        let posts = [
            Record::new("account"),
            Record::new("account").with_attribute("name", "New"),
            {
                let mut post = Record::new("account").with_attribute("employees", 9_i64);
                post.clear_value("city");
                post
            },
        ];

        for pre in &pres {
            for post in &posts {
                let mut merged = post.clone();
                merge_pre_image(&mut merged, Some(pre));

                let mut twice = merged.clone();
                merge_pre_image(&mut twice, Some(pre));
                assert_eq!(twice, merged);

                for (key, value) in &post.attributes {
                    assert_eq!(merged.get(key), Some(value));
                }
                for (key, value) in &pre.attributes {
                    if !post.contains(key) {
                        assert_eq!(merged.get(key), Some(value));
                    }
                }
            }
        }
    }

    #[test]
    fn test_scenario_fill_city_from_pre_image() {
        let mut post = Record::new("account");
        merge_pre_image(&mut post, Some(&Record::new("account").with_attribute("city", "Auckland")));

        assert_eq!(post.get("city"), Some(&AttributeValue::Text("Auckland".to_string())));
        assert_eq!(post.len(), 1);
    }

    #[test]
    fn test_scenario_short_name_cancels_without_writes() {
        let fixture = TestInvocation::new("Update", Record::new("account").with_attribute("name", "A"))
            .with_pre_image("pre", Record::new("account"));

        let err = account_handler().execute(&fixture.host()).unwrap_err();

        let RecordflowError::DomainValidation(validation) = &err else {
            panic!("expected a domain validation error, got {err:?}");
        };
        assert_eq!(validation.status, OperationStatus::Canceled);
        assert!(validation.message.contains("greater than 3 characters"));
        assert!(fixture.store().updates().is_empty());
        assert!(fixture.store().creates().is_empty());
        assert_entry_exit(&fixture.sink(), "PluginAccountUpdatePreOperation");
    }

    #[test]
    fn test_scenario_primary_contact_city_backfill() {
        let contact_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let store = Arc::new(
            InMemoryDataAccess::new()
                .with_record(Record::new("contact").with_id(contact_id).with_attribute("firstname", "Ana")),
        );
        let fixture = TestInvocation::new("Update", Record::new("account").with_attribute("name", "Contoso"))
            .with_pre_image(
                "pre",
                Record::new("account").with_attribute("primarycontactid", EntityReference::new("contact", contact_id)),
            )
            .with_store(store.clone())
            .with_user(user_id);

        let report = account_handler().execute(&fixture.host()).unwrap();

        assert_eq!(report.outcome, InvocationOutcome::Completed);
        assert_eq!(report.copied_from_pre_image, 1);
        let updates = store.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].id, Some(contact_id));
        assert_eq!(updates[0].get_text("address1_city"), Some("Wellington"));
        assert_eq!(fixture.factory().requested_users(), vec![user_id]);
        assert_traced(&fixture.sink(), &format!("Primary contact {contact_id} flagged by {user_id}"));
    }

    #[test]
    fn test_scenario_contact_with_city_is_left_alone() {
        let contact_id = Uuid::new_v4();
        let store = Arc::new(InMemoryDataAccess::new().with_record(
            Record::new("contact")
                .with_id(contact_id)
                .with_attribute("address1_city", "Auckland"),
        ));
        let fixture = TestInvocation::new(
            "Update",
            Record::new("account")
                .with_attribute("name", "Contoso")
                .with_attribute("primarycontactid", EntityReference::new("contact", contact_id)),
        )
        .with_pre_image("pre", Record::new("account"))
        .with_store(store.clone());

        account_handler().execute(&fixture.host()).unwrap();

        assert!(store.updates().is_empty());
        assert_not_traced(&fixture.sink(), "flagged by");
    }

    #[test]
    fn test_scenario_passing_invocation_traces_entry_and_exit_once() {
        let fixture = TestInvocation::new("Update", Record::new("account").with_attribute("name", "Contoso"))
            .with_pre_image("pre", Record::new("account").with_attribute("address1_city", "Auckland"));

        let report = account_handler().execute(&fixture.host()).unwrap();

        assert_eq!(
            report.executed_rules,
            vec![
                "ensure_primary_contact_has_city".to_string(),
                "ensure_account_name_greater_than_three_chars".to_string(),
            ]
        );
        assert_entry_exit(&fixture.sink(), "PluginAccountUpdatePreOperation");
        assert_traced(&fixture.sink(), "No primary contact set, skipping");
    }

    #[test]
    fn test_contact_create_invocation_creates_task() {
        let fixture = TestInvocation::new(
            "Create",
            Record::new("contact")
                .with_id(Uuid::new_v4())
                .with_attribute("firstname", "Ana")
                .with_attribute("emailaddress1", "ana@example.com"),
        );
        let handler = InvocationHandler::new(
            "PluginContactCreate",
            HandlerConfig::default().without_pre_image(),
            default_registry(&AccountRuleSettings::default()),
        );

        handler.execute(&fixture.host()).unwrap();

        let creates = fixture.store().creates();
        assert_eq!(creates.len(), 1);
        assert_eq!(creates[0].get_text("subject"), Some("Welcome Email"));
        assert_entry_exit(&fixture.sink(), "PluginContactCreate");
    }

    #[test]
    fn test_concurrent_invocations_stay_isolated() {
        let handler = account_handler();

        std::thread::scope(|scope| {
            for i in 0..8 {
                let handler = &handler;
                scope.spawn(move || {
                    let fixture = TestInvocation::new(
                        "Update",
                        Record::new("account").with_attribute("name", format!("Account {i}")),
                    )
                    .with_pre_image("pre", Record::new("account"));

                    handler.execute(&fixture.host()).unwrap();

                    let sink: Arc<CollectingTraceSink> = fixture.sink();
                    let correlation = fixture.metadata().correlation_id.to_string();
                    assert!(sink.lines_starting_with("Entered")[0].contains(&correlation));
                    assert_entry_exit(&sink, "PluginAccountUpdatePreOperation");
                });
            }
        });
    }
}
