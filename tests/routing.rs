//! End-to-end routing scenarios over the public API.

use datawatch::{
    config::ReceiverConfig,
    core::{Level, Message, Rendered},
    filtering::HasFieldsFilter,
    formatting,
    registry::FilterRegistry,
    routing::Group,
};
use serde_json::json;
use std::sync::Arc;

fn check_batch() -> Vec<Message> {
    vec![
        Message::from_value(json!({
            "level": "INFO",
            "details": "nightly load completed",
        })),
        Message::from_value(json!({
            "level": "ERROR",
            "table_name": "orders",
            "db": "prod",
            "check_status": "FAIL",
            "check_time": "2026-08-27T04:15:00Z",
            "details": "row count mismatch",
        })),
    ]
}

#[test]
fn email_and_log_receivers_apply_their_own_policies() {
    let formatters = Arc::new(formatting::builtin_registry());

    let mut filters = FilterRegistry::filters();
    filters.register(
        "is_db_check",
        Arc::new(HasFieldsFilter::new([
            "table_name",
            "db",
            "check_status",
            "check_time",
        ])),
    );
    let filters = Arc::new(filters);

    let email = ReceiverConfig {
        dest: "email".to_string(),
        level: "WARNING".to_string(),
        formatter: None,
        filters: vec![],
    };
    let log = ReceiverConfig {
        dest: "log".to_string(),
        level: "NOTSET".to_string(),
        formatter: Some("human_readable".to_string()),
        filters: vec!["is_db_check".to_string()],
    };

    let group = Group::new("db_checks", vec![email, log], formatters, filters);
    let batch = check_batch();
    let deliveries = group.deliver(&batch, Some("nightly checks")).unwrap();

    assert_eq!(deliveries.len(), 2);

    // The email receiver drops the INFO message on its WARNING threshold and
    // passes the ERROR message through unformatted.
    let email_delivery = &deliveries[0];
    assert_eq!(email_delivery.dest, "email");
    assert_eq!(email_delivery.payload.subject.as_deref(), Some("nightly checks"));
    assert_eq!(email_delivery.payload.messages.len(), 1);
    match &email_delivery.payload.messages[0] {
        Rendered::Raw(message) => {
            assert_eq!(message.level(), Level::Error);
            assert_eq!(*message, batch[1]);
        }
        other => panic!("expected a raw pass-through, got {other:?}"),
    }

    // The log receiver filters out the INFO message (not a db check) and
    // renders the ERROR message as a human-readable report.
    let log_delivery = &deliveries[1];
    assert_eq!(log_delivery.dest, "log");
    assert_eq!(log_delivery.payload.messages.len(), 1);
    match &log_delivery.payload.messages[0] {
        Rendered::Text(text) => {
            assert!(text.contains("FAIL on orders (prod)"), "got: {text}");
            assert!(text.contains('\n'), "report should be multi-line");
            assert!(text.contains("row count mismatch"));
        }
        other => panic!("expected rendered text, got {other:?}"),
    }
}

#[test]
fn registries_can_be_swapped_between_deliveries() {
    // Receivers are built fresh on every deliver call, so a group created
    // before a capability exists starts working once a registry that has it
    // is supplied.
    let formatters = Arc::new(formatting::builtin_registry());
    let empty_filters = Arc::new(FilterRegistry::filters());

    let config = ReceiverConfig {
        dest: "log".to_string(),
        level: "NOTSET".to_string(),
        formatter: None,
        filters: vec!["is_db_check".to_string()],
    };

    let group = Group::new(
        "db_checks",
        vec![config.clone()],
        formatters.clone(),
        empty_filters,
    );
    assert!(group.deliver(&check_batch(), None).is_err());

    let mut filters = FilterRegistry::filters();
    filters.register("is_db_check", Arc::new(HasFieldsFilter::new(["db"])));
    let group = Group::new("db_checks", vec![config], formatters, Arc::new(filters));
    let deliveries = group.deliver(&check_batch(), None).unwrap();
    assert_eq!(deliveries[0].payload.messages.len(), 1);
}

#[test]
fn every_receiver_sees_the_full_batch() {
    // Fan-out is independent per receiver: one receiver dropping a message
    // does not hide it from the next.
    let formatters = Arc::new(formatting::builtin_registry());
    let filters = Arc::new(FilterRegistry::filters());

    let strict = ReceiverConfig {
        dest: "pager".to_string(),
        level: "CRITICAL".to_string(),
        formatter: None,
        filters: vec![],
    };
    let lax = ReceiverConfig {
        dest: "archive".to_string(),
        level: "NOTSET".to_string(),
        formatter: None,
        filters: vec![],
    };

    let group = Group::new("all", vec![strict, lax], formatters, filters);
    let deliveries = group.deliver(&check_batch(), None).unwrap();

    assert!(deliveries[0].payload.messages.is_empty());
    assert_eq!(deliveries[1].payload.messages.len(), 2);
}
