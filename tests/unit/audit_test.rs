//! Tests for audit sink

use allocation_engine::core::{build_audit_event, AuditSink, InMemoryAuditSink};
use uuid::Uuid;

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);
    let run_id = Uuid::new_v4();

    sink.record(build_audit_event(run_id, "snapshot", Some("version=v1".to_string())));
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0].event_id, format!("{run_id}-snapshot"));
    assert_eq!(events[0].run_id, run_id);
    assert_eq!(events[0].action, "snapshot");
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);
    let run_id = Uuid::new_v4();

    sink.record(build_audit_event(run_id, "snapshot", None));
    sink.record(build_audit_event(run_id, "planned", None));
    sink.record(build_audit_event(run_id, "executed", None));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].action, "planned"); // First one popped
    assert_eq!(events[1].action, "executed");
}

#[test]
fn test_actions_for_filters_by_run() {
    let mut sink = InMemoryAuditSink::new(10);
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();

    sink.record(build_audit_event(first, "snapshot", None));
    sink.record(build_audit_event(second, "snapshot", None));
    sink.record(build_audit_event(first, "skipped", None));

    assert_eq!(sink.actions_for(first), vec!["snapshot", "skipped"]);
    assert_eq!(sink.actions_for(second), vec!["snapshot"]);
}

#[test]
fn test_build_audit_event() {
    let run_id = Uuid::nil();
    let event = build_audit_event(run_id, "reported", Some("ok".to_string()));

    assert_eq!(event.run_id, run_id);
    assert_eq!(event.action, "reported");
    assert_eq!(event.payload, Some("ok".to_string()));
    assert!(event.created_at_ms > 0);
}
