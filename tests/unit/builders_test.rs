//! Tests for builder modules

use std::sync::Arc;

use allocation_engine::builders::AllocationServiceBuilder;
use allocation_engine::config::AllocationConfig;
use allocation_engine::core::{
    AllocationError, Assignable, InMemoryAuditSink, Resource, RunOutcome, RunStage,
};
use allocation_engine::infra::{InMemoryAllocationStore, InMemoryNoticeOutbox};
use allocation_engine::util::SeedSource;
use parking_lot::Mutex;

fn store() -> Arc<InMemoryAllocationStore> {
    Arc::new(
        InMemoryAllocationStore::new()
            .with_resource(Resource::new("r1", "A", 0))
            .with_assignable(Assignable::unassigned("s1", "A"))
            .with_assignable(Assignable::unassigned("s2", "A")),
    )
}

#[test]
fn test_builder_defaults() {
    let builder = AllocationServiceBuilder::new(store(), AllocationConfig::default());
    assert_eq!(builder.config().global_max_capacity, 6);
}

#[test]
fn test_builder_rejects_invalid_config() {
    let result = AllocationServiceBuilder::new(store(), AllocationConfig::default())
        .global_max_capacity(0)
        .build();
    assert!(matches!(result, Err(AllocationError::InvalidConfig(_))));
}

#[tokio::test]
async fn test_builder_capacity_override_applies() {
    let config = AllocationConfig {
        seed: SeedSource::Fixed(1),
        ..AllocationConfig::default()
    };
    let store = store();
    let service = AllocationServiceBuilder::new(Arc::clone(&store), config)
        .global_max_capacity(1)
        .build()
        .unwrap();

    match service.run().await.unwrap() {
        RunOutcome::Completed(report) => {
            assert_eq!(report.per_resource_cap, 1);
            assert_eq!(report.assigned, 1);
            assert_eq!(report.remaining_unassigned, 1);
        }
        RunOutcome::Skipped(reason) => panic!("unexpected skip: {reason:?}"),
    }
    assert_eq!(store.unassigned_count(), 1);
}

#[tokio::test]
async fn test_default_audit_log_and_outbox_are_readable() {
    let config = AllocationConfig {
        seed: SeedSource::Fixed(2),
        ..AllocationConfig::default()
    };
    let outbox = Arc::new(Mutex::new(InMemoryNoticeOutbox::new()));
    let service = AllocationServiceBuilder::new(store(), config)
        .notices(Box::new(Arc::clone(&outbox)))
        .build()
        .unwrap();

    let RunOutcome::Completed(report) = service.run().await.unwrap() else {
        panic!("expected completed run");
    };
    let skipped = service.run().await.unwrap();
    assert!(matches!(skipped, RunOutcome::Skipped(_)));

    let log = service.audit_log().unwrap();
    assert_eq!(
        log.lock().actions_for(report.run_id),
        vec!["snapshot", "planned", "executed", "reported"]
    );
    let actions: Vec<String> = log.lock().events().into_iter().map(|e| e.action).collect();
    assert_eq!(actions.last().map(String::as_str), Some("skipped"));

    let notices = outbox.lock().drain();
    assert_eq!(notices.len(), 2);
    assert!(notices.iter().all(|n| n.run_id == report.run_id));
}

#[test]
fn test_explicit_audit_sink_replaces_default_log() {
    let shared = Arc::new(Mutex::new(InMemoryAuditSink::new(4)));
    let service = AllocationServiceBuilder::new(store(), AllocationConfig::default())
        .audit(Box::new(Arc::clone(&shared)))
        .build()
        .unwrap();
    assert!(service.audit_log().is_none());
}

#[test]
fn test_run_stage_names() {
    let names: Vec<&str> = [
        RunStage::Snapshot,
        RunStage::Planned,
        RunStage::Executed,
        RunStage::Reported,
        RunStage::Skipped,
        RunStage::Failed,
    ]
    .into_iter()
    .map(RunStage::as_str)
    .collect();
    assert_eq!(
        names,
        vec!["snapshot", "planned", "executed", "reported", "skipped", "failed"]
    );
}
