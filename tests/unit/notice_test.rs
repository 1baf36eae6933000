//! Tests for assignment notice delivery

use std::sync::Arc;

use allocation_engine::builders::AllocationServiceBuilder;
use allocation_engine::config::AllocationConfig;
use allocation_engine::core::{
    AllocationError, AssignmentNotice, NoticeSink, Resource, ResourceId, RunOutcome,
};
use allocation_engine::core::Assignable;
use allocation_engine::infra::{InMemoryAllocationStore, InMemoryNoticeOutbox};
use allocation_engine::util::SeedSource;
use parking_lot::Mutex;

struct RefusingSink;

impl NoticeSink for RefusingSink {
    fn deliver(&mut self, _notice: AssignmentNotice) -> Result<(), AllocationError> {
        Err(AllocationError::NoticeDelivery("offline".into()))
    }
}

fn config() -> AllocationConfig {
    AllocationConfig {
        seed: SeedSource::Fixed(11),
        ..AllocationConfig::default()
    }
}

fn store() -> Arc<InMemoryAllocationStore> {
    Arc::new(
        InMemoryAllocationStore::new()
            .with_resource(Resource::new("r1", "A", 0))
            .with_resource(Resource::new("r2", "B", 0))
            .with_assignable(Assignable::unassigned("s1", "A"))
            .with_assignable(Assignable::unassigned("s2", "B")),
    )
}

#[tokio::test]
async fn test_one_notice_per_new_pair() {
    let outbox = Arc::new(Mutex::new(InMemoryNoticeOutbox::new()));
    let service = AllocationServiceBuilder::new(store(), config())
        .notices(Box::new(Arc::clone(&outbox)))
        .build()
        .unwrap();

    let RunOutcome::Completed(report) = service.run().await.unwrap() else {
        panic!("expected completed run");
    };

    assert_eq!(outbox.lock().pending_for(&ResourceId::new("r2")).len(), 1);
    let notices = outbox.lock().drain();
    assert!(outbox.lock().is_empty());
    assert_eq!(notices.len(), 2);
    assert!(notices.iter().all(|n| n.run_id == report.run_id));
    assert!(notices.iter().all(|n| n.preference_matched));
    assert!(notices
        .iter()
        .any(|n| n.assignable.as_str() == "s1" && n.resource == ResourceId::new("r1")));
}

#[tokio::test]
async fn test_refusing_sink_does_not_fail_run() {
    let store = store();
    let service = AllocationServiceBuilder::new(Arc::clone(&store), config())
        .notices(Box::new(RefusingSink))
        .build()
        .unwrap();

    assert!(matches!(service.run().await, Ok(RunOutcome::Completed(_))));
    assert_eq!(store.unassigned_count(), 0);
}
