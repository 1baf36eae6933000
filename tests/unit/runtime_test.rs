//! Tests for the allocation trigger response contract

use std::sync::Arc;

use allocation_engine::builders::AllocationServiceBuilder;
use allocation_engine::config::AllocationConfig;
use allocation_engine::core::{
    AllocationError, Assignable, AssignableId, Resource, ResourceId, RunOutcome, VersionToken,
};
use allocation_engine::infra::InMemoryAllocationStore;
use allocation_engine::runtime::{respond, run_allocations, status_for_error, RUN_ROUTE};
use allocation_engine::util::SeedSource;

fn config() -> AllocationConfig {
    AllocationConfig {
        seed: SeedSource::Fixed(3),
        ..AllocationConfig::default()
    }
}

#[test]
fn test_route() {
    assert_eq!(RUN_ROUTE, "/allocations/run");
}

#[test]
fn test_error_status_mapping() {
    let stale = AllocationError::StaleSnapshot {
        expected: VersionToken(1),
        actual: VersionToken(2),
    };
    assert_eq!(status_for_error(&stale), 409);
    assert_eq!(
        status_for_error(&AllocationError::SnapshotUnavailable("down".into())),
        500
    );
    assert_eq!(status_for_error(&AllocationError::Timeout { stage: "execute" }), 500);
    assert_eq!(
        status_for_error(&AllocationError::TransactionFailure("x".into())),
        500
    );
}

#[test]
fn test_stale_body_is_retryable() {
    let response = respond(&Err(AllocationError::StaleSnapshot {
        expected: VersionToken(1),
        actual: VersionToken(2),
    }));
    assert_eq!(response.status, 409);
    assert_eq!(response.body["kind"], "stale_snapshot");
    assert_eq!(response.body["retryable"], true);
}

#[tokio::test]
async fn test_completed_run_is_200() {
    let store = Arc::new(
        InMemoryAllocationStore::new()
            .with_resource(Resource::new("r1", "A", 0))
            .with_assignable(Assignable::unassigned("s1", "B")),
    );
    let service = AllocationServiceBuilder::new(store, config()).build().unwrap();

    let response = run_allocations(&service).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["assignedCount"], 1);
    assert_eq!(response.body["unassignedCount"], 0);
    assert_eq!(response.body["matches"], 0);
    assert_eq!(response.body["mismatches"], 1);
    assert_eq!(response.body["perResource"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_all_resources_full_is_still_200() {
    let store = Arc::new(
        InMemoryAllocationStore::new()
            .with_resource(Resource::new("r1", "A", 0))
            .with_assignable(Assignable::unassigned("s1", "A"))
            .with_assignable(Assignable::unassigned("s2", "A")),
    );
    store
        .assign_manually(&AssignableId::new("s1"), &ResourceId::new("r1"))
        .unwrap();
    // One unassigned entity, one resource already at ceil(1/1) = 1.
    let service = AllocationServiceBuilder::new(Arc::clone(&store), config()).build().unwrap();

    let result = service.run().await;
    assert!(matches!(&result, Ok(RunOutcome::Completed(r)) if r.assigned == 0));
    let response = respond(&result);
    assert_eq!(response.status, 200);
    assert_eq!(response.body["unassignedCount"], 1);
}

#[tokio::test]
async fn test_skipped_runs_are_422() {
    let no_resources = Arc::new(
        InMemoryAllocationStore::new().with_assignable(Assignable::unassigned("s1", "A")),
    );
    let service = AllocationServiceBuilder::new(no_resources, config()).build().unwrap();
    let response = run_allocations(&service).await;
    assert_eq!(response.status, 422);
    assert_eq!(response.body["kind"], "no_resources");

    let nothing = Arc::new(InMemoryAllocationStore::new().with_resource(Resource::new("r1", "A", 0)));
    let service = AllocationServiceBuilder::new(nothing, config()).build().unwrap();
    let response = run_allocations(&service).await;
    assert_eq!(response.status, 422);
    assert_eq!(response.body["kind"], "nothing_to_assign");
}
