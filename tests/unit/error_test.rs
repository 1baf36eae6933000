//! Tests for error types

use allocation_engine::core::{AllocationError, VersionToken};

#[test]
fn test_stale_snapshot_error() {
    let err = AllocationError::StaleSnapshot {
        expected: VersionToken(3),
        actual: VersionToken(5),
    };
    assert_eq!(
        format!("{}", err),
        "stale snapshot: plan computed against v3, store is at v5"
    );
    assert!(err.is_retryable());
}

#[test]
fn test_snapshot_unavailable_error() {
    let err = AllocationError::SnapshotUnavailable("replica lag".to_string());
    assert_eq!(format!("{}", err), "snapshot unavailable: replica lag");
    assert!(!err.is_retryable());
}

#[test]
fn test_timeout_error() {
    let err = AllocationError::Timeout { stage: "snapshot" };
    assert_eq!(format!("{}", err), "deadline exceeded during snapshot");
    assert!(!err.is_retryable());
}

#[test]
fn test_transaction_failure_error() {
    let err = AllocationError::TransactionFailure("connection reset".to_string());
    assert_eq!(format!("{}", err), "transaction failed: connection reset");
}
