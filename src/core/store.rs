//! Persistence seam consumed by the snapshot reader and the plan executor.

use async_trait::async_trait;

use crate::core::error::AllocationError;
use crate::core::model::{Snapshot, VersionToken};
use crate::core::planner::AssignmentDecision;

/// Abstraction for allocation state backends.
///
/// Implementations own `Resource.load` and `Assignable.resource`; nothing
/// else in the crate mutates them.
#[async_trait]
pub trait AllocationStore: Send + Sync {
    /// Read every unassigned entity and every resource in one consistent view.
    ///
    /// # Errors
    ///
    /// `SnapshotUnavailable` if a consistent read cannot be taken.
    async fn read_snapshot(&self) -> Result<Snapshot, AllocationError>;

    /// Apply all decisions in one transaction guarded by `expected`.
    ///
    /// Either every decision is applied and the version advances, or nothing
    /// changes. A batch that would push any touched resource past `cap` is
    /// rejected as a whole.
    ///
    /// The returned future runs under the run deadline and may be dropped
    /// before it resolves. Implementations must be cancel-safe: a dropped
    /// commit either has not changed anything or rolls back, so a `Timeout`
    /// always means no decision was applied.
    ///
    /// # Errors
    ///
    /// `StaleSnapshot` when the persisted version differs from `expected`;
    /// `TransactionFailure` when the batch is inconsistent with stored state
    /// or the commit itself fails.
    async fn commit(
        &self,
        expected: VersionToken,
        decisions: &[AssignmentDecision],
        cap: u32,
    ) -> Result<VersionToken, AllocationError>;
}
