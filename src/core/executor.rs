//! Plan executor: applies a plan against the store as one atomic unit.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::error::AllocationError;
use crate::core::model::{AssignableId, VersionToken};
use crate::core::planner::AssignmentPlan;
use crate::core::store::AllocationStore;

/// Outcome of a committed plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Number of decisions applied.
    pub applied: usize,
    /// Entities the plan could not place, unchanged.
    pub unplaced: Vec<AssignableId>,
    /// Version persisted after the commit.
    pub committed_version: VersionToken,
}

/// Applies plans through an [`AllocationStore`].
///
/// The executor knows nothing about ranking; it only enforces the version
/// guard and the all-or-nothing commit.
pub struct PlanExecutor<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for PlanExecutor<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> PlanExecutor<S>
where
    S: AllocationStore + ?Sized,
{
    /// Create an executor over a shared store.
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Commit every decision of `plan` or none of them.
    ///
    /// # Errors
    ///
    /// - `StaleSnapshot` if the store moved past the plan's version
    /// - `TransactionFailure` if the commit is rejected or fails
    pub async fn execute(&self, plan: &AssignmentPlan) -> Result<ExecutionResult, AllocationError> {
        let committed_version = match self
            .store
            .commit(plan.version, &plan.decisions, plan.per_resource_cap)
            .await
        {
            Ok(version) => version,
            Err(err @ AllocationError::StaleSnapshot { .. }) => {
                tracing::warn!("plan rejected: {}", err);
                return Err(err);
            }
            Err(err) => {
                tracing::error!("plan commit failed: {}", err);
                return Err(err);
            }
        };

        tracing::info!(
            applied = plan.decisions.len(),
            unplaced = plan.unplaced.len(),
            version = %committed_version,
            "plan committed"
        );

        Ok(ExecutionResult {
            applied: plan.decisions.len(),
            unplaced: plan.unplaced.clone(),
            committed_version,
        })
    }
}
