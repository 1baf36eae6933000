//! API-facing request/response models for `POST /allocations/run`.
//!
//! Authorization happens before this layer; the handler assumes an
//! administrator caller.

use serde::{Deserialize, Serialize};

use crate::core::{
    AllocationError, AllocationReport, AllocationService, AllocationStore, AssignmentDecision,
    EmptyReason, ResourceUsage, RunOutcome,
};

/// Route the trigger is mounted at.
pub const RUN_ROUTE: &str = "/allocations/run";

/// Body returned when the engine ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResponse {
    /// Always true for this shape.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Entities assigned in this run.
    pub assigned_count: usize,
    /// Entities still unassigned.
    pub unassigned_count: usize,
    /// Preference matches.
    pub matches: usize,
    /// Preference mismatches.
    pub mismatches: usize,
    /// Per-resource before/after figures.
    pub per_resource: Vec<ResourceUsage>,
    /// Decisions applied.
    pub assignments: Vec<AssignmentDecision>,
}

impl From<&AllocationReport> for RunResponse {
    fn from(report: &AllocationReport) -> Self {
        let considered = report.assigned + report.remaining_unassigned;
        Self {
            success: true,
            message: format!("assigned {} of {} entities", report.assigned, considered),
            assigned_count: report.assigned,
            unassigned_count: report.remaining_unassigned,
            matches: report.matches,
            mismatches: report.mismatches,
            per_resource: report.per_resource.clone(),
            assignments: report.assignments.clone(),
        }
    }
}

/// Body returned when the engine did not run to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error description.
    pub error: String,
    /// Machine-readable kind.
    pub kind: String,
    /// Whether re-invoking the run may succeed.
    pub retryable: bool,
}

/// Status code plus JSON body, ready for any HTTP framework.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// JSON body.
    pub body: serde_json::Value,
}

/// HTTP status for a failed run.
#[must_use]
pub const fn status_for_error(err: &AllocationError) -> u16 {
    match err {
        AllocationError::StaleSnapshot { .. } => 409,
        AllocationError::SnapshotUnavailable(_)
        | AllocationError::Timeout { .. }
        | AllocationError::TransactionFailure(_)
        | AllocationError::NoticeDelivery(_)
        | AllocationError::InvalidConfig(_) => 500,
    }
}

const fn error_kind(err: &AllocationError) -> &'static str {
    match err {
        AllocationError::StaleSnapshot { .. } => "stale_snapshot",
        AllocationError::SnapshotUnavailable(_) => "snapshot_unavailable",
        AllocationError::Timeout { .. } => "timeout",
        AllocationError::TransactionFailure(_) => "transaction_failure",
        AllocationError::NoticeDelivery(_) => "notice_delivery",
        AllocationError::InvalidConfig(_) => "invalid_config",
    }
}

const fn skip_kind(reason: EmptyReason) -> &'static str {
    match reason {
        EmptyReason::NoResources => "no_resources",
        EmptyReason::NothingToAssign => "nothing_to_assign",
    }
}

fn to_value<T: Serialize>(body: &T) -> serde_json::Value {
    serde_json::to_value(body).unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }))
}

/// Map a run result onto the trigger's response contract.
#[must_use]
pub fn respond(result: &Result<RunOutcome, AllocationError>) -> ApiResponse {
    match result {
        Ok(RunOutcome::Completed(report)) => ApiResponse {
            status: 200,
            body: to_value(&RunResponse::from(report)),
        },
        Ok(RunOutcome::Skipped(reason)) => ApiResponse {
            status: 422,
            body: to_value(&ErrorBody {
                error: reason.describe().to_string(),
                kind: skip_kind(*reason).to_string(),
                retryable: false,
            }),
        },
        Err(err) => ApiResponse {
            status: status_for_error(err),
            body: to_value(&ErrorBody {
                error: err.to_string(),
                kind: error_kind(err).to_string(),
                retryable: err.is_retryable(),
            }),
        },
    }
}

/// Handle `POST /allocations/run`.
pub async fn run_allocations<S>(service: &AllocationService<S>) -> ApiResponse
where
    S: AllocationStore + ?Sized,
{
    respond(&service.run().await)
}
