//! Allocation engine core: model, planner, executor, report, and orchestration.

pub mod audit;
pub mod error;
pub mod executor;
pub mod model;
pub mod notice;
pub mod planner;
pub mod report;
pub mod service;
pub mod store;

pub use audit::{build_audit_event, AuditEvent, AuditSink, InMemoryAuditSink};
pub use error::{AllocationError, AppResult};
pub use executor::{ExecutionResult, PlanExecutor};
pub use model::{
    Assignable, AssignableId, PreferenceTag, Resource, ResourceId, Snapshot, VersionToken,
};
pub use notice::{AssignmentNotice, NoticeSink};
pub use planner::{
    per_resource_cap, plan, AssignmentDecision, AssignmentPlan, EmptyReason, PlanOutcome,
};
pub use report::{build_report, AllocationReport, ResourceUsage};
pub use service::{AllocationService, RunOutcome, RunStage};
pub use store::AllocationStore;
