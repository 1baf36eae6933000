//! Allocation service: sequences snapshot, plan, execute, and report.
//!
//! The pipeline is strictly linear:
//!
//! ```text
//! SNAPSHOT -> PLANNED -> EXECUTED -> REPORTED
//! ```
//!
//! Any stage may fail fast with a typed error. There is no internal retry;
//! a `StaleSnapshot` tells the caller to invoke [`AllocationService::run`]
//! again from scratch.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::time::{timeout_at, Instant};
use uuid::Uuid;

use crate::config::AllocationConfig;
use crate::core::audit::{build_audit_event, AuditSink, InMemoryAuditSink};
use crate::core::error::AllocationError;
use crate::core::executor::PlanExecutor;
use crate::core::notice::{AssignmentNotice, NoticeSink};
use crate::core::planner::{plan, EmptyReason, PlanOutcome};
use crate::core::report::{build_report, AllocationReport};
use crate::core::store::AllocationStore;
use crate::util::clock::now_ms;

/// Stages of an allocation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    /// Consistent read taken.
    Snapshot,
    /// Plan computed.
    Planned,
    /// Plan committed.
    Executed,
    /// Report built.
    Reported,
    /// Planner found nothing to do; nothing was committed.
    Skipped,
    /// A stage failed; nothing was committed by this run.
    Failed,
}

impl RunStage {
    /// Lower-case stage name used in logs and audit events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Snapshot => "snapshot",
            Self::Planned => "planned",
            Self::Executed => "executed",
            Self::Reported => "reported",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

/// Result of a run that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The plan was committed; some entities may remain unplaced.
    Completed(AllocationReport),
    /// Nothing was planned and nothing changed.
    Skipped(EmptyReason),
}

type SharedAudit = Arc<Mutex<Box<dyn AuditSink>>>;
type SharedNotices = Arc<Mutex<Box<dyn NoticeSink>>>;

/// Orchestrates allocation runs against a store.
pub struct AllocationService<S: ?Sized> {
    store: Arc<S>,
    executor: PlanExecutor<S>,
    config: AllocationConfig,
    audit: Option<SharedAudit>,
    audit_log: Option<Arc<Mutex<InMemoryAuditSink>>>,
    notices: Option<SharedNotices>,
}

impl<S> AllocationService<S>
where
    S: AllocationStore + ?Sized,
{
    /// Create a service from a store and configuration.
    pub fn new(store: Arc<S>, config: AllocationConfig) -> Self {
        Self {
            executor: PlanExecutor::new(Arc::clone(&store)),
            store,
            config,
            audit: None,
            audit_log: None,
            notices: None,
        }
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(Arc::new(Mutex::new(audit)));
        self.audit_log = None;
        self
    }

    /// Record into a shared in-memory log that stays readable through
    /// [`Self::audit_log`].
    #[must_use]
    pub fn with_audit_log(mut self, log: Arc<Mutex<InMemoryAuditSink>>) -> Self {
        self = self.with_audit(Box::new(Arc::clone(&log)));
        self.audit_log = Some(log);
        self
    }

    /// In-memory audit log, when the service records into one.
    #[must_use]
    pub fn audit_log(&self) -> Option<Arc<Mutex<InMemoryAuditSink>>> {
        self.audit_log.clone()
    }

    /// Attach a notice sink for newly created assignments.
    #[must_use]
    pub fn with_notices(mut self, notices: Box<dyn NoticeSink>) -> Self {
        self.notices = Some(Arc::new(Mutex::new(notices)));
        self
    }

    /// Configuration in effect.
    pub const fn config(&self) -> &AllocationConfig {
        &self.config
    }

    /// Run the full pipeline with the configured seed source.
    ///
    /// # Errors
    ///
    /// `SnapshotUnavailable`, `StaleSnapshot`, `Timeout`, or
    /// `TransactionFailure`. No error leaves partial mutations behind.
    pub async fn run(&self) -> Result<RunOutcome, AllocationError> {
        self.run_with_seed(self.config.seed.next_seed()).await
    }

    /// Run the full pipeline with an explicit seed.
    ///
    /// # Errors
    ///
    /// Same as [`Self::run`].
    pub async fn run_with_seed(&self, seed: u64) -> Result<RunOutcome, AllocationError> {
        let run_id = Uuid::new_v4();
        let deadline = Instant::now() + self.config.deadline();
        tracing::info!(%run_id, seed, "allocation run started");

        let result = self.run_stages(run_id, seed, deadline).await;
        match &result {
            Ok(RunOutcome::Completed(report)) => tracing::info!(
                %run_id,
                assigned = report.assigned,
                unassigned = report.remaining_unassigned,
                matches = report.matches,
                mismatches = report.mismatches,
                "allocation run finished"
            ),
            Ok(RunOutcome::Skipped(reason)) => {
                tracing::info!(%run_id, "allocation run skipped: {}", reason.describe());
            }
            Err(err) => {
                tracing::warn!(%run_id, "allocation run failed: {}", err);
                self.record(run_id, RunStage::Failed, Some(err.to_string()));
            }
        }
        result
    }

    async fn run_stages(
        &self,
        run_id: Uuid,
        seed: u64,
        deadline: Instant,
    ) -> Result<RunOutcome, AllocationError> {
        let snapshot = timeout_at(deadline, self.store.read_snapshot())
            .await
            .map_err(|_| AllocationError::Timeout {
                stage: RunStage::Snapshot.as_str(),
            })??;
        self.record(
            run_id,
            RunStage::Snapshot,
            Some(format!(
                "version={} assignables={} resources={}",
                snapshot.version,
                snapshot.assignables.len(),
                snapshot.resources.len()
            )),
        );

        let mut rng = StdRng::seed_from_u64(seed);
        let plan = match plan(
            &snapshot.assignables,
            &snapshot.resources,
            snapshot.version,
            self.config.global_max_capacity,
            &mut rng,
        ) {
            PlanOutcome::Ready(plan) => plan,
            PlanOutcome::Empty(reason) => {
                self.record(run_id, RunStage::Skipped, Some(reason.describe().to_string()));
                return Ok(RunOutcome::Skipped(reason));
            }
        };
        self.record(
            run_id,
            RunStage::Planned,
            Some(format!(
                "decisions={} unplaced={} cap={}",
                plan.decisions.len(),
                plan.unplaced.len(),
                plan.per_resource_cap
            )),
        );

        let execution = timeout_at(deadline, self.executor.execute(&plan))
            .await
            .map_err(|_| AllocationError::Timeout { stage: "execute" })??;
        self.record(
            run_id,
            RunStage::Executed,
            Some(format!("version={}", execution.committed_version)),
        );

        let report = build_report(run_id, &snapshot, &plan, &execution);
        self.record(run_id, RunStage::Reported, None);
        self.emit_notices(&report);

        Ok(RunOutcome::Completed(report))
    }

    /// Read a snapshot and plan without executing.
    ///
    /// Nothing is mutated, so previews may run concurrently with each other
    /// and with real runs.
    ///
    /// # Errors
    ///
    /// `SnapshotUnavailable` or `Timeout` from the snapshot read.
    pub async fn preview(&self, seed: Option<u64>) -> Result<PlanOutcome, AllocationError> {
        let deadline = Instant::now() + self.config.deadline();
        let snapshot = timeout_at(deadline, self.store.read_snapshot())
            .await
            .map_err(|_| AllocationError::Timeout {
                stage: RunStage::Snapshot.as_str(),
            })??;
        let seed = seed.unwrap_or_else(|| self.config.seed.next_seed());
        let mut rng = StdRng::seed_from_u64(seed);
        Ok(plan(
            &snapshot.assignables,
            &snapshot.resources,
            snapshot.version,
            self.config.global_max_capacity,
            &mut rng,
        ))
    }

    fn record(&self, run_id: Uuid, stage: RunStage, payload: Option<String>) {
        if let Some(audit) = self.audit.as_ref() {
            audit.lock().record(build_audit_event(run_id, stage.as_str(), payload));
        }
    }

    fn emit_notices(&self, report: &AllocationReport) {
        let Some(notices) = self.notices.as_ref() else {
            return;
        };
        let created_at_ms = now_ms();
        let mut sink = notices.lock();
        for decision in &report.assignments {
            let notice = AssignmentNotice {
                run_id: report.run_id,
                assignable: decision.assignable.clone(),
                resource: decision.resource.clone(),
                preference_matched: decision.preference_matched,
                created_at_ms,
            };
            if let Err(e) = sink.deliver(notice) {
                tracing::error!(run_id = %report.run_id, "failed to deliver notice: {}", e);
            }
        }
    }
}
