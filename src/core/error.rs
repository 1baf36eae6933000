//! Error types for allocation runs.

use thiserror::Error;

use crate::core::model::VersionToken;

/// Errors that stop an allocation run.
///
/// Empty inputs are not errors; see [`crate::core::EmptyReason`].
#[derive(Debug, Error)]
pub enum AllocationError {
    /// The store could not be read consistently.
    #[error("snapshot unavailable: {0}")]
    SnapshotUnavailable(String),
    /// Persisted state moved on since the plan's snapshot was taken.
    #[error("stale snapshot: plan computed against {expected}, store is at {actual}")]
    StaleSnapshot {
        /// Token the plan was computed against.
        expected: VersionToken,
        /// Token currently persisted.
        actual: VersionToken,
    },
    /// A pipeline stage did not finish before the run deadline.
    #[error("deadline exceeded during {stage}")]
    Timeout {
        /// Stage that was running when the deadline passed.
        stage: &'static str,
    },
    /// The executor's transaction could not be committed.
    #[error("transaction failed: {0}")]
    TransactionFailure(String),
    /// A notice sink refused an assignment notice.
    #[error("notice delivery failed: {0}")]
    NoticeDelivery(String),
    /// Configuration rejected during validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AllocationError {
    /// Whether the caller may re-run the full pipeline and expect progress.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StaleSnapshot { .. })
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
