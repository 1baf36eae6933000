//! Assignment notices handed to downstream notification collaborators.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::error::AllocationError;
use crate::core::model::{AssignableId, ResourceId};

/// One newly created assignment, emitted after a successful commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentNotice {
    /// Run that created the assignment.
    pub run_id: Uuid,
    /// Entity that was assigned.
    pub assignable: AssignableId,
    /// Resource it was assigned to.
    pub resource: ResourceId,
    /// Whether the preference tags matched.
    pub preference_matched: bool,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
}

/// Abstraction for notice outboxes.
///
/// Delivery and persistence of the actual notifications belong to the sink;
/// a failing sink never undoes a committed run.
pub trait NoticeSink: Send {
    /// Accept one notice.
    ///
    /// # Errors
    ///
    /// `NoticeDelivery` when the sink cannot take the notice.
    fn deliver(&mut self, notice: AssignmentNotice) -> Result<(), AllocationError>;
}

impl<T: NoticeSink> NoticeSink for Arc<Mutex<T>> {
    fn deliver(&mut self, notice: AssignmentNotice) -> Result<(), AllocationError> {
        self.lock().deliver(notice)
    }
}
