//! In-memory notice outbox.

use std::collections::HashMap;

use crate::core::{AllocationError, AssignmentNotice, NoticeSink};
use crate::core::model::ResourceId;

/// Outbox that keeps notices grouped by resource until drained.
#[derive(Debug, Default)]
pub struct InMemoryNoticeOutbox {
    by_resource: HashMap<ResourceId, Vec<AssignmentNotice>>,
    max_notices: Option<usize>,
    len: usize,
}

impl InMemoryNoticeOutbox {
    /// Create an unbounded outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an outbox that refuses notices past `max_notices`.
    #[must_use]
    pub fn bounded(max_notices: usize) -> Self {
        Self {
            max_notices: Some(max_notices),
            ..Self::default()
        }
    }

    /// Notices waiting for a resource owner.
    #[must_use]
    pub fn pending_for(&self, resource: &ResourceId) -> Vec<AssignmentNotice> {
        self.by_resource.get(resource).cloned().unwrap_or_default()
    }

    /// Take every pending notice.
    pub fn drain(&mut self) -> Vec<AssignmentNotice> {
        self.len = 0;
        let mut all: Vec<AssignmentNotice> = self.by_resource.drain().flat_map(|(_, v)| v).collect();
        all.sort_by(|a, b| {
            a.created_at_ms
                .cmp(&b.created_at_ms)
                .then_with(|| a.assignable.cmp(&b.assignable))
        });
        all
    }

    /// Number of pending notices.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing is pending.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl NoticeSink for InMemoryNoticeOutbox {
    fn deliver(&mut self, notice: AssignmentNotice) -> Result<(), AllocationError> {
        if self.max_notices.is_some_and(|max| self.len >= max) {
            return Err(AllocationError::NoticeDelivery(format!(
                "outbox full, dropping notice for {}",
                notice.assignable
            )));
        }
        self.by_resource
            .entry(notice.resource.clone())
            .or_default()
            .push(notice);
        self.len += 1;
        Ok(())
    }
}
