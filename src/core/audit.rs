//! Audit trail for allocation runs.
//!
//! Each pipeline stage transition is recorded as one event keyed by run id.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::util::clock::now_ms;

/// Audit event structure.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: String,
    /// Run the event belongs to.
    pub run_id: Uuid,
    /// Stage reached (snapshot, planned, executed, reported, skipped, failed).
    pub action: String,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
    /// Additional context.
    pub payload: Option<String>,
}

/// Audit sink abstraction.
pub trait AuditSink: Send {
    /// Record an audit event.
    fn record(&mut self, event: AuditEvent);
}

/// A shared sink records through its lock, so the caller can keep a handle
/// and read back what the service recorded.
impl<T: AuditSink> AuditSink for Arc<Mutex<T>> {
    fn record(&mut self, event: AuditEvent) {
        self.lock().record(event);
    }
}

/// In-memory audit sink for testing and dev.
pub struct InMemoryAuditSink {
    events: VecDeque<AuditEvent>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.iter().cloned().collect()
    }

    /// Actions recorded for one run, oldest first.
    #[must_use]
    pub fn actions_for(&self, run_id: Uuid) -> Vec<String> {
        self.events
            .iter()
            .filter(|e| e.run_id == run_id)
            .map(|e| e.action.clone())
            .collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// Helper to build an audit event for a run stage.
pub fn build_audit_event(
    run_id: Uuid,
    action: impl Into<String>,
    payload: Option<String>,
) -> AuditEvent {
    let action = action.into();
    AuditEvent {
        event_id: format!("{run_id}-{action}"),
        run_id,
        action,
        created_at_ms: now_ms(),
        payload,
    }
}
