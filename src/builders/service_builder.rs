//! Builder wiring a store, configuration, and sinks into an `AllocationService`.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::AllocationConfig;
use crate::core::{AllocationError, AllocationService, AllocationStore, AuditSink, InMemoryAuditSink, NoticeSink};

/// Builds an [`AllocationService`] after validating configuration.
///
/// Without an explicit audit sink the service records into an
/// [`InMemoryAuditSink`] sized by `audit_buffer`, readable through
/// [`AllocationService::audit_log`].
pub struct AllocationServiceBuilder<S: ?Sized> {
    store: Arc<S>,
    config: AllocationConfig,
    audit: Option<Box<dyn AuditSink>>,
    notices: Option<Box<dyn NoticeSink>>,
}

impl<S> AllocationServiceBuilder<S>
where
    S: AllocationStore + ?Sized,
{
    /// Start from a store and configuration.
    pub fn new(store: Arc<S>, config: AllocationConfig) -> Self {
        Self {
            store,
            config,
            audit: None,
            notices: None,
        }
    }

    /// Configuration being built.
    pub const fn config(&self) -> &AllocationConfig {
        &self.config
    }

    /// Override the absolute per-resource ceiling.
    #[must_use]
    pub fn global_max_capacity(mut self, capacity: u32) -> Self {
        self.config.global_max_capacity = capacity;
        self
    }

    /// Use an explicit audit sink.
    #[must_use]
    pub fn audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Deliver assignment notices to `notices`.
    ///
    /// Pass an `Arc<Mutex<InMemoryNoticeOutbox>>` clone to keep draining the
    /// outbox after the service is built.
    #[must_use]
    pub fn notices(mut self, notices: Box<dyn NoticeSink>) -> Self {
        self.notices = Some(notices);
        self
    }

    /// Validate configuration and build the service.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` when validation fails.
    pub fn build(self) -> Result<AllocationService<S>, AllocationError> {
        self.config
            .validate()
            .map_err(AllocationError::InvalidConfig)?;

        let buffer = self.config.audit_buffer;
        let service = AllocationService::new(self.store, self.config);
        let mut service = match self.audit {
            Some(audit) => service.with_audit(audit),
            None => service.with_audit_log(Arc::new(Mutex::new(InMemoryAuditSink::new(buffer)))),
        };
        if let Some(notices) = self.notices {
            service = service.with_notices(notices);
        }
        Ok(service)
    }
}
