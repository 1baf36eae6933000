//! In-memory transactional allocation store.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::model::{Assignable, AssignableId, Resource, ResourceId, Snapshot, VersionToken};
use crate::core::{AllocationError, AllocationStore, AssignmentDecision};

#[derive(Debug, Default)]
struct StoreState {
    assignables: BTreeMap<AssignableId, Assignable>,
    resources: BTreeMap<ResourceId, Resource>,
    version: VersionToken,
}

/// Store keeping entities and resources behind a single mutex.
///
/// The mutex is the transaction boundary: snapshots and commits each hold it
/// for their full duration, so a commit either lands completely or not at all.
#[derive(Debug, Default)]
pub struct InMemoryAllocationStore {
    state: Mutex<StoreState>,
}

impl InMemoryAllocationStore {
    /// Create an empty store at version 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style resource insertion.
    #[must_use]
    pub fn with_resource(self, resource: Resource) -> Self {
        self.insert_resource(resource);
        self
    }

    /// Builder-style entity insertion.
    #[must_use]
    pub fn with_assignable(self, assignable: Assignable) -> Self {
        self.insert_assignable(assignable);
        self
    }

    /// Add or replace a resource. Advances the version.
    ///
    /// The stored load is the number of entities referencing the resource;
    /// the `load` carried by `resource` is overwritten.
    pub fn insert_resource(&self, mut resource: Resource) {
        let mut state = self.state.lock();
        resource.load = state.referencing(&resource.id);
        state.resources.insert(resource.id.clone(), resource);
        state.version = state.version.next();
    }

    /// Add or replace an entity. Advances the version.
    ///
    /// Loads of the resources referenced before and after the replacement
    /// are recounted. A reference to a resource not yet inserted is counted
    /// once that resource arrives.
    pub fn insert_assignable(&self, assignable: Assignable) {
        let mut state = self.state.lock();
        let previous = state
            .assignables
            .insert(assignable.id.clone(), assignable.clone())
            .and_then(|old| old.resource);
        for resource_id in previous.iter().chain(assignable.resource.iter()) {
            state.recount(resource_id);
        }
        state.version = state.version.next();
    }

    /// Administrator assignment of a single entity, outside any plan.
    ///
    /// Advances the version, so any plan computed before this call is stale.
    ///
    /// # Errors
    ///
    /// `TransactionFailure` if either id is unknown or the entity is already
    /// assigned.
    pub fn assign_manually(
        &self,
        assignable: &AssignableId,
        resource: &ResourceId,
    ) -> Result<VersionToken, AllocationError> {
        let mut state = self.state.lock();
        if !state.resources.contains_key(resource) {
            return Err(AllocationError::TransactionFailure(format!(
                "unknown resource {resource}"
            )));
        }
        let entity = state.assignables.get_mut(assignable).ok_or_else(|| {
            AllocationError::TransactionFailure(format!("unknown assignable {assignable}"))
        })?;
        if entity.is_assigned() {
            return Err(AllocationError::TransactionFailure(format!(
                "assignable {assignable} already assigned"
            )));
        }
        entity.resource = Some(resource.clone());
        if let Some(target) = state.resources.get_mut(resource) {
            target.load += 1;
        }
        state.version = state.version.next();
        tracing::info!(%assignable, %resource, version = %state.version, "manual assignment");
        Ok(state.version)
    }

    /// Current persisted version.
    #[must_use]
    pub fn version(&self) -> VersionToken {
        self.state.lock().version
    }

    /// Look up an entity.
    #[must_use]
    pub fn assignable(&self, id: &AssignableId) -> Option<Assignable> {
        self.state.lock().assignables.get(id).cloned()
    }

    /// Look up a resource.
    #[must_use]
    pub fn resource(&self, id: &ResourceId) -> Option<Resource> {
        self.state.lock().resources.get(id).cloned()
    }

    /// Number of entities without a resource.
    #[must_use]
    pub fn unassigned_count(&self) -> usize {
        self.state
            .lock()
            .assignables
            .values()
            .filter(|a| !a.is_assigned())
            .count()
    }
}

impl StoreState {
    fn referencing(&self, resource: &ResourceId) -> u32 {
        let count = self
            .assignables
            .values()
            .filter(|a| a.resource.as_ref() == Some(resource))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    fn recount(&mut self, resource: &ResourceId) {
        let load = self.referencing(resource);
        if let Some(target) = self.resources.get_mut(resource) {
            target.load = load;
        }
    }

    fn validate(&self, decisions: &[AssignmentDecision], cap: u32) -> Result<(), String> {
        let mut seen = HashSet::with_capacity(decisions.len());
        let mut added: BTreeMap<&ResourceId, u32> = BTreeMap::new();

        for decision in decisions {
            if !seen.insert(&decision.assignable) {
                return Err(format!("assignable {} planned twice", decision.assignable));
            }
            match self.assignables.get(&decision.assignable) {
                None => return Err(format!("unknown assignable {}", decision.assignable)),
                Some(a) if a.is_assigned() => {
                    return Err(format!("assignable {} already assigned", decision.assignable));
                }
                Some(_) => {}
            }
            if !self.resources.contains_key(&decision.resource) {
                return Err(format!("unknown resource {}", decision.resource));
            }
            *added.entry(&decision.resource).or_insert(0) += 1;
        }

        for (resource_id, extra) in added {
            let load = self.resources.get(resource_id).map_or(0, |r| r.load);
            if load + extra > cap {
                return Err(format!(
                    "resource {resource_id} would reach {} over cap {cap}",
                    load + extra
                ));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl AllocationStore for InMemoryAllocationStore {
    async fn read_snapshot(&self) -> Result<Snapshot, AllocationError> {
        let state = self.state.lock();
        Ok(Snapshot {
            assignables: state
                .assignables
                .values()
                .filter(|a| !a.is_assigned())
                .cloned()
                .collect(),
            resources: state.resources.values().cloned().collect(),
            version: state.version,
        })
    }

    async fn commit(
        &self,
        expected: VersionToken,
        decisions: &[AssignmentDecision],
        cap: u32,
    ) -> Result<VersionToken, AllocationError> {
        let mut state = self.state.lock();
        if state.version != expected {
            return Err(AllocationError::StaleSnapshot {
                expected,
                actual: state.version,
            });
        }
        if decisions.is_empty() {
            return Ok(state.version);
        }

        state
            .validate(decisions, cap)
            .map_err(AllocationError::TransactionFailure)?;

        for decision in decisions {
            if let Some(entity) = state.assignables.get_mut(&decision.assignable) {
                entity.resource = Some(decision.resource.clone());
            }
            if let Some(resource) = state.resources.get_mut(&decision.resource) {
                resource.load += 1;
            }
        }
        state.version = state.version.next();
        Ok(state.version)
    }
}
