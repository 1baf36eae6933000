//! Report builder: a read-only projection of a committed run.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::executor::ExecutionResult;
use crate::core::model::{AssignableId, PreferenceTag, ResourceId, Snapshot, VersionToken};
use crate::core::planner::{AssignmentDecision, AssignmentPlan};

/// Before/after figures for one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsage {
    /// Resource identity.
    pub resource: ResourceId,
    /// Category the resource serves.
    pub preference: PreferenceTag,
    /// Load at snapshot time.
    pub previous_load: u32,
    /// Load after this run.
    pub new_load: u32,
    /// Assignments added by this run.
    pub new_assignments: u32,
    /// `new_load / per_resource_cap`.
    pub utilization: f64,
}

/// Summary of a committed allocation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationReport {
    /// Run identity.
    pub run_id: Uuid,
    /// Version the run planned against.
    pub version_before: VersionToken,
    /// Version after the commit.
    pub version_after: VersionToken,
    /// Ceiling applied to every resource.
    pub per_resource_cap: u32,
    /// Entities assigned by this run.
    pub assigned: usize,
    /// Entities still unassigned after this run.
    pub remaining_unassigned: usize,
    /// Assignments onto a resource with the same preference tag.
    pub matches: usize,
    /// Assignments onto a resource with a different tag.
    pub mismatches: usize,
    /// One entry per resource in the snapshot, ordered by id.
    pub per_resource: Vec<ResourceUsage>,
    /// Decisions in the order they were planned.
    pub assignments: Vec<AssignmentDecision>,
    /// Entities left unplaced.
    pub unplaced: Vec<AssignableId>,
}

impl AllocationReport {
    /// Resources that received at least one new assignment.
    pub fn touched(&self) -> impl Iterator<Item = &ResourceUsage> {
        self.per_resource.iter().filter(|u| u.new_assignments > 0)
    }

    /// `(assignable, resource)` pairs created by this run, for notification.
    #[must_use]
    pub fn new_pairs(&self) -> Vec<(AssignableId, ResourceId)> {
        self.assignments
            .iter()
            .map(|d| (d.assignable.clone(), d.resource.clone()))
            .collect()
    }
}

/// Build the report for a committed plan.
///
/// Loads come from the planner's running counters, not from a second read.
#[must_use]
pub fn build_report(
    run_id: Uuid,
    snapshot: &Snapshot,
    plan: &AssignmentPlan,
    result: &ExecutionResult,
) -> AllocationReport {
    let added = plan.new_assignments_per_resource();
    let cap = plan.per_resource_cap;

    let mut per_resource: Vec<ResourceUsage> = snapshot
        .resources
        .iter()
        .map(|resource| {
            let new_assignments = added.get(&resource.id).copied().unwrap_or(0);
            let new_load = plan
                .final_loads
                .get(&resource.id)
                .copied()
                .unwrap_or(resource.load + new_assignments);
            let utilization = if cap == 0 {
                0.0
            } else {
                f64::from(new_load) / f64::from(cap)
            };
            ResourceUsage {
                resource: resource.id.clone(),
                preference: resource.preference.clone(),
                previous_load: resource.load,
                new_load,
                new_assignments,
                utilization,
            }
        })
        .collect();
    per_resource.sort_by(|a, b| a.resource.cmp(&b.resource));

    AllocationReport {
        run_id,
        version_before: plan.version,
        version_after: result.committed_version,
        per_resource_cap: cap,
        assigned: result.applied,
        remaining_unassigned: result.unplaced.len(),
        matches: plan.matches(),
        mismatches: plan.mismatches(),
        per_resource,
        assignments: plan.decisions.clone(),
        unplaced: result.unplaced.clone(),
    }
}
