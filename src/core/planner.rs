//! Allocation planner: a pure function from a snapshot to an assignment plan.
//!
//! The planner never touches persistent state. Given the same inputs and the
//! same seeded random source it produces the same plan, decision for decision.
//!
//! ## Algorithm
//! 1. Empty resources yield [`EmptyReason::NoResources`]; no unassigned
//!    entities yield [`EmptyReason::NothingToAssign`].
//! 2. `cap = min(ceil(N / M), global_max_capacity)` applies to every resource.
//! 3. Entities are visited in a seeded permutation of their id order.
//! 4. Each entity goes to the open resource that matches its preference tag,
//!    then has the lowest running load, then the lowest id. Entities with no
//!    open resource are recorded as unplaced.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::model::{Assignable, AssignableId, Resource, ResourceId, VersionToken};

/// Why the planner produced no plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// No resources exist to assign to.
    NoResources,
    /// Every entity already references a resource.
    NothingToAssign,
}

impl EmptyReason {
    /// Human-readable description for responses and logs.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::NoResources => "no resources available for assignment",
            Self::NothingToAssign => "no unassigned entities found",
        }
    }
}

/// One immutable placement decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentDecision {
    /// Entity being placed.
    pub assignable: AssignableId,
    /// Resource it is placed on.
    pub resource: ResourceId,
    /// Whether the resource serves the entity's preference tag.
    pub preference_matched: bool,
}

/// Ordered decisions computed against one snapshot version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentPlan {
    /// Decisions in processing order.
    pub decisions: Vec<AssignmentDecision>,
    /// Entities left without a resource because every resource hit the cap.
    pub unplaced: Vec<AssignableId>,
    /// Snapshot version the plan was computed against.
    pub version: VersionToken,
    /// Per-resource ceiling applied in this run.
    pub per_resource_cap: u32,
    /// Number of entities considered (N).
    pub considered: usize,
    /// Running load of every resource after planning.
    pub final_loads: BTreeMap<ResourceId, u32>,
}

impl AssignmentPlan {
    /// Decisions whose resource matched the entity's preference.
    #[must_use]
    pub fn matches(&self) -> usize {
        self.decisions.iter().filter(|d| d.preference_matched).count()
    }

    /// Decisions placed on a non-matching resource.
    #[must_use]
    pub fn mismatches(&self) -> usize {
        self.decisions.len() - self.matches()
    }

    /// New assignments per resource.
    #[must_use]
    pub fn new_assignments_per_resource(&self) -> BTreeMap<ResourceId, u32> {
        let mut counts = BTreeMap::new();
        for decision in &self.decisions {
            *counts.entry(decision.resource.clone()).or_insert(0) += 1;
        }
        counts
    }
}

/// Planner result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOutcome {
    /// A plan was produced (possibly with unplaced entities).
    Ready(AssignmentPlan),
    /// Nothing could be planned.
    Empty(EmptyReason),
}

/// Per-resource ceiling for a run over `assignables` entities and `resources` targets.
#[must_use]
pub fn per_resource_cap(assignables: usize, resources: usize, global_max_capacity: u32) -> u32 {
    if resources == 0 {
        return 0;
    }
    let fair_share = u32::try_from(assignables.div_ceil(resources)).unwrap_or(u32::MAX);
    fair_share.min(global_max_capacity)
}

struct Candidate<'a> {
    resource: &'a Resource,
    running: u32,
}

/// Compute an assignment plan.
///
/// Entities that already reference a resource are ignored. The random source
/// only drives the processing order; all tie-breaks are deterministic.
pub fn plan<R>(
    assignables: &[Assignable],
    resources: &[Resource],
    version: VersionToken,
    global_max_capacity: u32,
    rng: &mut R,
) -> PlanOutcome
where
    R: Rng + ?Sized,
{
    if resources.is_empty() {
        return PlanOutcome::Empty(EmptyReason::NoResources);
    }

    let mut order: Vec<&Assignable> = assignables.iter().filter(|a| !a.is_assigned()).collect();
    if order.is_empty() {
        return PlanOutcome::Empty(EmptyReason::NothingToAssign);
    }

    let considered = order.len();
    let cap = per_resource_cap(considered, resources.len(), global_max_capacity);
    tracing::debug!(considered, resources = resources.len(), cap, "planning allocation");

    // Canonical order first so the permutation depends only on the seed.
    order.sort_by(|a, b| a.id.cmp(&b.id));
    order.shuffle(rng);

    let mut candidates: Vec<Candidate<'_>> = resources
        .iter()
        .map(|resource| Candidate {
            resource,
            running: resource.load,
        })
        .collect();
    candidates.sort_by(|a, b| a.resource.id.cmp(&b.resource.id));

    let mut decisions = Vec::with_capacity(considered);
    let mut unplaced = Vec::new();

    for assignable in order {
        let chosen = candidates
            .iter_mut()
            .filter(|c| c.running < cap)
            .min_by(|a, b| rank(assignable, a, b));

        let Some(chosen) = chosen else {
            unplaced.push(assignable.id.clone());
            continue;
        };

        chosen.running += 1;
        let preference_matched = chosen.resource.preference == assignable.preference;
        tracing::debug!(
            assignable = %assignable.id,
            resource = %chosen.resource.id,
            preference_matched,
            "planned assignment"
        );
        decisions.push(AssignmentDecision {
            assignable: assignable.id.clone(),
            resource: chosen.resource.id.clone(),
            preference_matched,
        });
    }

    let final_loads = candidates
        .iter()
        .map(|c| (c.resource.id.clone(), c.running))
        .collect();

    PlanOutcome::Ready(AssignmentPlan {
        decisions,
        unplaced,
        version,
        per_resource_cap: cap,
        considered,
        final_loads,
    })
}

/// Preference match first, then lower running load, then resource id.
fn rank(assignable: &Assignable, a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    let a_miss = a.resource.preference != assignable.preference;
    let b_miss = b.resource.preference != assignable.preference;
    a_miss
        .cmp(&b_miss)
        .then(a.running.cmp(&b.running))
        .then_with(|| a.resource.id.cmp(&b.resource.id))
}
