//! # Allocation Engine
//!
//! Assigns a population of entities (for example students) to capacity-bounded
//! resources (for example supervisors). Placement honors a soft preference
//! match, a hard per-resource ceiling, and an even-load goal, and it never
//! touches entities that already have a resource.
//!
//! ## Pipeline
//!
//! Each run is a linear sequence with no branching back:
//!
//! - **Snapshot**: one consistent read of unassigned entities, resources, and a
//!   version token ([`core::AllocationStore::read_snapshot`]).
//! - **Plan**: a pure, seeded function of the snapshot ([`core::plan`]).
//! - **Execute**: one atomic, version-guarded commit ([`core::PlanExecutor`]).
//! - **Report**: a projection for display and export ([`core::build_report`]).
//!
//! A second run computed against the same snapshot as a committed one fails
//! with [`core::AllocationError::StaleSnapshot`] and must start over.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use allocation_engine::builders::AllocationServiceBuilder;
//! use allocation_engine::config::AllocationConfig;
//! use allocation_engine::core::{Assignable, Resource, RunOutcome};
//! use allocation_engine::infra::InMemoryAllocationStore;
//!
//! let store = Arc::new(
//!     InMemoryAllocationStore::new()
//!         .with_resource(Resource::new("r1", "CS", 0))
//!         .with_assignable(Assignable::unassigned("s1", "CS")),
//! );
//! let service = AllocationServiceBuilder::new(store, AllocationConfig::from_env()?).build()?;
//! if let RunOutcome::Completed(report) = service.run().await? {
//!     println!("assigned {}", report.assigned);
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Allocation model, planner, executor, report builder, and orchestration.
pub mod core;
/// Configuration models for allocation runs.
pub mod config;
/// Builders to construct allocation services from configuration.
pub mod builders;
/// Infrastructure adapters for stores and notice outboxes.
pub mod infra;
/// API surface for the allocation trigger.
pub mod runtime;
/// Shared utilities.
pub mod util;
