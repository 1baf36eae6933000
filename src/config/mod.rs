//! Configuration models for allocation runs.

pub mod allocation;

pub use allocation::{AllocationConfig, DEFAULT_DEADLINE_MS, DEFAULT_GLOBAL_MAX_CAPACITY};
