//! Allocation store backends.

pub mod memory;

pub use memory::InMemoryAllocationStore;
