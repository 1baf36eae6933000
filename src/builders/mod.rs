//! Builders to construct allocation services from configuration.

pub mod service_builder;

pub use service_builder::AllocationServiceBuilder;
