//! API surface for the allocation trigger.

pub mod api;

pub use api::{respond, run_allocations, status_for_error, ApiResponse, ErrorBody, RunResponse, RUN_ROUTE};
