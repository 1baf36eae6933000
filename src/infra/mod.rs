//! Infrastructure adapters for allocation state and notice delivery.

pub mod notice;
pub mod store;

pub use notice::InMemoryNoticeOutbox;
pub use store::InMemoryAllocationStore;
