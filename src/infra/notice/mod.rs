//! Notice sink backends.

pub mod memory;

pub use memory::InMemoryNoticeOutbox;
