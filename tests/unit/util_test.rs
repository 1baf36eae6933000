//! Tests for utility functions

use allocation_engine::util::{now_ms, SeedSource};

#[test]
fn test_now_ms_advances() {
    let first = now_ms();
    let second = now_ms();
    assert!(first > 0);
    assert!(second >= first);
}

#[test]
fn test_fixed_seed() {
    assert_eq!(SeedSource::Fixed(5).next_seed(), 5);
}

#[test]
fn test_default_seed_source_is_clock() {
    assert_eq!(SeedSource::default(), SeedSource::Clock);
}

#[test]
fn test_init_tracing_is_idempotent() {
    allocation_engine::util::init_tracing();
    allocation_engine::util::init_tracing();
    tracing::info!("tracing initialized");
}
