//! Seed sources for the planner's processing order.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Where a run's random seed comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedSource {
    /// Derived from the wall clock at run time.
    #[default]
    Clock,
    /// The same seed for every run.
    Fixed(u64),
}

impl SeedSource {
    /// Produce the seed for the next run.
    #[must_use]
    pub fn next_seed(self) -> u64 {
        match self {
            Self::Fixed(seed) => seed,
            Self::Clock => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| {
                    // Fold the high bits in so nanosecond resolution survives truncation.
                    let nanos = d.as_nanos();
                    (nanos as u64) ^ ((nanos >> 64) as u64)
                })
                .unwrap_or_default(),
        }
    }
}
