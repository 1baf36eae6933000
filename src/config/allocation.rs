//! Allocation run configuration.

use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::AppResult;
use crate::util::seed::SeedSource;

/// Default absolute per-resource ceiling.
pub const DEFAULT_GLOBAL_MAX_CAPACITY: u32 = 6;
/// Default run deadline in milliseconds.
pub const DEFAULT_DEADLINE_MS: u64 = 5_000;
const DEFAULT_AUDIT_BUFFER: usize = 256;

/// Settings for an allocation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// Absolute ceiling on assignables per resource, applied on top of the fair share.
    pub global_max_capacity: u32,
    /// Deadline for snapshot read plus commit, in milliseconds.
    pub deadline_ms: u64,
    /// Seed source for the processing order.
    pub seed: SeedSource,
    /// Events retained by the default in-memory audit sink.
    pub audit_buffer: usize,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            global_max_capacity: DEFAULT_GLOBAL_MAX_CAPACITY,
            deadline_ms: DEFAULT_DEADLINE_MS,
            seed: SeedSource::Clock,
            audit_buffer: DEFAULT_AUDIT_BUFFER,
        }
    }
}

impl AllocationConfig {
    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.global_max_capacity == 0 {
            return Err("global_max_capacity must be greater than 0".into());
        }
        if self.deadline_ms == 0 {
            return Err("deadline_ms must be greater than 0".into());
        }
        if self.audit_buffer == 0 {
            return Err("audit_buffer must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation message.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the environment, reading `.env` first if present.
    ///
    /// Recognized variables: `GLOBAL_MAX_CAPACITY`, `ALLOCATION_DEADLINE_MS`,
    /// `ALLOCATION_SEED` (a fixed seed; unset means clock-derived).
    ///
    /// # Errors
    ///
    /// Fails if a variable is present but not a valid number, or if the
    /// resulting configuration does not validate.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(raw) = lookup("GLOBAL_MAX_CAPACITY") {
            cfg.global_max_capacity = raw
                .trim()
                .parse()
                .with_context(|| format!("GLOBAL_MAX_CAPACITY={raw}"))?;
        }
        if let Some(raw) = lookup("ALLOCATION_DEADLINE_MS") {
            cfg.deadline_ms = raw
                .trim()
                .parse()
                .with_context(|| format!("ALLOCATION_DEADLINE_MS={raw}"))?;
        }
        if let Some(raw) = lookup("ALLOCATION_SEED") {
            let seed = raw
                .trim()
                .parse()
                .with_context(|| format!("ALLOCATION_SEED={raw}"))?;
            cfg.seed = SeedSource::Fixed(seed);
        }
        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }

    /// Run deadline as a duration.
    #[must_use]
    pub const fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}
