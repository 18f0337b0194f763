//! Run pacing and parallelism configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::application::runner::{default_workers, RunnerSettings};

/// `[harness]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct HarnessConfig {
    /// Minimum spacing between outbound calls (milliseconds). 0 disables throttling.
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
    /// Upper bound on one unit body (seconds).
    #[serde(default = "default_unit_timeout_secs")]
    pub unit_timeout_secs: u64,
    /// Concurrent pairs. Defaults to the CPU count, capped at 8.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Run every available signing method instead of only the preferred one.
    #[serde(default)]
    pub test_all_auth_types: bool,
}

fn default_min_interval_ms() -> u64 {
    2000
}

fn default_unit_timeout_secs() -> u64 {
    30
}

impl HarnessConfig {
    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    #[must_use]
    pub const fn unit_timeout(&self) -> Duration {
        Duration::from_secs(self.unit_timeout_secs)
    }

    #[must_use]
    pub const fn runner_settings(&self) -> RunnerSettings {
        RunnerSettings {
            min_interval: self.min_interval(),
            unit_timeout: self.unit_timeout(),
            workers: self.workers,
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
            unit_timeout_secs: default_unit_timeout_secs(),
            workers: default_workers(),
            test_all_auth_types: false,
        }
    }
}
