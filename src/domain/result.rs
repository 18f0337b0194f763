//! Per-pair test results.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Reason recorded when a configuration's tier is below the unit's requirement.
pub const INSUFFICIENT_PRIVILEGE: &str = "insufficient privilege";

/// Terminal state of one (unit, configuration) execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestOutcome {
    Passed,
    Failed,
    Skipped,
}

impl TestOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of one (unit, configuration) execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    unit: String,
    category: String,
    configuration: String,
    outcome: TestOutcome,
    duration: Duration,
    error: Option<String>,
}

impl TestResult {
    #[must_use]
    pub fn new(
        unit: impl Into<String>,
        category: impl Into<String>,
        configuration: impl Into<String>,
        outcome: TestOutcome,
        duration: Duration,
        error: Option<String>,
    ) -> Self {
        Self {
            unit: unit.into(),
            category: category.into(),
            configuration: configuration.into(),
            outcome,
            duration,
            error,
        }
    }

    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn configuration(&self) -> &str {
        &self.configuration
    }

    #[must_use]
    pub const fn outcome(&self) -> TestOutcome {
        self.outcome
    }

    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Failure or skip reason, when there is one.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn is_insufficient_privilege(&self) -> bool {
        self.outcome == TestOutcome::Skipped && self.error() == Some(INSUFFICIENT_PRIVILEGE)
    }
}
