//! Aggregate outcome of one suite execution.

use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::result::{TestOutcome, TestResult};

/// Pass/fail/skip counts for one configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationSummary {
    pub configuration: String,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub elapsed: Duration,
}

impl ConfigurationSummary {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    /// Passed share of the pairs that actually ran.
    #[must_use]
    pub fn success_rate(&self) -> Option<f64> {
        success_rate(self.passed, self.failed)
    }
}

/// Report for one suite run; printed once and then discarded.
#[derive(Debug, Clone)]
pub struct RunReport {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    elapsed: Duration,
    throttled_calls: u64,
    results: Vec<TestResult>,
}

impl RunReport {
    #[must_use]
    pub fn new(
        started_at: DateTime<Utc>,
        elapsed: Duration,
        throttled_calls: u64,
        results: Vec<TestResult>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at,
            elapsed,
            throttled_calls,
            results,
        }
    }

    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Wall-clock time of the whole run.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of rate-limiter slots granted during the run.
    #[must_use]
    pub const fn throttled_calls(&self) -> u64 {
        self.throttled_calls
    }

    #[must_use]
    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(TestOutcome::Passed)
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(TestOutcome::Failed)
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(TestOutcome::Skipped)
    }

    fn count(&self, outcome: TestOutcome) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome() == outcome)
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.with_outcome(TestOutcome::Failed)
    }

    pub fn skips(&self) -> impl Iterator<Item = &TestResult> {
        self.with_outcome(TestOutcome::Skipped)
    }

    fn with_outcome(&self, outcome: TestOutcome) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(move |r| r.outcome() == outcome)
    }

    /// Sum of per-pair durations; exceeds `elapsed` when workers overlap.
    #[must_use]
    pub fn busy_time(&self) -> Duration {
        self.results.iter().map(TestResult::duration).sum()
    }

    #[must_use]
    pub fn success_rate(&self) -> Option<f64> {
        success_rate(self.passed(), self.failed())
    }

    /// Per-configuration breakdown in first-seen order.
    #[must_use]
    pub fn by_configuration(&self) -> Vec<ConfigurationSummary> {
        let mut summaries: Vec<ConfigurationSummary> = Vec::new();
        for result in &self.results {
            let index = match summaries
                .iter()
                .position(|s| s.configuration == result.configuration())
            {
                Some(index) => index,
                None => {
                    summaries.push(ConfigurationSummary {
                        configuration: result.configuration().to_string(),
                        passed: 0,
                        failed: 0,
                        skipped: 0,
                        elapsed: Duration::ZERO,
                    });
                    summaries.len() - 1
                }
            };
            let summary = &mut summaries[index];
            match result.outcome() {
                TestOutcome::Passed => summary.passed += 1,
                TestOutcome::Failed => summary.failed += 1,
                TestOutcome::Skipped => summary.skipped += 1,
            }
            summary.elapsed += result.duration();
        }
        summaries
    }

    /// Whether the run had no failures. Skips never count against success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Process exit code for this report.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

fn success_rate(passed: usize, failed: usize) -> Option<f64> {
    let ran = passed + failed;
    if ran == 0 {
        None
    } else {
        Some(passed as f64 / ran as f64 * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(config: &str, outcome: TestOutcome, millis: u64) -> TestResult {
        TestResult::new(
            "unit",
            "Public",
            config,
            outcome,
            Duration::from_millis(millis),
            None,
        )
    }

    fn report(results: Vec<TestResult>) -> RunReport {
        RunReport::new(Utc::now(), Duration::from_secs(1), 0, results)
    }

    #[test]
    fn counts_each_outcome() {
        let report = report(vec![
            result("a", TestOutcome::Passed, 10),
            result("a", TestOutcome::Failed, 10),
            result("b", TestOutcome::Skipped, 0),
            result("b", TestOutcome::Passed, 5),
        ]);
        assert_eq!(report.total(), 4);
        assert_eq!(report.passed(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.busy_time(), Duration::from_millis(25));
    }

    #[test]
    fn skips_do_not_affect_exit_code() {
        let report = report(vec![
            result("a", TestOutcome::Skipped, 0),
            result("a", TestOutcome::Passed, 1),
        ]);
        assert!(report.is_success());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn any_failure_gives_nonzero_exit_code() {
        let report = report(vec![result("a", TestOutcome::Failed, 1)]);
        assert_ne!(report.exit_code(), 0);
    }

    #[test]
    fn success_rate_ignores_skips() {
        let report = report(vec![
            result("a", TestOutcome::Passed, 1),
            result("a", TestOutcome::Failed, 1),
            result("a", TestOutcome::Skipped, 0),
        ]);
        assert_eq!(report.success_rate(), Some(50.0));
        assert_eq!(self::report(vec![]).success_rate(), None);
    }

    #[test]
    fn breakdown_preserves_first_seen_order() {
        let report = report(vec![
            result("HMAC Authentication", TestOutcome::Passed, 1),
            result("Public Endpoints", TestOutcome::Skipped, 0),
            result("HMAC Authentication", TestOutcome::Failed, 2),
        ]);
        let summaries = report.by_configuration();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].configuration, "HMAC Authentication");
        assert_eq!(summaries[0].passed, 1);
        assert_eq!(summaries[0].failed, 1);
        assert_eq!(summaries[0].elapsed, Duration::from_millis(3));
        assert_eq!(summaries[1].skipped, 1);
        assert_eq!(summaries[1].success_rate(), None);
    }
}
