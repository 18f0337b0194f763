//! Suite execution: the cross product of units and configurations.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{info, warn};

use super::classifier::ErrorClassifier;
use super::invoke::{Invoker, DEFAULT_UNIT_TIMEOUT};
use super::rate_limit::{RateLimiter, DEFAULT_MIN_INTERVAL};
use super::unit::{TestUnit, UnitRegistry};
use crate::domain::{RunConfiguration, RunReport, TestOutcome, TestResult};
use crate::port::outbound::client::ClientFactory;

/// Reason recorded for a pair whose worker task died without reporting.
pub const REASON_WORKER_ABORTED: &str = "worker aborted before recording a result";

/// Upper bound on the default worker count.
pub const MAX_DEFAULT_WORKERS: usize = 8;

/// Worker count used when none is configured.
#[must_use]
pub fn default_workers() -> usize {
    num_cpus::get().clamp(1, MAX_DEFAULT_WORKERS)
}

/// Timing and parallelism knobs for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerSettings {
    pub min_interval: Duration,
    pub unit_timeout: Duration,
    pub workers: usize,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            min_interval: DEFAULT_MIN_INTERVAL,
            unit_timeout: DEFAULT_UNIT_TIMEOUT,
            workers: default_workers(),
        }
    }
}

/// Runs a registry against every configuration and aggregates a report.
///
/// Pairs are dispatched in configuration-major order to a bounded pool of
/// workers. All workers share one [`RateLimiter`], so the pool size only
/// affects how many calls may be in flight, never how fast they start.
pub struct SuiteRunner<F: ClientFactory> {
    invoker: Arc<Invoker<F>>,
    configurations: Vec<Arc<RunConfiguration>>,
    workers: usize,
}

impl<F: ClientFactory> SuiteRunner<F> {
    pub fn new(
        factory: F,
        configurations: Vec<RunConfiguration>,
        classifier: ErrorClassifier,
        settings: RunnerSettings,
    ) -> Self {
        let limiter = Arc::new(RateLimiter::new(settings.min_interval));
        let invoker = Invoker::new(
            Arc::new(factory),
            limiter,
            Arc::new(classifier),
            settings.unit_timeout,
        );
        Self {
            invoker: Arc::new(invoker),
            configurations: configurations.into_iter().map(Arc::new).collect(),
            workers: settings.workers.max(1),
        }
    }

    #[must_use]
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        self.invoker.limiter()
    }

    #[must_use]
    pub fn configurations(&self) -> &[Arc<RunConfiguration>] {
        &self.configurations
    }

    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Run to completion with no external cancellation.
    pub async fn run(&self, registry: &UnitRegistry<F::Client>) -> RunReport {
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        self.run_until(registry, shutdown_rx).await
    }

    /// Run until every pair finishes or `shutdown` fires.
    ///
    /// After cancellation, pairs still pending or running are recorded as
    /// skipped; the report is always complete.
    pub async fn run_until(
        &self,
        registry: &UnitRegistry<F::Client>,
        shutdown: watch::Receiver<bool>,
    ) -> RunReport {
        let started_at = Utc::now();
        let clock = Instant::now();
        self.limiter().reset();

        let pairs: Vec<(TestUnit<F::Client>, Arc<RunConfiguration>)> = self
            .configurations
            .iter()
            .flat_map(|configuration| {
                registry
                    .iter()
                    .map(move |unit| (unit.clone(), Arc::clone(configuration)))
            })
            .collect();

        info!(
            units = registry.len(),
            configurations = self.configurations.len(),
            pairs = pairs.len(),
            workers = self.workers,
            min_interval_ms = self.limiter().min_interval().as_millis() as u64,
            "Starting suite run"
        );

        let slots: Arc<Mutex<Vec<Option<TestResult>>>> =
            Arc::new(Mutex::new(vec![None; pairs.len()]));
        let permits = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();

        for (index, (unit, configuration)) in pairs.iter().cloned().enumerate() {
            let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                break;
            };
            let invoker = Arc::clone(&self.invoker);
            let slots = Arc::clone(&slots);
            let shutdown = shutdown.clone();
            tasks.spawn(async move {
                let _permit = permit;
                let result = invoker.invoke(&unit, &configuration, shutdown).await;
                slots.lock()[index] = Some(result);
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                warn!(error = %err, "Worker task aborted");
            }
        }

        let recorded = std::mem::take(&mut *slots.lock());
        let results: Vec<TestResult> = recorded
            .into_iter()
            .zip(&pairs)
            .map(|(slot, (unit, configuration))| {
                slot.unwrap_or_else(|| {
                    TestResult::new(
                        unit.name(),
                        unit.category(),
                        configuration.name(),
                        TestOutcome::Failed,
                        Duration::ZERO,
                        Some(REASON_WORKER_ABORTED.to_string()),
                    )
                })
            })
            .collect();

        let report = RunReport::new(
            started_at,
            clock.elapsed(),
            self.limiter().call_count(),
            results,
        );

        info!(
            run_id = %report.run_id(),
            passed = report.passed(),
            failed = report.failed(),
            skipped = report.skipped(),
            throttled_calls = report.throttled_calls(),
            elapsed_ms = report.elapsed().as_millis() as u64,
            "Suite run complete"
        );
        report
    }
}
