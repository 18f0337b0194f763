//! Runs one (unit, configuration) pair.
//!
//! `Pending -> Running -> {Passed, Failed, Skipped}`. A pair whose
//! configuration tier is too low never enters `Running` and is recorded as
//! skipped with zero duration. Once running, the wrapper claims a rate
//! limiter slot, builds the client, runs the body under the unit timeout and
//! funnels any error through the classifier. Extra slots the body claims
//! through its context pause the timeout while queued.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::classifier::{ErrorClassifier, REASON_CANCELLED};
use super::deadline::UnitDeadline;
use super::rate_limit::RateLimiter;
use super::shutdown;
use super::unit::{TestUnit, UnitContext, UnitError, UnitResult};
use crate::domain::{Classification, RunConfiguration, TestOutcome, TestResult};
use crate::domain::INSUFFICIENT_PRIVILEGE;
use crate::port::outbound::client::ClientFactory;

/// Default bound on a single unit body.
pub const DEFAULT_UNIT_TIMEOUT: Duration = Duration::from_secs(30);

struct Verdict {
    outcome: TestOutcome,
    reason: Option<String>,
}

impl Verdict {
    const fn passed() -> Self {
        Self {
            outcome: TestOutcome::Passed,
            reason: None,
        }
    }

    fn failed(reason: impl Into<String>) -> Self {
        Self {
            outcome: TestOutcome::Failed,
            reason: Some(reason.into()),
        }
    }

    fn skipped(reason: impl Into<String>) -> Self {
        Self {
            outcome: TestOutcome::Skipped,
            reason: Some(reason.into()),
        }
    }
}

/// Per-pair execution wrapper shared by all workers.
pub struct Invoker<F: ClientFactory> {
    factory: Arc<F>,
    limiter: Arc<RateLimiter>,
    classifier: Arc<ErrorClassifier>,
    unit_timeout: Duration,
}

impl<F: ClientFactory> Invoker<F> {
    pub fn new(
        factory: Arc<F>,
        limiter: Arc<RateLimiter>,
        classifier: Arc<ErrorClassifier>,
        unit_timeout: Duration,
    ) -> Self {
        Self {
            factory,
            limiter,
            classifier,
            unit_timeout,
        }
    }

    #[must_use]
    pub const fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Execute `unit` against `configuration` and record the result.
    pub async fn invoke(
        &self,
        unit: &TestUnit<F::Client>,
        configuration: &Arc<RunConfiguration>,
        shutdown: watch::Receiver<bool>,
    ) -> TestResult {
        if !configuration.can_run(unit.required()) {
            debug!(
                unit = unit.name(),
                configuration = configuration.name(),
                required = %unit.required(),
                granted = %configuration.granted(),
                "Skipping pair: insufficient privilege"
            );
            return TestResult::new(
                unit.name(),
                unit.category(),
                configuration.name(),
                TestOutcome::Skipped,
                Duration::ZERO,
                Some(INSUFFICIENT_PRIVILEGE.to_string()),
            );
        }

        let started = Instant::now();
        let verdict = self.execute(unit, configuration, shutdown).await;
        let duration = started.elapsed();

        match verdict.outcome {
            TestOutcome::Failed => warn!(
                unit = unit.name(),
                configuration = configuration.name(),
                elapsed_ms = duration.as_millis() as u64,
                reason = verdict.reason.as_deref().unwrap_or_default(),
                "Unit failed"
            ),
            outcome => info!(
                unit = unit.name(),
                configuration = configuration.name(),
                outcome = %outcome,
                elapsed_ms = duration.as_millis() as u64,
                "Unit finished"
            ),
        }

        TestResult::new(
            unit.name(),
            unit.category(),
            configuration.name(),
            verdict.outcome,
            duration,
            verdict.reason,
        )
    }

    async fn execute(
        &self,
        unit: &TestUnit<F::Client>,
        configuration: &Arc<RunConfiguration>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Verdict {
        if shutdown::is_requested(&shutdown) {
            return Verdict::skipped(REASON_CANCELLED);
        }

        let body_shutdown = shutdown.clone();
        let guarded = async {
            self.limiter.wait_for_slot().await;
            let deadline = Arc::new(UnitDeadline::new());
            let body = self.run_body(unit, configuration, body_shutdown, Arc::clone(&deadline));
            AssertUnwindSafe(deadline.run(self.unit_timeout, body))
                .catch_unwind()
                .await
        };

        tokio::select! {
            biased;
            () = shutdown::requested(&mut shutdown) => Verdict::skipped(REASON_CANCELLED),
            result = guarded => match result {
                Ok(Some(Ok(()))) => Verdict::passed(),
                Ok(Some(Err(err))) => self.resolve(err),
                Ok(None) => Verdict::failed(format!("timed out after {:?}", self.unit_timeout)),
                Err(panic) => Verdict::failed(format!("unit panicked: {}", panic_message(&*panic))),
            },
        }
    }

    async fn run_body(
        &self,
        unit: &TestUnit<F::Client>,
        configuration: &Arc<RunConfiguration>,
        shutdown: watch::Receiver<bool>,
        deadline: Arc<UnitDeadline>,
    ) -> UnitResult {
        let client = self.factory.connect(configuration).await?;
        let ctx = UnitContext::new(
            unit.shared_name(),
            client,
            Arc::clone(configuration),
            Arc::clone(&self.limiter),
            shutdown,
            deadline,
        );
        unit.body().run(ctx).await
    }

    fn resolve(&self, err: UnitError) -> Verdict {
        match err {
            UnitError::Skip(reason) => Verdict::skipped(reason),
            UnitError::Assertion(message) => {
                Verdict::failed(format!("assertion failed: {message}"))
            }
            UnitError::Signal { endpoint, signal } => {
                let classification = match endpoint.as_deref() {
                    Some(endpoint) => self.classifier.classify_for(endpoint, Some(&signal)),
                    None => self.classifier.classify(Some(&signal)),
                };
                let location = endpoint.map(|e| format!("{e}: ")).unwrap_or_default();
                match classification {
                    Classification::Skip(reason) => Verdict::skipped(reason),
                    Classification::Fail(reason) => {
                        Verdict::failed(format!("{reason}: {location}{signal}"))
                    }
                    Classification::Continue => Verdict::failed(format!("{location}{signal}")),
                }
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
