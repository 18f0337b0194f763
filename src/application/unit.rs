//! Test units and the context handed to their bodies.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::debug;

use super::deadline::UnitDeadline;
use super::rate_limit::RateLimiter;
use crate::domain::{ErrorSignal, PrivilegeTier, RunConfiguration};
use crate::error::{Error, Result};

/// How a unit body ends when it does not pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    /// A call failed; the signal goes through the classifier.
    Signal {
        /// Endpoint name used for the structured-code table, if any.
        endpoint: Option<String>,
        signal: ErrorSignal,
    },
    /// An assertion on the response did not hold.
    Assertion(String),
    /// The body asked to be skipped.
    Skip(String),
}

impl UnitError {
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion(message.into())
    }

    #[must_use]
    pub fn skip(reason: impl Into<String>) -> Self {
        Self::Skip(reason.into())
    }

    /// Signal failure attributed to `endpoint`.
    #[must_use]
    pub fn at(endpoint: impl Into<String>, signal: ErrorSignal) -> Self {
        Self::Signal {
            endpoint: Some(endpoint.into()),
            signal,
        }
    }
}

impl From<ErrorSignal> for UnitError {
    fn from(signal: ErrorSignal) -> Self {
        Self::Signal {
            endpoint: None,
            signal,
        }
    }
}

impl fmt::Display for UnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signal {
                endpoint: Some(endpoint),
                signal,
            } => write!(f, "{endpoint}: {signal}"),
            Self::Signal {
                endpoint: None,
                signal,
            } => write!(f, "{signal}"),
            Self::Assertion(message) => write!(f, "assertion failed: {message}"),
            Self::Skip(reason) => write!(f, "skipped: {reason}"),
        }
    }
}

pub type UnitResult = std::result::Result<(), UnitError>;

/// Fail the unit with `message` unless `condition` holds.
pub fn ensure(condition: bool, message: impl Into<String>) -> UnitResult {
    if condition {
        Ok(())
    } else {
        Err(UnitError::assertion(message))
    }
}

/// Everything a unit body needs for one configuration.
pub struct UnitContext<C> {
    unit: Arc<str>,
    client: Arc<C>,
    configuration: Arc<RunConfiguration>,
    limiter: Arc<RateLimiter>,
    shutdown: watch::Receiver<bool>,
    deadline: Arc<UnitDeadline>,
}

impl<C> Clone for UnitContext<C> {
    fn clone(&self) -> Self {
        Self {
            unit: Arc::clone(&self.unit),
            client: Arc::clone(&self.client),
            configuration: Arc::clone(&self.configuration),
            limiter: Arc::clone(&self.limiter),
            shutdown: self.shutdown.clone(),
            deadline: Arc::clone(&self.deadline),
        }
    }
}

impl<C> UnitContext<C> {
    pub(crate) fn new(
        unit: Arc<str>,
        client: C,
        configuration: Arc<RunConfiguration>,
        limiter: Arc<RateLimiter>,
        shutdown: watch::Receiver<bool>,
        deadline: Arc<UnitDeadline>,
    ) -> Self {
        Self {
            unit,
            client: Arc::new(client),
            configuration,
            limiter,
            shutdown,
            deadline,
        }
    }

    #[must_use]
    pub fn unit_name(&self) -> &str {
        &self.unit
    }

    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    #[must_use]
    pub fn configuration(&self) -> &RunConfiguration {
        &self.configuration
    }

    /// Claim another rate-limiter slot before an additional outbound call.
    ///
    /// The wrapper already claims one slot per unit; bodies making several
    /// calls call this before each extra one. Time spent queued here does
    /// not count against the unit timeout.
    pub async fn throttle(&self) -> std::result::Result<u64, UnitError> {
        let mut shutdown = self.shutdown.clone();
        let paused = self.deadline.pause();
        let call = self
            .limiter
            .wait_for_slot_or_cancel(&mut shutdown)
            .await
            .map_err(|_| UnitError::from(ErrorSignal::cancelled()))?;
        drop(paused);
        debug!(
            unit = self.unit_name(),
            configuration = self.configuration.name(),
            call,
            "Extra throttled call"
        );
        Ok(call)
    }
}

/// Executable body of a test unit.
#[async_trait]
pub trait UnitBody<C>: Send + Sync {
    async fn run(&self, ctx: UnitContext<C>) -> UnitResult;
}

/// Adapter turning an async closure into a [`UnitBody`].
struct FnBody<F, C> {
    f: F,
    _client: PhantomData<fn(C)>,
}

#[async_trait]
impl<C, F, Fut> UnitBody<C> for FnBody<F, C>
where
    C: Send + Sync + 'static,
    F: Fn(UnitContext<C>) -> Fut + Send + Sync,
    Fut: Future<Output = UnitResult> + Send + 'static,
{
    async fn run(&self, ctx: UnitContext<C>) -> UnitResult {
        (self.f)(ctx).await
    }
}

/// Named test declared once in a registry.
pub struct TestUnit<C> {
    name: Arc<str>,
    required: PrivilegeTier,
    category: String,
    body: Arc<dyn UnitBody<C>>,
}

impl<C> Clone for TestUnit<C> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            required: self.required,
            category: self.category.clone(),
            body: Arc::clone(&self.body),
        }
    }
}

impl<C> fmt::Debug for TestUnit<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestUnit")
            .field("name", &self.name)
            .field("required", &self.required)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

impl<C: Send + Sync + 'static> TestUnit<C> {
    pub fn new(
        name: impl Into<String>,
        required: PrivilegeTier,
        category: impl Into<String>,
        body: impl UnitBody<C> + 'static,
    ) -> Self {
        Self {
            name: Arc::from(name.into()),
            required,
            category: category.into(),
            body: Arc::new(body),
        }
    }

    /// Unit whose body is an async closure over the context.
    pub fn from_fn<F, Fut>(
        name: impl Into<String>,
        required: PrivilegeTier,
        category: impl Into<String>,
        f: F,
    ) -> Self
    where
        F: Fn(UnitContext<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = UnitResult> + Send + 'static,
    {
        Self::new(
            name,
            required,
            category,
            FnBody {
                f,
                _client: PhantomData,
            },
        )
    }
}

impl<C> TestUnit<C> {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    #[must_use]
    pub const fn required(&self) -> PrivilegeTier {
        self.required
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    pub(crate) fn body(&self) -> &Arc<dyn UnitBody<C>> {
        &self.body
    }
}

/// Name/category selection applied before a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitFilter {
    /// Case-insensitive substring of the unit name.
    pub name: Option<String>,
    /// Case-insensitive exact category label.
    pub category: Option<String>,
}

impl UnitFilter {
    #[must_use]
    pub fn matches<C>(&self, unit: &TestUnit<C>) -> bool {
        let name_ok = self.name.as_deref().map_or(true, |needle| {
            unit.name()
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        let category_ok = self
            .category
            .as_deref()
            .map_or(true, |category| unit.category().eq_ignore_ascii_case(category));
        name_ok && category_ok
    }
}

/// Ordered, name-unique collection of test units.
pub struct UnitRegistry<C> {
    units: Vec<TestUnit<C>>,
}

impl<C> Default for UnitRegistry<C> {
    fn default() -> Self {
        Self { units: Vec::new() }
    }
}

impl<C> UnitRegistry<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit. Names must be unique.
    pub fn register(&mut self, unit: TestUnit<C>) -> Result<()> {
        if self.units.iter().any(|u| u.name() == unit.name()) {
            return Err(Error::DuplicateUnit(unit.name().to_string()));
        }
        self.units.push(unit);
        Ok(())
    }

    /// Builder-style [`Self::register`].
    pub fn with(mut self, unit: TestUnit<C>) -> Result<Self> {
        self.register(unit)?;
        Ok(self)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestUnit<C>> {
        self.units.iter()
    }

    /// Registry restricted to the units matching `filter`.
    #[must_use]
    pub fn select(&self, filter: &UnitFilter) -> Self {
        Self {
            units: self
                .units
                .iter()
                .filter(|u| filter.matches(u))
                .cloned()
                .collect(),
        }
    }

    /// Distinct category labels in registration order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for unit in &self.units {
            if !categories.contains(&unit.category()) {
                categories.push(unit.category());
            }
        }
        categories
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(name: &str, category: &str) -> TestUnit<()> {
        TestUnit::from_fn(name, PrivilegeTier::None, category, |_ctx| async { Ok(()) })
    }

    #[test]
    fn registry_rejects_duplicate_names() {
        let mut registry = UnitRegistry::new();
        registry.register(unit("Ping", "Public")).unwrap();
        let err = registry.register(unit("Ping", "Public")).unwrap_err();
        assert!(matches!(err, Error::DuplicateUnit(name) if name == "Ping"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn filter_by_name_and_category() {
        let registry = UnitRegistry::new()
            .with(unit("Server Time", "Public"))
            .and_then(|r| r.with(unit("Account Info", "Account")))
            .and_then(|r| r.with(unit("Account Status", "Account")))
            .unwrap();

        let by_name = registry.select(&UnitFilter {
            name: Some("account".into()),
            category: None,
        });
        assert_eq!(by_name.len(), 2);

        let by_both = registry.select(&UnitFilter {
            name: Some("status".into()),
            category: Some("ACCOUNT".into()),
        });
        let names: Vec<&str> = by_both.iter().map(TestUnit::name).collect();
        assert_eq!(names, ["Account Status"]);

        assert_eq!(registry.select(&UnitFilter::default()).len(), 3);
        assert_eq!(registry.categories(), ["Public", "Account"]);
    }

    #[test]
    fn ensure_maps_to_assertion() {
        assert_eq!(ensure(true, "never"), Ok(()));
        assert_eq!(
            ensure(false, "price must be positive"),
            Err(UnitError::Assertion("price must be positive".into()))
        );
    }

    #[test]
    fn signal_converts_with_question_mark() {
        fn call() -> std::result::Result<u64, ErrorSignal> {
            Err(ErrorSignal::api(404, "missing"))
        }
        fn body() -> UnitResult {
            call()?;
            Ok(())
        }
        assert!(matches!(
            body(),
            Err(UnitError::Signal { endpoint: None, .. })
        ));
    }
}
