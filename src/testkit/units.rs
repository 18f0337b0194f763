//! Ready-made test units with fixed behavior.
//!
//! Generic over the client type so the same units drive both the scripted
//! factory and real adapters.

use std::time::Duration;

use crate::application::unit::{TestUnit, UnitError};
use crate::domain::{ErrorSignal, PrivilegeTier};

/// Category label used by every unit in this module.
pub const CATEGORY: &str = "Testkit";

/// Unit whose body always passes.
pub fn passing<C: Send + Sync + 'static>(
    name: impl Into<String>,
    required: PrivilegeTier,
) -> TestUnit<C> {
    TestUnit::from_fn(name, required, CATEGORY, |_ctx| async { Ok(()) })
}

/// Unit whose body always fails with `signal`.
pub fn failing_with<C: Send + Sync + 'static>(
    name: impl Into<String>,
    required: PrivilegeTier,
    signal: ErrorSignal,
) -> TestUnit<C> {
    TestUnit::from_fn(name, required, CATEGORY, move |_ctx| {
        let signal = signal.clone();
        async move { Err(UnitError::from(signal)) }
    })
}

/// Unit that hits an endpoint the environment does not serve.
pub fn not_found<C: Send + Sync + 'static>(name: impl Into<String>) -> TestUnit<C> {
    failing_with(
        name,
        PrivilegeTier::None,
        ErrorSignal::api(404, "Not Found"),
    )
}

/// Unit that sends a request the service cannot accept.
pub fn malformed_request<C: Send + Sync + 'static>(name: impl Into<String>) -> TestUnit<C> {
    failing_with(
        name,
        PrivilegeTier::None,
        ErrorSignal::undecodable(Some(400)).with_body(r#"{"code":-1102,"msg":"bad"}"#),
    )
}

/// Unit whose body sleeps for `duration` before passing.
pub fn sleeping<C: Send + Sync + 'static>(
    name: impl Into<String>,
    duration: Duration,
) -> TestUnit<C> {
    TestUnit::from_fn(name, PrivilegeTier::None, CATEGORY, move |_ctx| async move {
        tokio::time::sleep(duration).await;
        Ok(())
    })
}

/// Unit whose body panics.
pub fn panicking<C: Send + Sync + 'static>(name: impl Into<String>) -> TestUnit<C> {
    TestUnit::from_fn(name, PrivilegeTier::None, CATEGORY, |_ctx| async {
        panic!("unit body panicked on purpose")
    })
}
