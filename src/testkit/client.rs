//! Scripted client factory for driving the runner without a network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{ErrorSignal, RunConfiguration};
use crate::port::outbound::client::ClientFactory;

/// Client handed to unit bodies by [`ScriptedFactory`].
#[derive(Debug, Clone)]
pub struct StubClient {
    configuration: String,
    authenticated: bool,
}

impl StubClient {
    /// Name of the configuration this client was built for.
    pub fn configuration(&self) -> &str {
        &self.configuration
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

/// Factory with per-configuration connect failures and a shared call counter.
///
/// `connect()` succeeds unless a failure was scripted for the configuration
/// name via [`ScriptedFactory::fail_connect`].
pub struct ScriptedFactory {
    connect_failures: HashMap<String, ErrorSignal>,
    connect_count: Arc<AtomicU32>,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self {
            connect_failures: HashMap::new(),
            connect_count: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Make every `connect()` for `configuration` fail with `signal`.
    pub fn fail_connect(mut self, configuration: impl Into<String>, signal: ErrorSignal) -> Self {
        self.connect_failures.insert(configuration.into(), signal);
        self
    }

    /// Shared counter for asserting how many clients were built.
    pub fn counter(&self) -> Arc<AtomicU32> {
        self.connect_count.clone()
    }

    pub fn connect_count(&self) -> u32 {
        self.connect_count.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClientFactory for ScriptedFactory {
    type Client = StubClient;

    async fn connect(&self, configuration: &RunConfiguration) -> Result<StubClient, ErrorSignal> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        if let Some(signal) = self.connect_failures.get(configuration.name()) {
            return Err(signal.clone());
        }
        Ok(StubClient {
            configuration: configuration.name().to_string(),
            authenticated: !configuration.is_public(),
        })
    }
}
