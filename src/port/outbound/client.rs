//! Client factory port.
//!
//! The generated exchange client is an external collaborator. The harness
//! only needs a way to obtain one for a given [`RunConfiguration`]; what the
//! client returns on success is the test body's business.

use async_trait::async_trait;

use crate::domain::{ErrorSignal, RunConfiguration};

/// Builds an API client authenticated for one run configuration.
#[async_trait]
pub trait ClientFactory: Send + Sync + 'static {
    /// Client handed to test bodies.
    type Client: Send + Sync + 'static;

    /// Build a client for `configuration`.
    ///
    /// Setup failures (unreadable key file, rejected handshake) are reported
    /// as an [`ErrorSignal`] so they go through the same classification as
    /// call failures.
    async fn connect(&self, configuration: &RunConfiguration) -> Result<Self::Client, ErrorSignal>;
}
