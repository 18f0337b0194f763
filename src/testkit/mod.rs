//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`client`] - `ScriptedFactory`, a
//!   [`ClientFactory`](crate::port::outbound::client::ClientFactory) that hands
//!   out `StubClient`s and can fail `connect` per configuration.
//! - [`credentials`] - `StaticCredentials`, an in-memory credential source.
//! - [`units`] - Ready-made test units: passing, failing, slow, panicking.

pub mod client;
pub mod credentials;
pub mod units;
