//! Minimal spot REST client used by the bundled public smoke suite.
//!
//! Only unsigned endpoints are wrapped. Authenticated configurations attach
//! their API key header; request signing belongs to the full exchange
//! client, which plugs in through the same [`ClientFactory`] port.
//!
//! [`ClientFactory`]: crate::port::outbound::client::ClientFactory

pub mod client;
pub mod dto;
pub mod smoke;

pub use client::{RestClient, RestClientFactory};
