//! Outbound ports.

pub mod client;
pub mod credentials;
