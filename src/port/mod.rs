//! Seams to the collaborators the harness does not own.
//!
//! - [`outbound::client`] - builds the authenticated API client for a
//!   configuration.
//! - [`outbound::credentials`] - looks up credential material.

pub mod outbound;
