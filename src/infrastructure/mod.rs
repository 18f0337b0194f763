//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without
//! containing test policy: configuration, credential loading and runtime
//! wiring.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Configuration loading and validation
//! - [`credentials`] - Environment-backed credential source

pub mod bootstrap;
pub mod config;
pub mod credentials;
