//! Infrastructure configuration modules.

pub mod classifier;
pub mod credentials;
pub mod harness;
pub mod logging;
pub mod server;
pub mod settings;
