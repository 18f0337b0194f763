//! Harness-agnostic data model: tiers, credentials, configurations, signals
//! and results. Nothing here performs I/O.

pub mod classification;
pub mod configuration;
pub mod credential;
pub mod privilege;
pub mod report;
pub mod result;
pub mod signal;

pub use classification::Classification;
pub use configuration::{RunConfiguration, PUBLIC_CONFIGURATION};
pub use credential::{AuthMethod, Credential, SecretMaterial};
pub use privilege::PrivilegeTier;
pub use report::{ConfigurationSummary, RunReport};
pub use result::{TestOutcome, TestResult, INSUFFICIENT_PRIVILEGE};
pub use signal::{ErrorSignal, SignalKind, UNDECODABLE_MARKER};
