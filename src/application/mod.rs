//! Application services (use cases).
//!
//! These services build the configuration matrix, pace and classify calls,
//! and run a unit registry across every configuration.

pub mod classifier;
pub mod deadline;
pub mod invoke;
pub mod matrix;
pub mod rate_limit;
pub mod runner;
pub mod shutdown;
pub mod unit;

pub use classifier::ErrorClassifier;
pub use invoke::Invoker;
pub use matrix::CredentialMatrixBuilder;
pub use rate_limit::RateLimiter;
pub use runner::{RunnerSettings, SuiteRunner};
pub use unit::{
    ensure, TestUnit, UnitBody, UnitContext, UnitError, UnitFilter, UnitRegistry, UnitResult,
};
