//! Exprobe - rate-limited integration-test harness for exchange API clients.
//!
//! This crate runs a registry of named test units against every credential
//! configuration the environment provides, pacing outbound calls and
//! classifying server errors so that testnet gaps skip instead of fail.
//!
//! # Architecture
//!
//! - **`domain`** - Privilege tiers, credentials, configurations, error
//!   signals, results and reports. No I/O.
//! - **`port`** - Traits for the client under test and credential lookup
//! - **`application`** - Matrix builder, rate limiter, error classifier,
//!   invoker and suite runner
//! - **`infrastructure`** - TOML/env configuration, logging, wiring
//! - **`adapter`** - CLI (inbound), REST client and report rendering (outbound)
//!
//! # Features
//!
//! - `testkit` - Scripted clients, static credentials and unit builders for tests
//!
//! # Example
//!
//! ```no_run
//! use exprobe::adapter::outbound::rest::smoke;
//! use exprobe::infrastructure::bootstrap;
//! use exprobe::infrastructure::config::settings::Config;
//!
//! # async fn demo() -> exprobe::error::Result<()> {
//! let config = Config::load_or_default(None)?;
//! let runner = bootstrap::build_runner(&config)?;
//! let report = runner.run(&smoke::public_suite()?).await;
//! println!("{} passed, {} failed", report.passed(), report.failed());
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
