//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all harness settings.
//! Configuration is loaded from a TOML file; every section is optional.
//! Credential material is never read from the file, only the names of the
//! environment variables holding it.
//!
//! # Example
//!
//! ```no_run
//! use exprobe::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("exprobe.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use url::Url;

use super::classifier::ClassifierConfig;
use super::credentials::CredentialsConfig;
use super::harness::HarnessConfig;
use super::logging::LoggingConfig;
use super::server::ServerConfig;
use crate::error::{ConfigError, Result};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "exprobe.toml";

/// Environment flag that forces every signing method to run.
pub const TEST_ALL_AUTH_TYPES_ENV: &str = "TEST_ALL_AUTH_TYPES";

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Pacing, timeouts and worker count.
    #[serde(default)]
    pub harness: HarnessConfig,

    /// Target service.
    #[serde(default)]
    pub server: ServerConfig,

    /// Environment variable names for credential material.
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Additional skip phrases and per-endpoint error codes.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML content and validate it.
    ///
    /// Environment overrides are not applied here; see
    /// [`Config::apply_env_overrides`].
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load `path` when given, else [`DEFAULT_CONFIG_PATH`] when it exists,
    /// else built-in defaults.
    #[allow(clippy::result_large_err)]
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::load(DEFAULT_CONFIG_PATH),
            None => Ok(Self::default()),
        }
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var(TEST_ALL_AUTH_TYPES_ENV) {
            self.apply_test_all_flag(&value);
        }
    }

    fn apply_test_all_flag(&mut self, value: &str) {
        if parse_flag(value) {
            self.harness.test_all_auth_types = true;
        }
    }

    /// Initialize tracing from the `[logging]` section.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Validate configuration values.
    ///
    /// Checks that values are within acceptable ranges.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.harness.workers == 0 {
            return Err(ConfigError::InvalidValue {
                field: "workers",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.harness.unit_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "unit_timeout_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.server.base_url.is_empty() {
            return Err(ConfigError::MissingField { field: "base_url" }.into());
        }
        match Url::parse(&self.server.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::InvalidValue {
                    field: "base_url",
                    reason: format!("unsupported scheme '{}'", url.scheme()),
                }
                .into());
            }
            Err(e) => {
                return Err(ConfigError::InvalidValue {
                    field: "base_url",
                    reason: e.to_string(),
                }
                .into());
            }
        }
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.server.retry_max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retry_max_attempts",
                reason: "must be at least 1".to_string(),
            }
            .into());
        }

        let names = [
            ("hmac_api_key_env", &self.credentials.hmac_api_key_env),
            ("hmac_secret_key_env", &self.credentials.hmac_secret_key_env),
            ("rsa_api_key_env", &self.credentials.rsa_api_key_env),
            (
                "rsa_private_key_path_env",
                &self.credentials.rsa_private_key_path_env,
            ),
            ("ed25519_api_key_env", &self.credentials.ed25519_api_key_env),
            (
                "ed25519_private_key_path_env",
                &self.credentials.ed25519_private_key_path_env,
            ),
        ];
        if let Some(&(field, _)) = names.iter().find(|(_, name)| name.trim().is_empty()) {
            return Err(ConfigError::MissingField { field }.into());
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "format",
                reason: "must be \"pretty\" or \"json\"".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}
