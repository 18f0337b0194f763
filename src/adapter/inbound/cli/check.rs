//! Configuration validation command handler.

use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::domain::AuthMethod;
use crate::error::Result;
use crate::infrastructure::config::settings::{Config, DEFAULT_CONFIG_PATH};
use crate::infrastructure::credentials::EnvCredentialSource;
use crate::port::outbound::credentials::CredentialSource;

/// Validate configuration without running anything.
pub fn execute_config(config_path: Option<&Path>) -> Result<()> {
    let mut config = Config::load_or_default(config_path)?;
    config.apply_env_overrides();
    config.init_logging();

    let source = EnvCredentialSource::from_env(&config.credentials);
    let methods: Vec<&str> = AuthMethod::ALL
        .iter()
        .filter(|method| source.credential(**method).is_some())
        .map(|method| method.label())
        .collect();
    let path_display = config_path.map_or_else(
        || {
            if Path::new(DEFAULT_CONFIG_PATH).exists() {
                DEFAULT_CONFIG_PATH.to_string()
            } else {
                "(built-in defaults)".to_string()
            }
        },
        |p| p.display().to_string(),
    );

    if output::is_json() {
        output::json_output(json!({
            "command": "check.config",
            "valid": true,
            "config": path_display,
            "base_url": config.server.base_url,
            "min_interval_ms": config.harness.min_interval_ms,
            "unit_timeout_secs": config.harness.unit_timeout_secs,
            "workers": config.harness.workers,
            "test_all_auth_types": config.harness.test_all_auth_types,
            "credentials": methods,
            "extra_phrases": config.classifier.extra_phrases.len(),
            "endpoint_code_rules": config.classifier.endpoint_codes.len(),
        }));
        return Ok(());
    }

    output::section("Configuration Check");
    output::field("Config", &path_display);
    output::success("Configuration is valid");

    output::section("Summary");
    output::field("Base URL", &config.server.base_url);
    output::field("Min interval", format!("{}ms", config.harness.min_interval_ms));
    output::field("Unit timeout", format!("{}s", config.harness.unit_timeout_secs));
    output::field("Workers", config.harness.workers);
    output::field("Test all auth", config.harness.test_all_auth_types);
    output::field("Extra phrases", config.classifier.extra_phrases.len());
    output::field("Code rules", config.classifier.endpoint_codes.len());

    if methods.is_empty() {
        output::warning("No API credentials detected; only public endpoints will run");
        output::hint(&format!(
            "set {} and {} for HMAC",
            config.credentials.hmac_api_key_env, config.credentials.hmac_secret_key_env
        ));
    } else {
        output::success(&format!("Credentials detected: {}", methods.join(", ")));
    }

    Ok(())
}
