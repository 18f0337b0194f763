//! Handler for the `matrix` command.

use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::MatrixArgs;
use crate::adapter::inbound::cli::output;
use crate::application::matrix::highest_tier;
use crate::domain::RunConfiguration;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;

#[derive(Tabled)]
struct ConfigurationRow {
    #[tabled(rename = "Configuration")]
    name: String,
    #[tabled(rename = "Method")]
    method: &'static str,
    #[tabled(rename = "Tier")]
    tier: &'static str,
}

impl From<&RunConfiguration> for ConfigurationRow {
    fn from(configuration: &RunConfiguration) -> Self {
        Self {
            name: configuration.name().to_string(),
            method: configuration.method().map_or("-", |m| m.label()),
            tier: configuration.granted().as_str(),
        }
    }
}

/// Show the configurations the current environment yields.
pub fn execute(args: &MatrixArgs) -> Result<()> {
    let mut config = Config::load_or_default(args.config.as_deref())?;
    config.apply_env_overrides();
    if args.all_auth {
        config.harness.test_all_auth_types = true;
    }
    config.validate()?;
    config.init_logging();

    let configurations = bootstrap::build_configurations(&config);

    if output::is_json() {
        let rows: Vec<_> = configurations
            .iter()
            .map(|c| {
                json!({
                    "name": c.name(),
                    "method": c.method(),
                    "tier": c.granted(),
                })
            })
            .collect();
        output::json_output(json!({
            "command": "matrix",
            "test_all_auth_types": config.harness.test_all_auth_types,
            "highest_tier": highest_tier(&configurations),
            "configurations": rows,
        }));
        return Ok(());
    }

    output::section("Configuration Matrix");
    let rows: Vec<ConfigurationRow> = configurations.iter().map(ConfigurationRow::from).collect();
    output::lines(&Table::new(rows).with(Style::rounded()).to_string());
    output::field("Highest tier", highest_tier(&configurations));

    if configurations.iter().all(RunConfiguration::is_public) {
        output::warning("No API credentials detected");
        output::hint(&format!(
            "set {} and {} to add an HMAC configuration",
            config.credentials.hmac_api_key_env, config.credentials.hmac_secret_key_env
        ));
    } else if !config.harness.test_all_auth_types {
        output::note("Only the preferred authentication method is used; pass --all-auth for all");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Credential, PrivilegeTier};

    #[test]
    fn public_row() {
        let row = ConfigurationRow::from(&RunConfiguration::public());
        assert_eq!(row.method, "-");
        assert_eq!(row.tier, PrivilegeTier::None.as_str());
    }

    #[test]
    fn authenticated_row() {
        let row = ConfigurationRow::from(&RunConfiguration::authenticated(Credential::hmac(
            "key", "secret",
        )));
        assert_eq!(row.name, "HMAC Authentication");
        assert_eq!(row.method, "HMAC");
    }
}
