//! Infrastructure bootstrap helpers for runtime wiring.

use tracing::{info, warn};

use crate::adapter::outbound::rest::RestClientFactory;
use crate::application::matrix::CredentialMatrixBuilder;
use crate::application::runner::SuiteRunner;
use crate::domain::RunConfiguration;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::credentials::EnvCredentialSource;

/// Configurations available with the credentials in the environment.
#[must_use]
pub fn build_configurations(config: &Config) -> Vec<RunConfiguration> {
    let source = EnvCredentialSource::from_env(&config.credentials);
    let configurations = CredentialMatrixBuilder::new(&source)
        .test_all_methods(config.harness.test_all_auth_types)
        .build_configurations();

    if configurations.iter().all(RunConfiguration::is_public) {
        warn!("No API credentials configured; only public endpoints will run");
    }
    configurations
}

/// Runner wired to the REST adapter and the environment's credentials.
///
/// # Errors
///
/// Returns an error if the server base URL does not parse.
pub fn build_runner(config: &Config) -> Result<SuiteRunner<RestClientFactory>> {
    let factory = RestClientFactory::from_config(&config.server)?;
    let settings = config.harness.runner_settings();
    let runner = SuiteRunner::new(
        factory,
        build_configurations(config),
        config.classifier.build(),
        settings,
    );

    info!(
        base_url = %config.server.base_url,
        configurations = runner.configurations().len(),
        workers = settings.workers,
        "Runner ready"
    );
    Ok(runner)
}
