#![allow(dead_code)]

use std::time::Duration;

use exprobe::application::{ErrorClassifier, RunnerSettings, SuiteRunner};
use exprobe::domain::{Credential, RunConfiguration};
use exprobe::testkit::client::ScriptedFactory;

pub fn settings(min_interval: Duration, workers: usize) -> RunnerSettings {
    RunnerSettings {
        min_interval,
        unit_timeout: Duration::from_secs(30),
        workers,
    }
}

pub fn fast_settings() -> RunnerSettings {
    settings(Duration::ZERO, 4)
}

pub fn hmac_configuration() -> RunConfiguration {
    RunConfiguration::authenticated(Credential::hmac("test-key", "test-secret"))
}

pub fn public_runner(settings: RunnerSettings) -> SuiteRunner<ScriptedFactory> {
    SuiteRunner::new(
        ScriptedFactory::new(),
        vec![RunConfiguration::public()],
        ErrorClassifier::new(),
        settings,
    )
}

pub fn runner_with(
    configurations: Vec<RunConfiguration>,
    settings: RunnerSettings,
) -> SuiteRunner<ScriptedFactory> {
    SuiteRunner::new(
        ScriptedFactory::new(),
        configurations,
        ErrorClassifier::new(),
        settings,
    )
}

pub mod stub_server;
