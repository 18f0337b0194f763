//! Handler for the `run` command.

use tokio::signal;
use tokio::sync::watch;
use tracing::warn;

use crate::adapter::inbound::cli::command::{FilterArgs, RunArgs};
use crate::adapter::inbound::cli::output;
use crate::adapter::outbound::report;
use crate::adapter::outbound::rest::smoke;
use crate::application::unit::UnitFilter;
use crate::domain::{RunReport, TestOutcome};
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;

impl From<&FilterArgs> for UnitFilter {
    fn from(args: &FilterArgs) -> Self {
        Self {
            name: args.filter.clone(),
            category: args.category.clone(),
        }
    }
}

/// Execute the run command and return the process exit code.
pub async fn execute(args: &RunArgs) -> Result<i32> {
    let mut config = Config::load_or_default(args.config.as_deref())?;
    config.apply_env_overrides();
    apply_overrides(&mut config, args, output::is_json());
    config.validate()?;
    config.init_logging();

    let registry = smoke::public_suite()?.select(&UnitFilter::from(&args.filter));
    if registry.is_empty() {
        warn!("No test units match the given filter");
    }

    let runner = bootstrap::build_runner(&config)?;

    if !output::is_json() {
        output::header(env!("CARGO_PKG_VERSION"));
        output::field("Target", &config.server.base_url);
        output::field(
            "Configurations",
            runner
                .configurations()
                .iter()
                .map(|c| c.name())
                .collect::<Vec<_>>()
                .join(", "),
        );
        output::field("Units", registry.len());
        output::field("Min interval", format!("{}ms", config.harness.min_interval_ms));
        output::field("Workers", runner.workers());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let signal_task = tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Shutdown signal received, cancelling run");
            let _ = shutdown_tx.send(true);
        }
    });

    let report = runner.run_until(&registry, shutdown_rx).await;
    signal_task.abort();

    print_report(&report);
    Ok(report.exit_code())
}

fn apply_overrides(config: &mut Config, args: &RunArgs, force_json_logs: bool) {
    if args.all_auth {
        config.harness.test_all_auth_types = true;
    }
    if let Some(workers) = args.workers {
        config.harness.workers = workers;
    }
    if let Some(min_interval_ms) = args.min_interval_ms {
        config.harness.min_interval_ms = min_interval_ms;
    }
    if let Some(unit_timeout_secs) = args.unit_timeout_secs {
        config.harness.unit_timeout_secs = unit_timeout_secs;
    }
    if let Some(base_url) = &args.base_url {
        config.server.base_url.clone_from(base_url);
    }
    if let Some(level) = &args.log_level {
        config.logging.level.clone_from(level);
    }
    if args.json_logs || force_json_logs {
        config.logging.format = "json".into();
    }
}

fn print_results(report: &RunReport, verbose: bool) {
    for result in report.results() {
        let shown = match result.outcome() {
            TestOutcome::Failed => true,
            TestOutcome::Skipped => verbose || !result.is_insufficient_privilege(),
            TestOutcome::Passed => verbose,
        };
        if shown {
            output::outcome(
                result.outcome(),
                result.unit(),
                result.configuration(),
                result.error(),
            );
        }
    }
}

fn print_report(report: &RunReport) {
    if output::is_json() {
        output::json_output(report::to_json(report));
        return;
    }

    output::section("Results");
    if output::verbosity() > 1 {
        output::lines(&report::results_table(report, None));
    } else {
        print_results(report, output::verbosity() > 0);
    }

    output::section("Configurations");
    output::lines(&report::configuration_table(report));

    output::section("Summary");
    output::field("Run ID", report.run_id());
    output::field("Total", report.total());
    output::field("Passed", report.passed());
    output::field("Failed", report.failed());
    output::field("Skipped", report.skipped());
    output::field(
        "Success rate",
        report
            .success_rate()
            .map_or_else(|| "-".to_string(), |r| format!("{:.1}%", r * 100.0)),
    );
    output::field("Throttled", report.throttled_calls());
    output::field("Elapsed", format!("{:.2}s", report.elapsed().as_secs_f64()));
    output::field("Busy time", format!("{:.2}s", report.busy_time().as_secs_f64()));

    if report.is_success() {
        output::success("All executed units passed");
    } else {
        output::warning(&format!(
            "{} unit(s) failed",
            output::highlight(report.failed())
        ));
    }
}
