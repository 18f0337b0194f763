//! Run report rendering: tables for the terminal, a JSON document for scripts.

use serde_json::{json, Value};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::domain::{RunReport, TestOutcome, TestResult};

#[derive(Tabled)]
struct ConfigurationRow {
    #[tabled(rename = "Configuration")]
    configuration: String,
    #[tabled(rename = "Passed")]
    passed: usize,
    #[tabled(rename = "Failed")]
    failed: usize,
    #[tabled(rename = "Skipped")]
    skipped: usize,
    #[tabled(rename = "Success")]
    success_rate: String,
    #[tabled(rename = "Time")]
    elapsed: String,
}

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Configuration")]
    configuration: String,
    #[tabled(rename = "Outcome")]
    outcome: &'static str,
    #[tabled(rename = "Time")]
    elapsed: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

fn percent(rate: Option<f64>) -> String {
    rate.map_or_else(|| "-".to_string(), |r| format!("{:.1}%", r * 100.0))
}

fn millis(duration: std::time::Duration) -> String {
    format!("{}ms", duration.as_millis())
}

/// Per-configuration pass/fail/skip table.
#[must_use]
pub fn configuration_table(report: &RunReport) -> String {
    let rows: Vec<ConfigurationRow> = report
        .by_configuration()
        .into_iter()
        .map(|summary| ConfigurationRow {
            success_rate: percent(summary.success_rate()),
            elapsed: millis(summary.elapsed),
            configuration: summary.configuration,
            passed: summary.passed,
            failed: summary.failed,
            skipped: summary.skipped,
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

/// One row per result, optionally restricted to a single outcome.
#[must_use]
pub fn results_table(report: &RunReport, only: Option<TestOutcome>) -> String {
    let rows: Vec<ResultRow> = report
        .results()
        .iter()
        .filter(|r| only.map_or(true, |outcome| r.outcome() == outcome))
        .map(|r| ResultRow {
            unit: r.unit().to_string(),
            configuration: r.configuration().to_string(),
            outcome: r.outcome().as_str(),
            elapsed: millis(r.duration()),
            reason: r.error().unwrap_or_default().to_string(),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

fn result_json(result: &TestResult) -> Value {
    json!({
        "unit": result.unit(),
        "category": result.category(),
        "configuration": result.configuration(),
        "outcome": result.outcome(),
        "duration_ms": result.duration().as_millis() as u64,
        "reason": result.error(),
    })
}

/// Machine-readable report document.
#[must_use]
pub fn to_json(report: &RunReport) -> Value {
    let configurations: Vec<Value> = report
        .by_configuration()
        .into_iter()
        .map(|summary| {
            json!({
                "configuration": summary.configuration,
                "passed": summary.passed,
                "failed": summary.failed,
                "skipped": summary.skipped,
                "success_rate": summary.success_rate(),
                "elapsed_ms": summary.elapsed.as_millis() as u64,
            })
        })
        .collect();

    json!({
        "run_id": report.run_id().to_string(),
        "started_at": report.started_at().to_rfc3339(),
        "elapsed_ms": report.elapsed().as_millis() as u64,
        "throttled_calls": report.throttled_calls(),
        "summary": {
            "total": report.total(),
            "passed": report.passed(),
            "failed": report.failed(),
            "skipped": report.skipped(),
            "success_rate": report.success_rate(),
        },
        "configurations": configurations,
        "results": report.results().iter().map(result_json).collect::<Vec<_>>(),
        "exit_code": report.exit_code(),
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;

    use super::*;

    fn report() -> RunReport {
        let result = |unit: &str, configuration: &str, outcome, error: Option<&str>| {
            TestResult::new(
                unit,
                "Public",
                configuration,
                outcome,
                Duration::from_millis(12),
                error.map(str::to_string),
            )
        };
        RunReport::new(
            Utc::now(),
            Duration::from_millis(40),
            3,
            vec![
                result("Ping", "HMAC Authentication", TestOutcome::Passed, None),
                result(
                    "Order",
                    "HMAC Authentication",
                    TestOutcome::Failed,
                    Some("malformed request"),
                ),
                result("Ping", "Public Endpoints", TestOutcome::Passed, None),
                result(
                    "Order",
                    "Public Endpoints",
                    TestOutcome::Skipped,
                    Some("insufficient privilege"),
                ),
            ],
        )
    }

    #[test]
    fn configuration_table_has_one_row_per_configuration() {
        let table = configuration_table(&report());
        assert!(table.contains("HMAC Authentication"));
        assert!(table.contains("Public Endpoints"));
        assert!(table.contains("50.0%"));
        assert!(table.contains("100.0%"));
    }

    #[test]
    fn results_table_filters_by_outcome() {
        let table = results_table(&report(), Some(TestOutcome::Skipped));
        assert!(table.contains("insufficient privilege"));
        assert!(!table.contains("malformed request"));
    }

    #[test]
    fn json_document_shape() {
        let report = report();
        let doc = to_json(&report);
        assert_eq!(doc["run_id"], report.run_id().to_string());
        assert_eq!(doc["throttled_calls"], 3);
        assert_eq!(doc["summary"]["failed"], 1);
        assert_eq!(doc["configurations"].as_array().unwrap().len(), 2);
        assert_eq!(doc["results"][3]["outcome"], "skipped");
        assert_eq!(doc["results"][3]["reason"], "insufficient privilege");
        assert_eq!(doc["results"][0]["reason"], Value::Null);
        assert_eq!(doc["exit_code"], 1);
    }
}
