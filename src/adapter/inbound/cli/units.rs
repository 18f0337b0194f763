//! Handler for the `units` command.

use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::UnitsArgs;
use crate::adapter::inbound::cli::output;
use crate::adapter::outbound::rest::smoke;
use crate::application::unit::{TestUnit, UnitFilter};
use crate::error::Result;

#[derive(Tabled)]
struct UnitRow {
    #[tabled(rename = "Unit")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Required")]
    required: &'static str,
}

impl<C> From<&TestUnit<C>> for UnitRow {
    fn from(unit: &TestUnit<C>) -> Self {
        Self {
            name: unit.name().to_string(),
            category: unit.category().to_string(),
            required: unit.required().as_str(),
        }
    }
}

/// List the registered units that match the filter.
pub fn execute(args: &UnitsArgs) -> Result<()> {
    let registry = smoke::public_suite()?.select(&UnitFilter::from(&args.filter));

    if output::is_json() {
        let units: Vec<_> = registry
            .iter()
            .map(|unit| {
                json!({
                    "name": unit.name(),
                    "category": unit.category(),
                    "required": unit.required(),
                })
            })
            .collect();
        output::json_output(json!({ "command": "units", "units": units }));
        return Ok(());
    }

    if registry.is_empty() {
        output::warning("No test units match the given filter");
        return Ok(());
    }

    output::section("Test Units");
    let rows: Vec<UnitRow> = registry.iter().map(UnitRow::from).collect();
    output::lines(&Table::new(rows).with(Style::rounded()).to_string());
    output::field("Total", registry.len());
    output::field("Categories", registry.categories().join(", "));
    Ok(())
}
