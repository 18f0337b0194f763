//! Built-in public smoke suite.
//!
//! NONE-tier units only, so every configuration runs them. Endpoint names
//! used for error attribution are the REST paths in
//! [`endpoint`](super::client::endpoint).

use std::future::Future;

use chrono::Utc;

use super::client::{endpoint, RestClient};
use crate::application::unit::{
    ensure, TestUnit, UnitContext, UnitError, UnitRegistry, UnitResult,
};
use crate::domain::{ErrorSignal, PrivilegeTier};
use crate::error::Result;

pub const CATEGORY: &str = "Public";

/// Symbol queried by the market-data units.
pub const SYMBOL: &str = "BTCUSDT";

/// Largest tolerated difference between local and server clocks.
pub const MAX_CLOCK_SKEW_MS: i64 = 10 * 60 * 1000;

const DEPTH_LIMIT: u16 = 5;

fn at(endpoint: &'static str) -> impl FnOnce(ErrorSignal) -> UnitError {
    move |signal| UnitError::at(endpoint, signal)
}

fn public_unit<F, Fut>(name: &str, body: F) -> TestUnit<RestClient>
where
    F: Fn(UnitContext<RestClient>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = UnitResult> + Send + 'static,
{
    TestUnit::from_fn(name, PrivilegeTier::None, CATEGORY, body)
}

fn parse_price(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|p| p.is_finite())
}

/// Registry of the bundled public endpoint checks.
///
/// # Errors
///
/// Only fails if two units share a name.
pub fn public_suite() -> Result<UnitRegistry<RestClient>> {
    UnitRegistry::new()
        .with(public_unit(
            "Ping",
            |ctx| async move { ctx.client().ping().await.map_err(at(endpoint::PING)) },
        ))?
        .with(public_unit(
            "Server Time",
            |ctx| async move {
                let time = ctx
                    .client()
                    .server_time()
                    .await
                    .map_err(at(endpoint::SERVER_TIME))?;
                ensure(time.server_time > 0, "server time must be positive")?;
                let skew = (Utc::now().timestamp_millis() - time.server_time).abs();
                ensure(
                    skew <= MAX_CLOCK_SKEW_MS,
                    format!("server clock differs from local clock by {skew} ms"),
                )
            },
        ))?
        .with(public_unit(
            "Exchange Info",
            |ctx| async move {
                let all = ctx
                    .client()
                    .exchange_info(None)
                    .await
                    .map_err(at(endpoint::EXCHANGE_INFO))?;
                ensure(!all.symbols.is_empty(), "exchange info lists no symbols")?;

                ctx.throttle().await?;
                let single = ctx
                    .client()
                    .exchange_info(Some(SYMBOL))
                    .await
                    .map_err(at(endpoint::EXCHANGE_INFO))?;
                ensure(
                    single.symbols.len() == 1 && single.symbols[0].symbol == SYMBOL,
                    format!("symbol filter did not narrow the listing to {SYMBOL}"),
                )
            },
        ))?
        .with(public_unit(
            "Average Price",
            |ctx| async move {
                let avg = ctx
                    .client()
                    .avg_price(SYMBOL)
                    .await
                    .map_err(at(endpoint::AVG_PRICE))?;
                ensure(avg.mins > 0, "average price window must be positive")?;
                ensure(
                    parse_price(&avg.price).is_some_and(|p| p > 0.0),
                    format!("average price {:?} is not a positive number", avg.price),
                )
            },
        ))?
        .with(public_unit(
            "Order Book Depth",
            |ctx| async move {
                let depth = ctx
                    .client()
                    .depth(SYMBOL, DEPTH_LIMIT)
                    .await
                    .map_err(at(endpoint::DEPTH))?;
                let limit = usize::from(DEPTH_LIMIT);
                ensure(
                    depth.bids.len() <= limit && depth.asks.len() <= limit,
                    format!("order book returned more than {limit} levels"),
                )?;
                if let (Some(bid), Some(ask)) = (depth.bids.first(), depth.asks.first()) {
                    let (bid, ask) = (parse_price(&bid[0]), parse_price(&ask[0]));
                    ensure(
                        matches!((bid, ask), (Some(b), Some(a)) if b < a),
                        "best bid must be below best ask",
                    )?;
                }
                Ok(())
            },
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suite_is_public_and_unique() {
        let suite = public_suite().unwrap();
        assert_eq!(suite.len(), 5);
        assert!(suite.iter().all(|u| u.required() == PrivilegeTier::None));
        assert_eq!(suite.categories(), [CATEGORY]);
    }

    #[test]
    fn price_parsing() {
        assert_eq!(parse_price("4.00000200"), Some(4.000_002));
        assert_eq!(parse_price("abc"), None);
        assert_eq!(parse_price("NaN"), None);
    }
}
