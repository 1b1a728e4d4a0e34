use anyhow::{Context, Result};
use dotenv::dotenv;
use odds_arbitrage::arbitrage_engine::evaluate_markets;
use odds_arbitrage::config::Config;
use odds_arbitrage::normalization::build_market;
use odds_arbitrage::odds_fetcher::{fetch_all, OddsApiClient};
use odds_arbitrage::report::{render_opportunity, summarize};
use odds_arbitrage::shared_types::{Detection, Market};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let config = Config::from_env().context("loading configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let client = OddsApiClient::new(
        &config.api_url,
        config.api_key.clone(),
        config.regions.clone(),
        config.market.clone(),
        config.exchange_bookmakers.clone(),
    )
    .context("building odds client")?;

    let events = fetch_all(&client, &config.sports).await;
    info!(count = events.len(), "Fetched events. Normalizing...");

    let markets: Vec<Market> = events
        .iter()
        .map(|event| {
            let (market, normalized) =
                build_market(&event.id, &event.raw_quotes, |raw| config.is_excluded(&raw.bookmaker));
            for skipped in &normalized.skipped {
                warn!(
                    event = %event.id,
                    bookmaker = %skipped.bookmaker,
                    outcome = %skipped.outcome,
                    reason = %skipped.reason,
                    "Skipping invalid odds record"
                );
            }
            debug!(
                event = %event.id,
                quotes = market.quotes().len(),
                excluded = normalized.excluded,
                "Built market"
            );
            market
        })
        .collect();

    let results = evaluate_markets(&markets, config.total_stake);

    let mut opportunities = 0;
    let mut failures = 0;
    for (event, result) in events.iter().zip(&results) {
        match result {
            Ok(Detection::Arbitrage(arb)) => {
                opportunities += 1;
                println!("{}", render_opportunity(event, arb));
            }
            Ok(Detection::NoArbitrage { implied_sum }) => {
                debug!(event = %event.id, implied_sum = %implied_sum, "No arbitrage");
            }
            Err(e) => {
                failures += 1;
                warn!(event = %event.id, error = %e, "Could not evaluate event");
            }
        }
    }

    if opportunities == 0 {
        info!("No arbitrage opportunities found.");
    }
    info!("{}", summarize(events.len(), opportunities, failures));

    Ok(())
}
