use anyhow::{Context, Result};
use dotenv::dotenv;
use odds_arbitrage::config::Config;
use odds_arbitrage::odds_fetcher::OddsApiClient;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let config = Config::from_env().context("loading configuration")?;

    println!("Connecting to {}...", config.api_url);

    let client = OddsApiClient::new(
        &config.api_url,
        config.api_key.clone(),
        config.regions.clone(),
        config.market.clone(),
        config.exchange_bookmakers.clone(),
    )?;

    let sports = client.list_sports().await.context("listing sports")?;
    let active = sports.iter().filter(|s| s.active).count();
    println!("✅ Connection Successful. {} sports listed, {} in season.", sports.len(), active);

    for sport in &config.sports {
        match sports.iter().find(|s| &s.key == sport) {
            Some(s) if s.active => println!("✅ {} ({}) is in season", s.key, s.title),
            Some(s) => println!("⚠️  {} ({}) is out of season", s.key, s.title),
            None => println!("❌ {} is not a known sport key", sport),
        }
    }

    Ok(())
}
