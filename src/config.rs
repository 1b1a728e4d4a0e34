use crate::error::ConfigError;
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

pub const DEFAULT_API_URL: &str = "https://api.the-odds-api.com";
pub const DEFAULT_EXCHANGES: &[&str] = &["betfair_ex_uk", "betfair_ex_eu", "betfair_ex_au", "matchbook"];

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_key: String,
    pub api_url: String,
    pub sports: Vec<String>,
    pub regions: String,
    pub market: String,
    pub total_stake: Decimal,
    pub exchange_bookmakers: Vec<String>,
    pub excluded_bookmakers: Vec<String>,
    pub log_level: String,
}

impl Config {
    /// Reads settings from the process environment. Call `dotenv().ok()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("ODDS_API_KEY").ok_or(ConfigError::Missing("ODDS_API_KEY"))?;

        let total_stake = match get("TOTAL_STAKE") {
            Some(raw) => match Decimal::from_str(raw.trim()) {
                Ok(stake) if stake > Decimal::ZERO => stake,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "TOTAL_STAKE",
                        value: raw,
                    })
                }
            },
            None => Decimal::from(1000),
        };

        let sports = get("ODDS_SPORTS")
            .map(|v| split_list(&v))
            .unwrap_or_else(|| vec!["soccer_epl".to_string()]);
        if sports.is_empty() {
            return Err(ConfigError::Invalid {
                key: "ODDS_SPORTS",
                value: get("ODDS_SPORTS").unwrap_or_default(),
            });
        }

        Ok(Self {
            api_key,
            api_url: get("ODDS_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            sports,
            regions: get("ODDS_REGIONS").unwrap_or_else(|| "uk".to_string()),
            market: get("ODDS_MARKET").unwrap_or_else(|| "h2h".to_string()),
            total_stake,
            exchange_bookmakers: get("EXCHANGE_BOOKMAKERS")
                .map(|v| split_list(&v))
                .unwrap_or_else(|| DEFAULT_EXCHANGES.iter().map(|s| s.to_string()).collect()),
            excluded_bookmakers: get("EXCLUDED_BOOKMAKERS")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn is_excluded(&self, bookmaker: &str) -> bool {
        self.excluded_bookmakers
            .iter()
            .any(|b| b.eq_ignore_ascii_case(bookmaker))
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
