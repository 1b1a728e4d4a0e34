use crate::error::FetchError;
use crate::shared_types::{BookmakerKind, Event, Outcome, RawPrice, RawQuote};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Deserialize, Debug)]
pub struct ApiEvent {
    id: String,
    sport_key: String,
    #[serde(default)]
    sport_title: String,
    commence_time: DateTime<Utc>,
    home_team: String,
    away_team: String,
    #[serde(default)]
    bookmakers: Vec<ApiBookmaker>,
}

#[derive(Deserialize, Debug)]
struct ApiBookmaker {
    key: String,
    title: String,
    #[serde(default)]
    markets: Vec<ApiMarket>,
}

#[derive(Deserialize, Debug)]
struct ApiMarket {
    key: String,
    #[serde(default)]
    outcomes: Vec<ApiOutcome>,
}

#[derive(Deserialize, Debug)]
struct ApiOutcome {
    name: String,
    price: f64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Sport {
    pub key: String,
    pub group: String,
    pub title: String,
    pub active: bool,
    #[serde(default)]
    pub has_outrights: bool,
}

/// Anything that can hand over raw odds for the events of one sport.
#[async_trait]
pub trait OddsSource: Send + Sync {
    async fn fetch_events(&self, sport_key: &str) -> Result<Vec<Event>, FetchError>;
}

pub struct OddsApiClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    regions: String,
    market: String,
    exchange_keys: Vec<String>,
}

impl OddsApiClient {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        regions: impl Into<String>,
        market: impl Into<String>,
        exchange_keys: Vec<String>,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: Url::parse(base_url)?,
            api_key: api_key.into(),
            regions: regions.into(),
            market: market.into(),
            exchange_keys,
        })
    }

    pub async fn list_sports(&self) -> Result<Vec<Sport>, FetchError> {
        let mut url = self.base_url.join("/v4/sports/")?;
        url.query_pairs_mut().append_pair("apiKey", &self.api_key);

        let response = self.client.get(url).send().await?;
        log_quota(response.headers());
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }

    fn odds_url(&self, sport_key: &str) -> Result<Url, FetchError> {
        let mut url = self
            .base_url
            .join(&format!("/v4/sports/{}/odds/", sport_key))?;
        url.query_pairs_mut()
            .append_pair("apiKey", &self.api_key)
            .append_pair("regions", &self.regions)
            .append_pair("markets", &self.market)
            .append_pair("oddsFormat", "decimal");
        Ok(url)
    }
}

#[async_trait]
impl OddsSource for OddsApiClient {
    async fn fetch_events(&self, sport_key: &str) -> Result<Vec<Event>, FetchError> {
        let url = self.odds_url(sport_key)?;
        info!(sport = sport_key, regions = %self.regions, market = %self.market, "Fetching odds");

        let response = self
            .client
            .get(url)
            .header("User-Agent", "OddsArbitrageScanner/1.0")
            .send()
            .await?;
        log_quota(response.headers());
        let response = ensure_success(response).await?;

        let api_events: Vec<ApiEvent> = response.json().await?;
        debug!(sport = sport_key, count = api_events.len(), "Fetched events");

        Ok(events_from_api(api_events, &self.market, &self.exchange_keys))
    }
}

/// Fetches every sport concurrently. A failed sport is logged and left out.
pub async fn fetch_all<S: OddsSource + ?Sized>(source: &S, sports: &[String]) -> Vec<Event> {
    let fetches = sports
        .iter()
        .map(|sport| async move { (sport, source.fetch_events(sport).await) });

    let mut events = Vec::new();
    for (sport, result) in join_all(fetches).await {
        match result {
            Ok(mut batch) => events.append(&mut batch),
            Err(e) => warn!(sport = %sport, error = %e, "Failed to fetch odds"),
        }
    }
    events
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(FetchError::Status { status, body })
}

fn log_quota(headers: &HeaderMap) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("?")
            .to_string()
    };
    debug!(
        remaining = %header("x-requests-remaining"),
        used = %header("x-requests-used"),
        "Odds API quota"
    );
}

/// Flattens the provider payload into one [`Event`] per fixture, reading only `market_key`.
pub fn events_from_api(
    api_events: Vec<ApiEvent>,
    market_key: &str,
    exchange_keys: &[String],
) -> Vec<Event> {
    api_events
        .into_iter()
        .map(|api_event| {
            let mut bookmaker_titles = HashMap::new();
            let mut raw_quotes = Vec::new();

            for bookmaker in api_event.bookmakers {
                let kind = BookmakerKind::classify(&bookmaker.key, exchange_keys);
                for market in bookmaker.markets.iter().filter(|m| m.key == market_key) {
                    for outcome in &market.outcomes {
                        raw_quotes.push(RawQuote {
                            bookmaker: bookmaker.key.clone(),
                            kind,
                            outcome: Outcome::new(outcome.name.clone()),
                            price: RawPrice::Decimal(outcome.price),
                        });
                    }
                }
                bookmaker_titles.insert(bookmaker.key, bookmaker.title);
            }

            Event {
                id: api_event.id,
                sport_key: api_event.sport_key,
                sport_title: api_event.sport_title,
                home_team: api_event.home_team,
                away_team: api_event.away_team,
                commence_time: api_event.commence_time,
                bookmaker_titles,
                raw_quotes,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"[
      {
        "id": "e912304de2b2ce35b473ce2ecd3d1502",
        "sport_key": "soccer_epl",
        "sport_title": "EPL",
        "commence_time": "2024-10-19T11:30:00Z",
        "home_team": "Tottenham Hotspur",
        "away_team": "West Ham United",
        "bookmakers": [
          {
            "key": "williamhill",
            "title": "William Hill",
            "last_update": "2024-10-18T09:01:12Z",
            "markets": [
              {
                "key": "h2h",
                "last_update": "2024-10-18T09:01:12Z",
                "outcomes": [
                  { "name": "Tottenham Hotspur", "price": 1.53 },
                  { "name": "West Ham United", "price": 5.5 },
                  { "name": "Draw", "price": 4.5 }
                ]
              },
              {
                "key": "totals",
                "outcomes": [ { "name": "Over", "price": 1.7 } ]
              }
            ]
          },
          {
            "key": "betfair_ex_uk",
            "title": "Betfair",
            "markets": [
              {
                "key": "h2h",
                "outcomes": [
                  { "name": "Tottenham Hotspur", "price": 1.56 },
                  { "name": "West Ham United", "price": 6.0 },
                  { "name": "Draw", "price": 4.7 }
                ]
              }
            ]
          }
        ]
      }
    ]"#;

    #[test]
    fn test_events_from_api() {
        let api_events: Vec<ApiEvent> = serde_json::from_str(PAYLOAD).unwrap();
        let exchanges = vec!["betfair_ex_uk".to_string()];
        let events = events_from_api(api_events, "h2h", &exchanges);

        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.home_team, "Tottenham Hotspur");
        assert_eq!(event.raw_quotes.len(), 6);
        assert_eq!(event.bookmaker_title("williamhill"), "William Hill");
        assert_eq!(event.bookmaker_title("unknown"), "unknown");

        let exchange_quotes = event
            .raw_quotes
            .iter()
            .filter(|q| q.kind == BookmakerKind::Exchange)
            .count();
        assert_eq!(exchange_quotes, 3);
        assert_eq!(event.raw_quotes[2].outcome, Outcome::new("Draw"));
        assert_eq!(event.raw_quotes[2].price, RawPrice::Decimal(4.5));
    }

    #[test]
    fn test_odds_url_carries_query() {
        let client = OddsApiClient::new("https://api.the-odds-api.com", "key123", "uk", "h2h", vec![]).unwrap();
        let url = client.odds_url("soccer_epl").unwrap();
        assert_eq!(url.path(), "/v4/sports/soccer_epl/odds/");
        let query: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(query["apiKey"], "key123");
        assert_eq!(query["regions"], "uk");
        assert_eq!(query["markets"], "h2h");
        assert_eq!(query["oddsFormat"], "decimal");
    }

    struct FixtureSource;

    #[async_trait]
    impl OddsSource for FixtureSource {
        async fn fetch_events(&self, sport_key: &str) -> Result<Vec<Event>, FetchError> {
            if sport_key == "broken" {
                return Err(FetchError::Status {
                    status: reqwest::StatusCode::UNAUTHORIZED,
                    body: "invalid api key".to_string(),
                });
            }
            let api_events: Vec<ApiEvent> = serde_json::from_str(PAYLOAD).unwrap();
            Ok(events_from_api(api_events, "h2h", &[]))
        }
    }

    #[tokio::test]
    async fn test_fetch_all_skips_failed_sports() {
        let sports = vec![
            "soccer_epl".to_string(),
            "broken".to_string(),
            "soccer_efl_champ".to_string(),
        ];
        let events = fetch_all(&FixtureSource, &sports).await;
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.sport_key == "soccer_epl"));
    }
}
