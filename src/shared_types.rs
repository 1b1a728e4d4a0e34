use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;

use crate::error::InvalidOddsRecord;

/// One possible result of an event, e.g. a team name or "Draw".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Outcome(String);

impl Outcome {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn label(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookmakerKind {
    Traditional,
    Exchange,
}

impl BookmakerKind {
    /// Exchange keys are matched case-insensitively against the provider's bookmaker key.
    pub fn classify(bookmaker_key: &str, exchange_keys: &[String]) -> Self {
        if exchange_keys
            .iter()
            .any(|k| k.eq_ignore_ascii_case(bookmaker_key))
        {
            BookmakerKind::Exchange
        } else {
            BookmakerKind::Traditional
        }
    }
}

/// Odds exactly as the provider delivered them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawPrice {
    Decimal(f64),
    Fractional { numerator: u32, denominator: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawQuote {
    pub bookmaker: String,
    pub kind: BookmakerKind,
    pub outcome: Outcome,
    pub price: RawPrice,
}

/// A validated price. Odds are always strictly greater than one.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    bookmaker: String,
    kind: BookmakerKind,
    outcome: Outcome,
    odds: Decimal,
}

impl Quote {
    pub fn new(
        bookmaker: impl Into<String>,
        kind: BookmakerKind,
        outcome: Outcome,
        odds: Decimal,
    ) -> Result<Self, InvalidOddsRecord> {
        if odds <= Decimal::ONE {
            return Err(InvalidOddsRecord::NotAboveOne(odds.to_string()));
        }
        Ok(Self {
            bookmaker: bookmaker.into(),
            kind,
            outcome,
            odds,
        })
    }

    pub fn bookmaker(&self) -> &str {
        &self.bookmaker
    }

    pub fn kind(&self) -> BookmakerKind {
        self.kind
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn odds(&self) -> Decimal {
        self.odds
    }

    /// Recomputed from the odds on every call.
    pub fn implied_probability(&self) -> Decimal {
        Decimal::ONE / self.odds
    }
}

/// All admissible quotes for the outcomes of one event.
#[derive(Debug, Clone, PartialEq)]
pub struct Market {
    event_id: String,
    outcomes: Vec<Outcome>,
    quotes: Vec<Quote>,
}

impl Market {
    /// Duplicate outcomes are collapsed, keeping the first position.
    pub fn new(event_id: impl Into<String>, outcomes: Vec<Outcome>, quotes: Vec<Quote>) -> Self {
        let mut unique: Vec<Outcome> = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            if !unique.contains(&outcome) {
                unique.push(outcome);
            }
        }
        Self {
            event_id: event_id.into(),
            outcomes: unique,
            quotes,
        }
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }
}

/// Provider metadata for one fixture together with its raw quotes.
#[derive(Debug, Clone)]
pub struct Event {
    pub id: String,
    pub sport_key: String,
    pub sport_title: String,
    pub home_team: String,
    pub away_team: String,
    pub commence_time: DateTime<Utc>,
    pub bookmaker_titles: HashMap<String, String>,
    pub raw_quotes: Vec<RawQuote>,
}

impl Event {
    pub fn bookmaker_title<'a>(&'a self, key: &'a str) -> &'a str {
        self.bookmaker_titles
            .get(key)
            .map(String::as_str)
            .unwrap_or(key)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StakeAllocation<'a> {
    pub quote: &'a Quote,
    pub stake: Decimal,
}

impl StakeAllocation<'_> {
    pub fn payout(&self) -> Decimal {
        self.stake * self.quote.odds()
    }
}

/// Outcome of a successful evaluation. Legs are in the market's outcome order.
#[derive(Debug, Clone, PartialEq)]
pub struct ArbitrageResult<'a> {
    pub legs: Vec<StakeAllocation<'a>>,
    pub implied_sum: Decimal,
    pub total_stake: Decimal,
    pub guaranteed_payout: Decimal,
    pub guaranteed_profit: Decimal,
}

impl<'a> ArbitrageResult<'a> {
    pub fn is_arbitrage(&self) -> bool {
        self.implied_sum < Decimal::ONE
    }

    pub fn best_quotes(&self) -> impl Iterator<Item = &'a Quote> + '_ {
        self.legs.iter().map(|leg| leg.quote)
    }

    pub fn stake_for(&self, outcome: &Outcome) -> Option<Decimal> {
        self.legs
            .iter()
            .find(|leg| leg.quote.outcome() == outcome)
            .map(|leg| leg.stake)
    }

    /// `1 - implied_sum`, the share of the book left over.
    pub fn margin(&self) -> Decimal {
        Decimal::ONE - self.implied_sum
    }

    pub fn roi(&self) -> Decimal {
        self.guaranteed_profit / self.total_stake
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Detection<'a> {
    Arbitrage(ArbitrageResult<'a>),
    NoArbitrage { implied_sum: Decimal },
}

impl<'a> Detection<'a> {
    pub fn opportunity(&self) -> Option<&ArbitrageResult<'a>> {
        match self {
            Detection::Arbitrage(result) => Some(result),
            Detection::NoArbitrage { .. } => None,
        }
    }
}
