use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use super::error::InvalidOddsRecord;
use super::shared_types::{BookmakerKind, Market, Outcome, RawPrice, RawQuote, Quote};

/// A raw record the normalizer refused, kept so the caller can log it.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub bookmaker: String,
    pub outcome: Outcome,
    pub reason: InvalidOddsRecord,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub quotes: Vec<Quote>,
    pub skipped: Vec<SkippedRecord>,
    pub excluded: usize,
}

/// Validates raw records and drops exchange quotes. Input order is preserved.
pub fn normalize(raw_quotes: &[RawQuote]) -> Normalized {
    normalize_with(raw_quotes, |_| false)
}

/// Like [`normalize`], additionally dropping every record `exclude` matches.
pub fn normalize_with<F>(raw_quotes: &[RawQuote], exclude: F) -> Normalized
where
    F: Fn(&RawQuote) -> bool,
{
    let mut normalized = Normalized::default();

    for raw in raw_quotes {
        if raw.kind == BookmakerKind::Exchange || exclude(raw) {
            normalized.excluded += 1;
            continue;
        }

        let quote = decimal_odds(raw.price).and_then(|odds| {
            Quote::new(raw.bookmaker.clone(), raw.kind, raw.outcome.clone(), odds)
        });

        match quote {
            Ok(q) => normalized.quotes.push(q),
            Err(reason) => normalized.skipped.push(SkippedRecord {
                bookmaker: raw.bookmaker.clone(),
                outcome: raw.outcome.clone(),
                reason,
            }),
        }
    }

    normalized
}

/// Builds a market for one event. Every outcome named by any raw record belongs to the
/// outcome set, even when all of its records end up excluded or skipped.
pub fn build_market<F>(event_id: &str, raw_quotes: &[RawQuote], exclude: F) -> (Market, Normalized)
where
    F: Fn(&RawQuote) -> bool,
{
    let outcomes: Vec<Outcome> = raw_quotes.iter().map(|r| r.outcome.clone()).collect();
    let normalized = normalize_with(raw_quotes, exclude);
    let market = Market::new(event_id, outcomes, normalized.quotes.clone());
    (market, normalized)
}

fn decimal_odds(price: RawPrice) -> Result<Decimal, InvalidOddsRecord> {
    match price {
        RawPrice::Decimal(value) => {
            if !value.is_finite() {
                return Err(InvalidOddsRecord::NonFinite);
            }
            Decimal::from_f64(value).ok_or_else(|| InvalidOddsRecord::OutOfRange(value.to_string()))
        }
        RawPrice::Fractional {
            numerator,
            denominator,
        } => {
            if denominator == 0 {
                return Err(InvalidOddsRecord::ZeroDenominator { numerator });
            }
            Ok(Decimal::ONE + Decimal::from(numerator) / Decimal::from(denominator))
        }
    }
}
