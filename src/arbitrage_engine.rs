use super::error::ArbitrageError;
use super::shared_types::{ArbitrageResult, Detection, Market, Outcome, Quote, StakeAllocation};
use rayon::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Relative tolerance for every equality-style comparison on odds, stakes and payouts.
pub const RELATIVE_TOLERANCE: Decimal = dec!(0.000000001);

/// Relative comparison scaled by the larger magnitude. Zero only matches zero.
pub fn within_tolerance(a: Decimal, b: Decimal) -> bool {
    let scale = a.abs().max(b.abs());
    (a - b).abs() <= RELATIVE_TOLERANCE * scale
}

/// Best admissible quote per outcome, in the market's outcome order.
#[derive(Debug, Clone, PartialEq)]
pub struct BestQuotes<'a> {
    pub event_id: &'a str,
    picks: Vec<(&'a Outcome, Option<&'a Quote>)>,
}

impl<'a> BestQuotes<'a> {
    pub fn get(&self, outcome: &Outcome) -> Option<&'a Quote> {
        self.picks
            .iter()
            .find(|(o, _)| *o == outcome)
            .and_then(|(_, q)| *q)
    }

    /// Fails on the first outcome nobody quoted.
    pub fn complete(&self) -> Result<Vec<&'a Quote>, ArbitrageError> {
        self.picks
            .iter()
            .map(|(outcome, quote)| {
                quote.ok_or_else(|| ArbitrageError::IncompleteMarket {
                    event_id: self.event_id.to_string(),
                    outcome: (*outcome).clone(),
                })
            })
            .collect()
    }
}

pub fn best_quote_per_outcome(market: &Market) -> BestQuotes<'_> {
    let picks = market
        .outcomes()
        .iter()
        .map(|outcome| {
            let mut best: Option<&Quote> = None;
            for quote in market.quotes().iter().filter(|q| q.outcome() == outcome) {
                // Strict comparison keeps the first-seen quote on exact ties.
                if best.map_or(true, |b| quote.odds() > b.odds()) {
                    best = Some(quote);
                }
            }
            (outcome, best)
        })
        .collect();

    BestQuotes {
        event_id: market.event_id(),
        picks,
    }
}

pub fn implied_probability_sum(best_quotes: &BestQuotes<'_>) -> Result<Decimal, ArbitrageError> {
    let quotes = best_quotes.complete()?;
    Ok(quotes.iter().map(|q| q.implied_probability()).sum())
}

/// Splits `total_stake` so that every outcome pays out `total_stake / implied_sum`.
pub fn allocate_stakes<'a>(
    best_quotes: &[&'a Quote],
    implied_sum: Decimal,
    total_stake: Decimal,
) -> Result<Vec<StakeAllocation<'a>>, ArbitrageError> {
    validate_stake(total_stake)?;

    best_quotes
        .iter()
        .map(|&quote| {
            let stake = total_stake
                .checked_mul(quote.implied_probability())
                .and_then(|weighted| weighted.checked_div(implied_sum))
                .ok_or(ArbitrageError::StakeOverflow(total_stake))?;
            // The leg's payout must stay representable too.
            stake
                .checked_mul(quote.odds())
                .ok_or(ArbitrageError::StakeOverflow(total_stake))?;
            Ok(StakeAllocation { quote, stake })
        })
        .collect()
}

/// The stake is only validated once an arbitrage exists, so incomplete and fair books
/// report as such whatever stake is passed.
pub fn detect_arbitrage(market: &Market, total_stake: Decimal) -> Result<Detection<'_>, ArbitrageError> {
    let best_quotes = best_quote_per_outcome(market);
    let implied_sum = implied_probability_sum(&best_quotes)?;

    // A book that rounds to exactly 1 carries no margin.
    if implied_sum >= Decimal::ONE || within_tolerance(implied_sum, Decimal::ONE) {
        return Ok(Detection::NoArbitrage { implied_sum });
    }

    let quotes = best_quotes.complete()?;
    let legs = allocate_stakes(&quotes, implied_sum, total_stake)?;
    let guaranteed_payout = total_stake
        .checked_div(implied_sum)
        .ok_or(ArbitrageError::StakeOverflow(total_stake))?;

    Ok(Detection::Arbitrage(ArbitrageResult {
        legs,
        implied_sum,
        total_stake,
        guaranteed_payout,
        guaranteed_profit: guaranteed_payout - total_stake,
    }))
}

/// Evaluates independent markets in parallel. Results line up with `markets`.
pub fn evaluate_markets(
    markets: &[Market],
    total_stake: Decimal,
) -> Vec<Result<Detection<'_>, ArbitrageError>> {
    markets
        .par_iter()
        .map(|market| detect_arbitrage(market, total_stake))
        .collect()
}

fn validate_stake(total_stake: Decimal) -> Result<(), ArbitrageError> {
    if total_stake <= Decimal::ZERO {
        return Err(ArbitrageError::InvalidStake(total_stake));
    }
    Ok(())
}
