use crate::shared_types::{ArbitrageResult, Event};
use rust_decimal::Decimal;
use std::fmt::Write;

const RULE_WIDTH: usize = 50;

/// Renders one opportunity for the console. Amounts are rounded to currency minor units here only.
pub fn render_opportunity(event: &Event, result: &ArbitrageResult<'_>) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Event: {} ({})", event.id, event.sport_title);
    let _ = writeln!(out, "{} vs {}", event.home_team, event.away_team);
    let _ = writeln!(out, "Kick-off: {}", event.commence_time.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(out);

    for leg in &result.legs {
        let quote = leg.quote;
        let _ = writeln!(out, " - {}", quote.outcome());
        let _ = writeln!(out, "   Bookmaker: {}", event.bookmaker_title(quote.bookmaker()));
        let _ = writeln!(out, "   Odds: {:.2}", quote.odds());
        let _ = writeln!(out, "   Stake: {:.2}", leg.stake.round_dp(2));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Total stake: {:.2}", result.total_stake.round_dp(2));
    let _ = writeln!(out, "Guaranteed payout: {:.2}", result.guaranteed_payout.round_dp(2));
    let _ = writeln!(out, "Guaranteed profit: {:.2}", result.guaranteed_profit.round_dp(2));
    let _ = writeln!(out, "Book margin: {}%", percent(result.margin()));
    let _ = writeln!(out, "ROI: {}%", percent(result.roi()));
    let _ = write!(out, "{}", rule);
    out
}

pub fn summarize(events: usize, opportunities: usize, failures: usize) -> String {
    format!(
        "Scanned {} events: {} arbitrage opportunities, {} could not be evaluated",
        events, opportunities, failures
    )
}

fn percent(ratio: Decimal) -> Decimal {
    (ratio * Decimal::ONE_HUNDRED).round_dp(2)
}
