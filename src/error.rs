use rust_decimal::Decimal;
use thiserror::Error;

use crate::shared_types::Outcome;

/// Why a single raw record was dropped by the normalizer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidOddsRecord {
    #[error("odds value is not a finite number")]
    NonFinite,

    #[error("odds {0} are outside the representable range")]
    OutOfRange(String),

    #[error("odds {0} must be greater than 1.0")]
    NotAboveOne(String),

    #[error("fractional odds {numerator}/0 have a zero denominator")]
    ZeroDenominator { numerator: u32 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArbitrageError {
    #[error("market {event_id} has no admissible quote for outcome {outcome}")]
    IncompleteMarket { event_id: String, outcome: Outcome },

    #[error("total stake must be positive, got {0}")]
    InvalidStake(Decimal),

    #[error("total stake {0} is too large to allocate")]
    StakeOverflow(Decimal),
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid provider URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("provider returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}
