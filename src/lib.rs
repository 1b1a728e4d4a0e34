pub mod arbitrage_engine;
pub mod normalization;
pub mod shared_types;
pub mod error;
pub mod config;
pub mod odds_fetcher;
pub mod report;
