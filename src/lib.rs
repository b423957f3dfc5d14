//! # Perp Flow Bots
//!
//! Automated trading strategies for a perpetual-futures venue: a post-only
//! quote ladder, randomized organic-looking order flow, and a crossed-book
//! taker, run concurrently by an orchestrator with coordinated shutdown.
//!
//! ## Architecture
//!
//! - `config`: Configuration management and validation
//! - `exchange`: Execution gateway client, DLOB aggregator client, mocks
//! - `strategy`: The three strategies, their shared loop runner, and the
//!   orchestrator
//! - `utils`: Shared decimal arithmetic helpers

pub mod config;
pub mod exchange;
pub mod strategy;
pub mod utils;

pub use config::Config;
