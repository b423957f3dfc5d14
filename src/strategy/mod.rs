//! Trading strategies and their shared execution lifecycle.

pub mod market_maker;
pub mod orchestrator;
pub mod random_trader;
pub mod runner;
pub mod spread_filler;

pub use market_maker::{build_ladder, MarketMakerBot};
pub use orchestrator::{BotSelection, Orchestrator};
pub use random_trader::RandomTraderBot;
pub use runner::{spawn_bot, Bot, BotHandle, BotState};
pub use spread_filler::SpreadFillerBot;
