//! Venue integrations.
//!
//! ## Gateway
//! REST execution client for a drift-gateway-style HTTP service that owns
//! sessions, signing and transaction construction.
//!
//! ## DLOB aggregator
//! Read-only L2 order book snapshots for crossed-book detection.
//!
//! ## Mock
//! In-memory execution client and data sources for paper trading and tests.

mod dlob;
mod gateway;
pub mod mock;
mod traits;
mod types;

pub use dlob::DlobClient;
pub use gateway::{GatewayClient, GatewayError};
pub use mock::{MockExecutionClient, StaticBookSource, StaticPriceSource};
pub use traits::{ExecutionClient, OrderBookSource, ReferencePriceSource};
pub use types::*;
