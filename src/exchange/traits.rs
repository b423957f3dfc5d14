//! Seams between the strategies and the venue.
//!
//! Strategies only ever talk to the exchange layer through these traits,
//! so the live gateway can be swapped for the mock client (paper trading,
//! tests) or the HTTP aggregator for a push-based feed without touching
//! any decision logic.

use crate::exchange::types::{BookSnapshot, OrderIntent, QuoteLevel, SubmissionId};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Supplies the current reference (oracle/mid) price for a market.
///
/// Lookups are synchronous against the most recent subscribed sample;
/// implementations must not hit the network on this path.
pub trait ReferencePriceSource: Send + Sync {
    fn reference_price(&self, market_index: u16) -> anyhow::Result<Decimal>;
}

/// Supplies best bid/ask for a market on demand.
///
/// A fetch or parse failure resolves to `None` ("no snapshot"), never an
/// error; callers treat that as a no-op cycle.
#[async_trait]
pub trait OrderBookSource: Send + Sync {
    async fn snapshot(&self, market_index: u16) -> Option<BookSnapshot>;
}

/// Submits and cancels orders, scoped per subaccount.
///
/// Shared as `Arc<dyn ExecutionClient>` across all strategy tasks, which
/// may call it concurrently; each strategy only touches its own
/// subaccount's resting orders.
#[async_trait]
pub trait ExecutionClient: Send + Sync {
    /// Submit a single order. Strategies never see fill results beyond
    /// this acknowledgment.
    async fn place_order(&self, intent: &OrderIntent) -> anyhow::Result<SubmissionId>;

    /// Atomically cancel every resting order for (market, subaccount)
    /// and place the given ladder as one logical operation.
    async fn replace_ladder(
        &self,
        market_index: u16,
        sub_account_id: u16,
        levels: &[QuoteLevel],
    ) -> anyhow::Result<SubmissionId>;

    /// Best-effort cancel of every resting order on a subaccount.
    async fn cancel_all_orders(&self, sub_account_id: u16) -> anyhow::Result<()>;

    /// Release the underlying session/connection.
    async fn close(&self) -> anyhow::Result<()>;
}
