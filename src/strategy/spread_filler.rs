//! Spread-filler strategy: polls the aggregator for a crossed/locked book
//! and takes it with a fixed-size market order, alternating sides.

use crate::config::SpreadFillerConfig;
use crate::exchange::{ExecutionClient, MarketSpec, OrderBookSource, OrderIntent, OrderSide};
use crate::strategy::runner::Bot;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Crossed-book taker bot.
pub struct SpreadFillerBot {
    client: Arc<dyn ExecutionClient>,
    book: Arc<dyn OrderBookSource>,
    market: MarketSpec,
    config: SpreadFillerConfig,
    /// Which side to take next. Flips after every attempted submission,
    /// including failed ones, so one direction is never retried back to
    /// back; no-op cycles leave it untouched.
    fill_bid_next: bool,
}

impl SpreadFillerBot {
    pub fn new(
        client: Arc<dyn ExecutionClient>,
        book: Arc<dyn OrderBookSource>,
        market: MarketSpec,
        config: SpreadFillerConfig,
    ) -> Self {
        Self {
            client,
            book,
            market,
            config,
            fill_bid_next: true,
        }
    }
}

#[async_trait]
impl Bot for SpreadFillerBot {
    fn name(&self) -> &'static str {
        "spread-filler"
    }

    fn sub_account_id(&self) -> u16 {
        self.config.sub_account_id
    }

    fn next_interval(&mut self) -> Duration {
        Duration::from_millis(self.config.check_interval_ms)
    }

    async fn run_cycle(&mut self) -> anyhow::Result<()> {
        let Some(snapshot) = self.book.snapshot(self.market.index).await else {
            debug!(bot = self.name(), market = self.market.index, "No snapshot, skipping");
            return Ok(());
        };

        let (Some(best_bid), Some(best_ask)) = (snapshot.best_bid, snapshot.best_ask) else {
            debug!(bot = self.name(), market = self.market.index, "One-sided book, skipping");
            return Ok(());
        };

        if best_bid < best_ask {
            return Ok(());
        }

        // Crossed or locked: take it, alternating sell-into-bid and
        // buy-into-ask across successive attempts.
        let (side, taken_price) = if self.fill_bid_next {
            (OrderSide::Short, best_bid)
        } else {
            (OrderSide::Long, best_ask)
        };
        self.fill_bid_next = !self.fill_bid_next;

        let intent = OrderIntent::market(
            self.market.index,
            side,
            self.config.fill_size_base,
            self.config.sub_account_id,
        );
        let tx = self.client.place_order(&intent).await?;

        info!(
            bot = self.name(),
            market = self.market.index,
            %side,
            size = %self.config.fill_size_base,
            price = %taken_price,
            %best_bid,
            %best_ask,
            %tx,
            "Crossed book taken"
        );
        Ok(())
    }
}
