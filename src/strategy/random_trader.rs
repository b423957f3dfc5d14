//! Random-trader strategy: one independently randomized order per cycle,
//! on a randomized interval, to generate organic-looking flow.

use crate::config::RandomTraderConfig;
use crate::exchange::{
    ExecutionClient, MarketSpec, OrderIntent, OrderSide, ReferencePriceSource,
};
use crate::strategy::runner::Bot;
use crate::utils::decimal::{round_to_step, round_to_tick};
use anyhow::Context;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Sizes are quantized to the nearest 0.01 base unit regardless of the
/// market's step, matching the venue's display precision.
const SIZE_QUANTUM: Decimal = dec!(0.01);

/// Limit prices are drawn within +/-2% of the reference price.
const LIMIT_OFFSET_RANGE: f64 = 0.02;

/// Randomized flow bot, generic over its random source so tests can seed
/// a deterministic generator.
pub struct RandomTraderBot<R: Rng> {
    client: Arc<dyn ExecutionClient>,
    prices: Arc<dyn ReferencePriceSource>,
    market: MarketSpec,
    config: RandomTraderConfig,
    rng: R,
}

impl RandomTraderBot<StdRng> {
    /// Production constructor with an OS-seeded generator.
    pub fn from_entropy(
        client: Arc<dyn ExecutionClient>,
        prices: Arc<dyn ReferencePriceSource>,
        market: MarketSpec,
        config: RandomTraderConfig,
    ) -> Self {
        Self::new(client, prices, market, config, StdRng::from_entropy())
    }
}

impl<R: Rng> RandomTraderBot<R> {
    pub fn new(
        client: Arc<dyn ExecutionClient>,
        prices: Arc<dyn ReferencePriceSource>,
        market: MarketSpec,
        config: RandomTraderConfig,
        rng: R,
    ) -> Self {
        Self {
            client,
            prices,
            market,
            config,
            rng,
        }
    }

    fn draw_size(&mut self) -> anyhow::Result<Decimal> {
        let min = self.config.min_size_base.to_f64().unwrap_or(0.0);
        let max = self.config.max_size_base.to_f64().unwrap_or(min);
        let raw = self.rng.gen_range(min..=max);
        let size = Decimal::try_from(raw).context("non-finite size draw")?;
        Ok(round_to_step(size, SIZE_QUANTUM).clamp(self.config.min_size_base, self.config.max_size_base))
    }
}

#[async_trait]
impl<R: Rng + Send> Bot for RandomTraderBot<R> {
    fn name(&self) -> &'static str {
        "random-trader"
    }

    fn sub_account_id(&self) -> u16 {
        self.config.sub_account_id
    }

    /// Re-drawn after every cycle, uniform over the configured bounds.
    fn next_interval(&mut self) -> Duration {
        let ms = self
            .rng
            .gen_range(self.config.min_interval_ms..=self.config.max_interval_ms);
        Duration::from_millis(ms)
    }

    async fn run_cycle(&mut self) -> anyhow::Result<()> {
        let price = self.prices.reference_price(self.market.index)?;
        if price <= Decimal::ZERO {
            warn!(
                bot = self.name(),
                market = self.market.index,
                %price,
                "Invalid reference price, skipping cycle"
            );
            return Ok(());
        }

        let side = if self.rng.gen_bool(0.5) {
            OrderSide::Long
        } else {
            OrderSide::Short
        };
        let size = self.draw_size()?;

        let limit_pct = self
            .config
            .limit_order_pct
            .to_f64()
            .unwrap_or(0.0)
            .clamp(0.0, 1.0);

        let intent = if self.rng.gen_bool(limit_pct) {
            let offset = self.rng.gen_range(-LIMIT_OFFSET_RANGE..=LIMIT_OFFSET_RANGE);
            let factor = Decimal::ONE + Decimal::try_from(offset).context("non-finite offset draw")?;
            let limit_price = round_to_tick(price * factor, self.market.tick_size);
            OrderIntent::limit(
                self.market.index,
                side,
                size,
                limit_price,
                self.config.sub_account_id,
            )
        } else {
            OrderIntent::market(self.market.index, side, size, self.config.sub_account_id)
        };

        let tx = self.client.place_order(&intent).await?;
        info!(
            bot = self.name(),
            market = self.market.index,
            %side,
            order_type = ?intent.order_type,
            %size,
            price = %intent.price.unwrap_or(price),
            %tx,
            "Order placed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::{MockExecutionClient, OrderType, StaticPriceSource};

    fn seeded_bot(
        client: Arc<MockExecutionClient>,
        price: Decimal,
        seed: u64,
    ) -> RandomTraderBot<StdRng> {
        RandomTraderBot::new(
            client,
            Arc::new(StaticPriceSource::with_price(0, price)),
            MarketSpec::default(),
            RandomTraderConfig::default(),
            StdRng::seed_from_u64(seed),
        )
    }

    #[tokio::test]
    async fn test_one_order_per_cycle_within_bounds() {
        let client = Arc::new(MockExecutionClient::new());
        let mut bot = seeded_bot(client.clone(), dec!(100), 7);

        for _ in 0..200 {
            bot.run_cycle().await.unwrap();
        }

        let orders = client.placed_orders().await;
        assert_eq!(orders.len(), 200);

        let cfg = RandomTraderConfig::default();
        for order in &orders {
            let size = order.intent.size;
            assert!(size >= cfg.min_size_base && size <= cfg.max_size_base);
            assert_eq!(size % dec!(0.01), Decimal::ZERO, "size {size} not a 0.01 multiple");
            assert!(!order.intent.post_only, "random flow must be taker-eligible");

            match order.intent.order_type {
                OrderType::Limit => {
                    let p = order.intent.price.expect("limit order has price");
                    // +/-2% of reference, with tick-rounding slack.
                    assert!(p >= dec!(97.99) && p <= dec!(102.01), "limit price {p} out of band");
                }
                OrderType::Market => assert_eq!(order.intent.price, None),
            }
        }
    }

    #[tokio::test]
    async fn test_direction_roughly_uniform() {
        let client = Arc::new(MockExecutionClient::new());
        let mut bot = seeded_bot(client.clone(), dec!(100), 42);

        for _ in 0..400 {
            bot.run_cycle().await.unwrap();
        }

        let orders = client.placed_orders().await;
        let longs = orders
            .iter()
            .filter(|o| o.intent.side == OrderSide::Long)
            .count();
        let shorts = orders.len() - longs;
        assert!(longs > 120 && shorts > 120, "longs={longs} shorts={shorts}");
    }

    #[tokio::test]
    async fn test_invalid_reference_price_skips_submission() {
        let client = Arc::new(MockExecutionClient::new());
        let mut bot = seeded_bot(client.clone(), dec!(0), 1);

        bot.run_cycle().await.unwrap();
        assert!(client.placed_orders().await.is_empty());
    }

    #[tokio::test]
    async fn test_interval_redrawn_within_bounds() {
        let client = Arc::new(MockExecutionClient::new());
        let mut bot = seeded_bot(client, dec!(100), 3);

        let cfg = RandomTraderConfig::default();
        let mut intervals = Vec::new();
        for _ in 0..50 {
            let interval = bot.next_interval();
            assert!(interval >= Duration::from_millis(cfg.min_interval_ms));
            assert!(interval <= Duration::from_millis(cfg.max_interval_ms));
            intervals.push(interval);
        }
        // Re-drawn, not fixed.
        assert!(intervals.iter().any(|d| *d != intervals[0]));
    }

    #[tokio::test]
    async fn test_seeded_runs_are_reproducible() {
        let client_a = Arc::new(MockExecutionClient::new());
        let client_b = Arc::new(MockExecutionClient::new());
        let mut bot_a = seeded_bot(client_a.clone(), dec!(100), 11);
        let mut bot_b = seeded_bot(client_b.clone(), dec!(100), 11);

        for _ in 0..20 {
            bot_a.run_cycle().await.unwrap();
            bot_b.run_cycle().await.unwrap();
        }

        let orders_a: Vec<_> = client_a.placed_orders().await.into_iter().map(|o| o.intent).collect();
        let orders_b: Vec<_> = client_b.placed_orders().await.into_iter().map(|o| o.intent).collect();
        assert_eq!(orders_a, orders_b);
    }
}
