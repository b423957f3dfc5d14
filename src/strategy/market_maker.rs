//! Market-maker strategy: a symmetric post-only quote ladder around the
//! reference price, atomically replaced every refresh interval.

use crate::config::MarketMakerConfig;
use crate::exchange::{
    ExecutionClient, MarketSpec, OrderSide, QuoteLevel, ReferencePriceSource,
};
use crate::strategy::runner::Bot;
use crate::utils::decimal::{from_basis_points, round_to_step, round_to_tick};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Build the full quote ladder for one reference price.
///
/// Level `i` (1-based) quotes at `p * (1 -/+ spread * i)` for bid/ask, so
/// the ladder widens linearly away from the reference. Deterministic for a
/// given price and config. Prices land on the market's tick, sizes on its
/// step.
pub fn build_ladder(
    reference_price: Decimal,
    market: &MarketSpec,
    config: &MarketMakerConfig,
) -> Vec<QuoteLevel> {
    let spread = from_basis_points(Decimal::from(config.spread_bps));
    let size = round_to_step(config.order_size_base, market.step_size);

    let mut levels = Vec::with_capacity(2 * config.num_levels as usize);
    for level in 1..=config.num_levels {
        let offset = spread * Decimal::from(level);

        levels.push(QuoteLevel {
            side: OrderSide::Long,
            level,
            price: round_to_tick(reference_price * (Decimal::ONE - offset), market.tick_size),
            size,
        });
        levels.push(QuoteLevel {
            side: OrderSide::Short,
            level,
            price: round_to_tick(reference_price * (Decimal::ONE + offset), market.tick_size),
            size,
        });
    }
    levels
}

/// Quote-ladder bot. Owns its config and subaccount; shares the execution
/// client with the other strategies.
pub struct MarketMakerBot {
    client: Arc<dyn ExecutionClient>,
    prices: Arc<dyn ReferencePriceSource>,
    market: MarketSpec,
    config: MarketMakerConfig,
}

impl MarketMakerBot {
    pub fn new(
        client: Arc<dyn ExecutionClient>,
        prices: Arc<dyn ReferencePriceSource>,
        market: MarketSpec,
        config: MarketMakerConfig,
    ) -> Self {
        Self {
            client,
            prices,
            market,
            config,
        }
    }
}

#[async_trait]
impl Bot for MarketMakerBot {
    fn name(&self) -> &'static str {
        "market-maker"
    }

    fn sub_account_id(&self) -> u16 {
        self.config.sub_account_id
    }

    fn next_interval(&mut self) -> Duration {
        Duration::from_millis(self.config.refresh_interval_ms)
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

        let levels = build_ladder(price, &self.market, &self.config);
        let tx = self
            .client
            .replace_ladder(self.market.index, self.config.sub_account_id, &levels)
            .await?;

        info!(
            bot = self.name(),
            market = self.market.index,
            levels = self.config.num_levels,
            %price,
            %tx,
            "Ladder replaced"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::{MockExecutionClient, StaticPriceSource};
    use rust_decimal_macros::dec;

    fn config(spread_bps: u32, num_levels: u32) -> MarketMakerConfig {
        MarketMakerConfig {
            spread_bps,
            num_levels,
            ..MarketMakerConfig::default()
        }
    }

    #[test]
    fn test_ladder_shape_scenario() {
        // p=100, 50 bps, 2 levels
        let levels = build_ladder(dec!(100), &MarketSpec::default(), &config(50, 2));
        assert_eq!(levels.len(), 4);

        let bids: Vec<_> = levels
            .iter()
            .filter(|l| l.side == OrderSide::Long)
            .collect();
        let asks: Vec<_> = levels
            .iter()
            .filter(|l| l.side == OrderSide::Short)
            .collect();

        assert_eq!(bids[0].price, dec!(99.50));
        assert_eq!(bids[1].price, dec!(99.00));
        assert_eq!(asks[0].price, dec!(100.50));
        assert_eq!(asks[1].price, dec!(101.00));
        assert!(levels.iter().all(|l| l.size == dec!(1)));
    }

    #[test]
    fn test_ladder_monotonic_and_straddles_reference() {
        let p = dec!(137.4219);
        let levels = build_ladder(p, &MarketSpec::default(), &config(25, 5));
        assert_eq!(levels.len(), 10);

        let bids: Vec<_> = levels
            .iter()
            .filter(|l| l.side == OrderSide::Long)
            .collect();
        let asks: Vec<_> = levels
            .iter()
            .filter(|l| l.side == OrderSide::Short)
            .collect();

        for (bid, ask) in bids.iter().zip(asks.iter()) {
            assert!(bid.price < p, "bid {} not below reference", bid.price);
            assert!(ask.price > p, "ask {} not above reference", ask.price);
        }
        for pair in bids.windows(2) {
            assert!(pair[0].price > pair[1].price, "bids must strictly decrease");
        }
        for pair in asks.windows(2) {
            assert!(pair[0].price < pair[1].price, "asks must strictly increase");
        }
    }

    #[test]
    fn test_ladder_is_deterministic() {
        let spec = MarketSpec::default();
        let cfg = config(50, 3);
        assert_eq!(
            build_ladder(dec!(23.17), &spec, &cfg),
            build_ladder(dec!(23.17), &spec, &cfg)
        );
    }

    #[test]
    fn test_ladder_prices_rounded_to_tick() {
        let spec = MarketSpec {
            index: 0,
            tick_size: dec!(0.01),
            step_size: dec!(0.01),
        };
        let levels = build_ladder(dec!(99.999), &spec, &config(37, 3));
        for level in &levels {
            assert_eq!(level.price % spec.tick_size, Decimal::ZERO);
        }
    }

    #[tokio::test]
    async fn test_cycle_replaces_resting_ladder() {
        let client = Arc::new(MockExecutionClient::new());
        let prices = Arc::new(StaticPriceSource::with_price(0, dec!(100)));
        let mut bot = MarketMakerBot::new(
            client.clone(),
            prices.clone(),
            MarketSpec::default(),
            config(50, 2),
        );

        bot.run_cycle().await.unwrap();
        let resting = client.ladder(0, 0).await.expect("ladder placed");
        assert_eq!(resting.len(), 4);

        // A new price fully replaces the old ladder.
        prices.set_price(0, dec!(200));
        bot.run_cycle().await.unwrap();
        let resting = client.ladder(0, 0).await.expect("ladder placed");
        assert_eq!(resting.len(), 4);
        assert!(resting.iter().any(|l| l.price == dec!(199.00)));
    }

    #[tokio::test]
    async fn test_invalid_reference_price_skips_cycle() {
        let client = Arc::new(MockExecutionClient::new());
        let prices = Arc::new(StaticPriceSource::with_price(0, dec!(0)));
        let mut bot = MarketMakerBot::new(
            client.clone(),
            prices,
            MarketSpec::default(),
            config(50, 3),
        );

        bot.run_cycle().await.unwrap();
        assert!(client.ladder(0, 0).await.is_none());
    }

    #[tokio::test]
    async fn test_submission_failure_propagates_to_runner() {
        let client = Arc::new(MockExecutionClient::new());
        client.set_fail_submissions(true);
        let prices = Arc::new(StaticPriceSource::with_price(0, dec!(100)));
        let mut bot =
            MarketMakerBot::new(client, prices, MarketSpec::default(), config(50, 3));

        assert!(bot.run_cycle().await.is_err());
    }
}
