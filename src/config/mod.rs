//! Configuration management for the flow bots.
//!
//! Loads settings from environment variables (prefix `PFB`, separator `__`)
//! layered over an optional `config` file, with documented defaults for
//! every strategy parameter.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Execution gateway and aggregator endpoints
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Market tick/step increments and paper-mode reference price
    #[serde(default)]
    pub market: MarketConfig,
    /// Quote ladder parameters
    #[serde(default)]
    pub market_maker: MarketMakerConfig,
    /// Randomized flow parameters
    #[serde(default)]
    pub random_trader: RandomTraderConfig,
    /// Crossed-book taker parameters
    #[serde(default)]
    pub spread_filler: SpreadFillerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Execution gateway base URL
    #[serde(default = "default_gateway_url")]
    pub base_url: String,
    /// DLOB aggregator base URL
    #[serde(default = "default_dlob_url")]
    pub dlob_url: String,
    /// Paper trading: journal orders in-memory instead of submitting
    #[serde(default = "default_paper")]
    pub paper: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Minimum price increment
    #[serde(default = "default_tick_size")]
    pub tick_size: Decimal,
    /// Minimum size increment
    #[serde(default = "default_step_size")]
    pub step_size: Decimal,
    /// Reference price seed used when no oracle feed is wired (paper mode)
    #[serde(default = "default_reference_price")]
    pub reference_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketMakerConfig {
    /// Half-spread per level in basis points (50 = 0.5%)
    #[serde(default = "default_spread_bps")]
    pub spread_bps: u32,
    /// Number of bid/ask level pairs to quote
    #[serde(default = "default_num_levels")]
    pub num_levels: u32,
    /// Size per level in base units
    #[serde(default = "default_order_size_base")]
    pub order_size_base: Decimal,
    /// Ladder refresh interval
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    /// Subaccount the ladder rests on
    #[serde(default = "default_mm_sub_account")]
    pub sub_account_id: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomTraderConfig {
    /// Lower bound of the re-drawn inter-cycle interval
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
    /// Upper bound of the re-drawn inter-cycle interval
    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,
    /// Minimum order size in base units
    #[serde(default = "default_min_size_base")]
    pub min_size_base: Decimal,
    /// Maximum order size in base units
    #[serde(default = "default_max_size_base")]
    pub max_size_base: Decimal,
    /// Probability of a limit order vs a market order (0.0-1.0)
    #[serde(default = "default_limit_order_pct")]
    pub limit_order_pct: Decimal,
    #[serde(default = "default_rt_sub_account")]
    pub sub_account_id: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadFillerConfig {
    /// Crossed-book polling interval
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,
    /// Taker fill size in base units
    #[serde(default = "default_fill_size_base")]
    pub fill_size_base: Decimal,
    #[serde(default = "default_sf_sub_account")]
    pub sub_account_id: u16,
}

// Default value functions
fn default_gateway_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_dlob_url() -> String {
    "http://localhost:6969".to_string()
}

fn default_paper() -> bool {
    true
}

fn default_tick_size() -> Decimal {
    Decimal::new(1, 4) // 0.0001
}

fn default_step_size() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

fn default_reference_price() -> Decimal {
    Decimal::new(100, 0)
}

fn default_spread_bps() -> u32 {
    50 // 0.5% per level
}

fn default_num_levels() -> u32 {
    3
}

fn default_order_size_base() -> Decimal {
    Decimal::ONE
}

fn default_refresh_interval_ms() -> u64 {
    10_000
}

fn default_mm_sub_account() -> u16 {
    0
}

fn default_min_interval_ms() -> u64 {
    15_000
}

fn default_max_interval_ms() -> u64 {
    60_000
}

fn default_min_size_base() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

fn default_max_size_base() -> Decimal {
    Decimal::new(5, 0)
}

fn default_limit_order_pct() -> Decimal {
    Decimal::new(5, 1) // 0.5
}

fn default_rt_sub_account() -> u16 {
    1
}

fn default_check_interval_ms() -> u64 {
    5_000
}

fn default_fill_size_base() -> Decimal {
    Decimal::new(1, 1) // 0.1
}

fn default_sf_sub_account() -> u16 {
    2
}

impl Config {
    /// Load configuration from environment variables and config files.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::default().separator("__").prefix("PFB"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.market.tick_size > Decimal::ZERO && self.market.step_size > Decimal::ZERO,
            "tick_size and step_size must be positive"
        );

        anyhow::ensure!(self.market_maker.spread_bps > 0, "spread_bps must be > 0");
        anyhow::ensure!(self.market_maker.num_levels >= 1, "num_levels must be >= 1");
        anyhow::ensure!(
            self.market_maker.order_size_base > Decimal::ZERO,
            "order_size_base must be positive"
        );

        anyhow::ensure!(
            self.random_trader.min_interval_ms <= self.random_trader.max_interval_ms,
            "min_interval_ms must be <= max_interval_ms"
        );
        anyhow::ensure!(
            Decimal::ZERO < self.random_trader.min_size_base
                && self.random_trader.min_size_base <= self.random_trader.max_size_base,
            "size bounds must satisfy 0 < min_size_base <= max_size_base"
        );
        anyhow::ensure!(
            self.random_trader.limit_order_pct >= Decimal::ZERO
                && self.random_trader.limit_order_pct <= Decimal::ONE,
            "limit_order_pct must be between 0 and 1"
        );

        anyhow::ensure!(
            self.spread_filler.fill_size_base > Decimal::ZERO,
            "fill_size_base must be positive"
        );

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            market: MarketConfig::default(),
            market_maker: MarketMakerConfig::default(),
            random_trader: RandomTraderConfig::default(),
            spread_filler: SpreadFillerConfig::default(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_gateway_url(),
            dlob_url: default_dlob_url(),
            paper: default_paper(),
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            tick_size: default_tick_size(),
            step_size: default_step_size(),
            reference_price: default_reference_price(),
        }
    }
}

impl Default for MarketMakerConfig {
    fn default() -> Self {
        Self {
            spread_bps: default_spread_bps(),
            num_levels: default_num_levels(),
            order_size_base: default_order_size_base(),
            refresh_interval_ms: default_refresh_interval_ms(),
            sub_account_id: default_mm_sub_account(),
        }
    }
}

impl Default for RandomTraderConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
            max_interval_ms: default_max_interval_ms(),
            min_size_base: default_min_size_base(),
            max_size_base: default_max_size_base(),
            limit_order_pct: default_limit_order_pct(),
            sub_account_id: default_rt_sub_account(),
        }
    }
}

impl Default for SpreadFillerConfig {
    fn default() -> Self {
        Self {
            check_interval_ms: default_check_interval_ms(),
            fill_size_base: default_fill_size_base(),
            sub_account_id: default_sf_sub_account(),
        }
    }
}
