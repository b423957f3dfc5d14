//! Perp Flow Bots - Main Entry Point
//!
//! Parses the strategy selection, wires the exchange layer (paper or live
//! gateway), starts the orchestrator and waits for a shutdown signal.

use anyhow::Result;
use clap::Parser;
use perp_flow_bots::config::Config;
use perp_flow_bots::exchange::{
    DlobClient, ExecutionClient, GatewayClient, MarketSpec, MockExecutionClient, OrderBookSource,
    StaticPriceSource,
};
use perp_flow_bots::strategy::{BotSelection, Orchestrator};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Perp Flow Bots CLI
#[derive(Parser)]
#[command(name = "perp-flow-bots")]
#[command(version, about = "Quote-ladder, random-flow and spread-filler bots")]
struct Cli {
    /// Which bot(s) to run
    #[arg(long, value_enum, default_value_t = BotSelection::MarketMaker)]
    bot: BotSelection,

    /// Perp market index (0=SOL, 1=BTC, 2=ETH)
    #[arg(long, default_value_t = 0)]
    market: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging()?;

    info!(
        "Perp Flow Bots v{} | bot={} market={}",
        env!("CARGO_PKG_VERSION"),
        cli.bot,
        cli.market
    );

    // Startup failures are the only fatal ones: anything below this block
    // that goes wrong is handled per cycle by the strategy loops.
    let config = Config::load()?;
    config.validate()?;
    log_config(&config);

    let market = MarketSpec {
        index: cli.market,
        tick_size: config.market.tick_size,
        step_size: config.market.step_size,
    };

    let client: Arc<dyn ExecutionClient> = if config.gateway.paper {
        info!("Paper trading mode - orders journaled in-memory");
        Arc::new(MockExecutionClient::new())
    } else {
        warn!("LIVE mode - submitting to gateway at {}", config.gateway.base_url);
        Arc::new(GatewayClient::new(&config.gateway)?)
    };

    // Latest-sample price source, seeded from config. A live deployment
    // replaces this with its oracle subscription via the library API.
    let prices = Arc::new(StaticPriceSource::with_price(
        market.index,
        config.market.reference_price,
    ));
    let book: Arc<dyn OrderBookSource> = Arc::new(DlobClient::new(config.gateway.dlob_url.clone())?);

    let orchestrator = Orchestrator::start(cli.bot, client, prices, book, market, &config);
    info!("{} strategy loop(s) running", orchestrator.handles().len());

    wait_for_shutdown_signal().await;
    info!("Shutdown signal received");

    orchestrator.shutdown().await;
    info!("Perp Flow Bots shutdown complete");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM.
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(err) => {
                warn!(error = %err, "SIGTERM handler unavailable, falling back to ctrl-c");
                tokio::signal::ctrl_c().await.ok();
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = terminate.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.ok();
    }
}

/// Initialize logging with file output.
fn init_logging() -> Result<()> {
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    std::fs::create_dir_all("logs")?;

    let file_appender = tracing_appender::rolling::hourly("logs", "perp-flow-bots.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);

    // Leak the guard to keep it alive for the program duration
    Box::leak(Box::new(_guard));

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("perp_flow_bots=debug".parse()?)
                .add_directive(Level::INFO.into()),
        )
        .with_writer(std::io::stdout.and(file_writer))
        .with_target(true)
        .with_ansi(true)
        .init();

    Ok(())
}

/// Log configuration on startup.
fn log_config(config: &Config) {
    info!("Configuration:");
    info!(
        "   market-maker: spread={}bps levels={} size={} refresh={}ms sub={}",
        config.market_maker.spread_bps,
        config.market_maker.num_levels,
        config.market_maker.order_size_base,
        config.market_maker.refresh_interval_ms,
        config.market_maker.sub_account_id,
    );
    info!(
        "   random-trader: interval={}-{}ms size={}-{} limitPct={} sub={}",
        config.random_trader.min_interval_ms,
        config.random_trader.max_interval_ms,
        config.random_trader.min_size_base,
        config.random_trader.max_size_base,
        config.random_trader.limit_order_pct,
        config.random_trader.sub_account_id,
    );
    info!(
        "   spread-filler: interval={}ms fillSize={} sub={}",
        config.spread_filler.check_interval_ms,
        config.spread_filler.fill_size_base,
        config.spread_filler.sub_account_id,
    );
    info!(
        "   gateway: {} | dlob: {} | paper: {}",
        config.gateway.base_url, config.gateway.dlob_url, config.gateway.paper
    );
}
