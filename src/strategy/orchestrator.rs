//! Strategy orchestrator: builds the selected bots, runs their loops
//! concurrently, and drives coordinated shutdown.

use crate::config::Config;
use crate::exchange::{ExecutionClient, MarketSpec, OrderBookSource, ReferencePriceSource};
use crate::strategy::market_maker::MarketMakerBot;
use crate::strategy::random_trader::RandomTraderBot;
use crate::strategy::runner::{spawn_bot, Bot, BotHandle};
use crate::strategy::spread_filler::SpreadFillerBot;
use clap::ValueEnum;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Cap on each subaccount's cancel-all during shutdown; a hung venue call
/// must not stall process exit.
const CANCEL_SWEEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Which strategy (or all of them) to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BotSelection {
    MarketMaker,
    RandomTrader,
    SpreadFiller,
    All,
}

impl BotSelection {
    fn includes(&self, other: BotSelection) -> bool {
        *self == BotSelection::All || *self == other
    }
}

impl fmt::Display for BotSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotSelection::MarketMaker => write!(f, "market-maker"),
            BotSelection::RandomTrader => write!(f, "random-trader"),
            BotSelection::SpreadFiller => write!(f, "spread-filler"),
            BotSelection::All => write!(f, "all"),
        }
    }
}

/// Owns the set of running strategy instances. The sole authority for
/// transitioning them to Stopping/Stopped.
pub struct Orchestrator {
    client: Arc<dyn ExecutionClient>,
    handles: Vec<BotHandle>,
    tasks: Vec<JoinHandle<()>>,
}

impl Orchestrator {
    /// Construct one instance per selected strategy, each on its own
    /// configured subaccount, and start every loop.
    pub fn start(
        selection: BotSelection,
        client: Arc<dyn ExecutionClient>,
        prices: Arc<dyn ReferencePriceSource>,
        book: Arc<dyn OrderBookSource>,
        market: MarketSpec,
        config: &Config,
    ) -> Self {
        let mut bots: Vec<Box<dyn Bot>> = Vec::new();

        if selection.includes(BotSelection::MarketMaker) {
            bots.push(Box::new(MarketMakerBot::new(
                client.clone(),
                prices.clone(),
                market.clone(),
                config.market_maker.clone(),
            )));
        }
        if selection.includes(BotSelection::RandomTrader) {
            bots.push(Box::new(RandomTraderBot::from_entropy(
                client.clone(),
                prices.clone(),
                market.clone(),
                config.random_trader.clone(),
            )));
        }
        if selection.includes(BotSelection::SpreadFiller) {
            bots.push(Box::new(SpreadFillerBot::new(
                client.clone(),
                book,
                market,
                config.spread_filler.clone(),
            )));
        }

        let mut handles = Vec::with_capacity(bots.len());
        let mut tasks = Vec::with_capacity(bots.len());
        for bot in bots {
            let (handle, task) = spawn_bot(bot);
            handles.push(handle);
            tasks.push(task);
        }

        Self {
            client,
            handles,
            tasks,
        }
    }

    pub fn handles(&self) -> &[BotHandle] {
        &self.handles
    }

    /// Coordinated teardown: flip every loop to Stopping, sweep resting
    /// orders per distinct subaccount, release the client.
    ///
    /// The sweep does not wait for in-flight cycles; a loop already past
    /// its state check may re-place orders after its subaccount's cancel.
    /// That race is accepted — the loop stops within one cycle and never
    /// quotes again.
    pub async fn shutdown(self) {
        for handle in &self.handles {
            handle.stop();
        }

        let mut sub_accounts: Vec<u16> = self.handles.iter().map(|h| h.sub_account_id()).collect();
        sub_accounts.sort_unstable();
        sub_accounts.dedup();

        for sub_account in sub_accounts {
            match tokio::time::timeout(
                CANCEL_SWEEP_TIMEOUT,
                self.client.cancel_all_orders(sub_account),
            )
            .await
            {
                Ok(Ok(())) => info!(sub_account, "Resting orders cancelled"),
                Ok(Err(err)) => error!(
                    sub_account,
                    error = format!("{err:#}"),
                    "Cancel-all failed"
                ),
                Err(_) => error!(sub_account, "Cancel-all timed out"),
            }
        }

        if let Err(err) = self.client.close().await {
            error!(error = format!("{err:#}"), "Client teardown failed");
        }

        // Loop tasks are detached; they observe Stopping within one cycle
        // and the process exits right after this returns.
        drop(self.tasks);
        info!("Orchestrator shutdown complete");
    }
}
