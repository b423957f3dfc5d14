//! Mock exchange layer for paper trading and tests.
//!
//! `MockExecutionClient` journals every submission instead of hitting a
//! venue, and supports failure injection so error paths can be exercised
//! deterministically.

use crate::exchange::traits::{ExecutionClient, OrderBookSource, ReferencePriceSource};
use crate::exchange::types::{BookSnapshot, OrderIntent, QuoteLevel, SubmissionId};
use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::RwLock as AsyncRwLock;
use tracing::{debug, info};

/// A journaled single-order submission.
#[derive(Debug, Clone)]
pub struct MockOrder {
    pub id: SubmissionId,
    pub intent: OrderIntent,
    pub placed_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MockExchangeState {
    /// Every accepted single order, in submission order.
    orders: Vec<MockOrder>,
    /// Current resting ladder per (market, subaccount); replace swaps the
    /// whole entry, mirroring the gateway's atomic cancel-and-place.
    ladders: HashMap<(u16, u16), Vec<QuoteLevel>>,
    /// Subaccounts passed to cancel-all, in call order.
    cancel_calls: Vec<u16>,
}

/// In-memory execution client that simulates venue acknowledgments.
pub struct MockExecutionClient {
    state: Arc<AsyncRwLock<MockExchangeState>>,
    submission_counter: AtomicU64,
    fail_submissions: AtomicBool,
    fail_cancel_for: Mutex<HashSet<u16>>,
    closed: AtomicBool,
}

impl Default for MockExecutionClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExecutionClient {
    pub fn new() -> Self {
        Self {
            state: Arc::new(AsyncRwLock::new(MockExchangeState::default())),
            submission_counter: AtomicU64::new(1),
            fail_submissions: AtomicBool::new(false),
            fail_cancel_for: Mutex::new(HashSet::new()),
            closed: AtomicBool::new(false),
        }
    }

    fn next_id(&self) -> SubmissionId {
        let n = self.submission_counter.fetch_add(1, Ordering::SeqCst);
        SubmissionId(format!("mock-{n}"))
    }

    /// Make subsequent order/ladder submissions fail.
    pub fn set_fail_submissions(&self, fail: bool) {
        self.fail_submissions.store(fail, Ordering::SeqCst);
    }

    /// Make cancel-all fail for one subaccount.
    pub fn fail_cancels_for(&self, sub_account_id: u16) {
        self.fail_cancel_for
            .lock()
            .expect("poisoned lock")
            .insert(sub_account_id);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Snapshot of every accepted single order.
    pub async fn placed_orders(&self) -> Vec<MockOrder> {
        self.state.read().await.orders.clone()
    }

    /// Current resting ladder for (market, subaccount), if any.
    pub async fn ladder(&self, market_index: u16, sub_account_id: u16) -> Option<Vec<QuoteLevel>> {
        self.state
            .read()
            .await
            .ladders
            .get(&(market_index, sub_account_id))
            .cloned()
    }

    /// Subaccounts passed to cancel-all, in call order (failed calls
    /// included: the attempt is what matters to the shutdown sweep).
    pub async fn cancel_calls(&self) -> Vec<u16> {
        self.state.read().await.cancel_calls.clone()
    }
}

#[async_trait]
impl ExecutionClient for MockExecutionClient {
    async fn place_order(&self, intent: &OrderIntent) -> Result<SubmissionId> {
        if self.fail_submissions.load(Ordering::SeqCst) {
            bail!("injected submission failure");
        }

        let id = self.next_id();
        let order = MockOrder {
            id: id.clone(),
            intent: intent.clone(),
            placed_at: Utc::now(),
        };
        debug!(?intent, %id, "Mock order accepted");
        self.state.write().await.orders.push(order);
        Ok(id)
    }

    async fn replace_ladder(
        &self,
        market_index: u16,
        sub_account_id: u16,
        levels: &[QuoteLevel],
    ) -> Result<SubmissionId> {
        if self.fail_submissions.load(Ordering::SeqCst) {
            bail!("injected submission failure");
        }

        let id = self.next_id();
        debug!(
            market = market_index,
            sub_account = sub_account_id,
            levels = levels.len(),
            %id,
            "Mock ladder replaced"
        );
        self.state
            .write()
            .await
            .ladders
            .insert((market_index, sub_account_id), levels.to_vec());
        Ok(id)
    }

    async fn cancel_all_orders(&self, sub_account_id: u16) -> Result<()> {
        let mut state = self.state.write().await;
        state.cancel_calls.push(sub_account_id);

        if self
            .fail_cancel_for
            .lock()
            .expect("poisoned lock")
            .contains(&sub_account_id)
        {
            bail!("injected cancel failure for subaccount {sub_account_id}");
        }

        state.ladders.retain(|(_, sub), _| *sub != sub_account_id);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        info!("Mock execution client released");
        Ok(())
    }
}

/// Settable in-memory price source (latest-sample semantics).
#[derive(Default)]
pub struct StaticPriceSource {
    prices: RwLock<HashMap<u16, Decimal>>,
}

impl StaticPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(market_index: u16, price: Decimal) -> Self {
        let source = Self::new();
        source.set_price(market_index, price);
        source
    }

    pub fn set_price(&self, market_index: u16, price: Decimal) {
        self.prices
            .write()
            .expect("poisoned lock")
            .insert(market_index, price);
    }
}

impl ReferencePriceSource for StaticPriceSource {
    fn reference_price(&self, market_index: u16) -> Result<Decimal> {
        self.prices
            .read()
            .expect("poisoned lock")
            .get(&market_index)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("no reference price sample for market {market_index}"))
    }
}

/// Settable in-memory book source.
#[derive(Default)]
pub struct StaticBookSource {
    snapshot: Mutex<Option<BookSnapshot>>,
}

impl StaticBookSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_snapshot(&self, snapshot: Option<BookSnapshot>) {
        *self.snapshot.lock().expect("poisoned lock") = snapshot;
    }
}

#[async_trait]
impl OrderBookSource for StaticBookSource {
    async fn snapshot(&self, _market_index: u16) -> Option<BookSnapshot> {
        *self.snapshot.lock().expect("poisoned lock")
    }
}
