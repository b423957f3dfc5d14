//! Order-book aggregator (DLOB server) client.
//!
//! Polls the aggregator's `/l2` endpoint for best bid/ask. Any transport or
//! parse failure is folded into "no snapshot" so an unreachable or flaky
//! aggregator only produces no-op cycles downstream.

use crate::exchange::traits::OrderBookSource;
use crate::exchange::types::{BookSnapshot, L2Book};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// HTTP client for a DLOB aggregator instance.
pub struct DlobClient {
    http: Client,
    base_url: String,
}

impl DlobClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    async fn fetch_l2(&self, market_index: u16) -> Result<L2Book> {
        let url = format!(
            "{}/l2?marketIndex={}&marketType=perp",
            self.base_url, market_index
        );
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to fetch L2 book")?;

        response
            .error_for_status()
            .context("Aggregator returned error status")?
            .json()
            .await
            .context("Failed to parse L2 book response")
    }
}

#[async_trait]
impl OrderBookSource for DlobClient {
    async fn snapshot(&self, market_index: u16) -> Option<BookSnapshot> {
        match self.fetch_l2(market_index).await {
            Ok(book) => Some(book.to_snapshot()),
            Err(err) => {
                debug!(market = market_index, error = %err, "No L2 snapshot available");
                None
            }
        }
    }
}
