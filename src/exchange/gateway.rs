//! Execution gateway REST client.
//!
//! Talks to a drift-gateway-style HTTP service that owns the session,
//! signing and transaction construction. This client only shapes requests
//! and interprets acknowledgments; everything cryptographic lives on the
//! other side of the wire.

use crate::config::GatewayConfig;
use crate::exchange::traits::ExecutionClient;
use crate::exchange::types::{OrderIntent, QuoteLevel, SubmissionId};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Error from the gateway itself, as opposed to transport failures.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The venue rejected the submission (post-only would cross,
    /// insufficient margin, unknown market, ...).
    #[error("gateway rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Acknowledgment body returned by the gateway for order endpoints.
#[derive(Debug, Deserialize)]
struct TxResponse {
    tx: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplaceLadderRequest<'a> {
    market_index: u16,
    sub_account_id: u16,
    orders: &'a [QuoteLevel],
}

/// REST client for the execution gateway.
pub struct GatewayClient {
    http: Client,
    base_url: String,
}

impl GatewayClient {
    /// Create a new gateway client from configuration.
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// Turn a non-success response into a `GatewayError`, passing
    /// successful ones through.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(GatewayError::Rejected {
            status: status.as_u16(),
            message,
        }
        .into())
    }
}

#[async_trait]
impl ExecutionClient for GatewayClient {
    async fn place_order(&self, intent: &OrderIntent) -> Result<SubmissionId> {
        let url = format!("{}/v2/orders", self.base_url);
        debug!(?intent, "Placing order");

        let response = self
            .http
            .post(&url)
            .json(intent)
            .send()
            .await
            .context("Failed to submit order")?;

        let ack: TxResponse = Self::check(response)
            .await?
            .json()
            .await
            .context("Failed to parse order acknowledgment")?;

        Ok(SubmissionId(ack.tx))
    }

    async fn replace_ladder(
        &self,
        market_index: u16,
        sub_account_id: u16,
        levels: &[QuoteLevel],
    ) -> Result<SubmissionId> {
        let url = format!("{}/v2/orders/cancelAndPlace", self.base_url);
        let body = ReplaceLadderRequest {
            market_index,
            sub_account_id,
            orders: levels,
        };
        debug!(market = market_index, sub_account = sub_account_id, levels = levels.len(), "Replacing ladder");

        // The gateway bundles the cancel and the placements into a single
        // transaction, so the ladder swap is atomic venue-side.
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to submit ladder replace")?;

        let ack: TxResponse = Self::check(response)
            .await?
            .json()
            .await
            .context("Failed to parse ladder acknowledgment")?;

        Ok(SubmissionId(ack.tx))
    }

    async fn cancel_all_orders(&self, sub_account_id: u16) -> Result<()> {
        let url = format!(
            "{}/v2/orders?subAccountId={}",
            self.base_url, sub_account_id
        );

        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .context("Failed to submit cancel-all")?;

        Self::check(response).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        // Stateless HTTP client; the session lives in the gateway process.
        info!("Gateway client released");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::types::OrderSide;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(uri: String) -> GatewayClient {
        GatewayClient::new(&GatewayConfig {
            base_url: uri,
            ..GatewayConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_place_order_returns_submission_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/orders"))
            .and(body_partial_json(json!({
                "marketIndex": 0,
                "side": "short",
                "type": "market",
                "subAccountId": 2
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tx": "sig123"})))
            .mount(&server)
            .await;

        let client = gateway(server.uri());
        let intent = OrderIntent::market(0, OrderSide::Short, dec!(0.1), 2);
        let id = client.place_order(&intent).await.unwrap();
        assert_eq!(id, SubmissionId("sig123".to_string()));
    }

    #[tokio::test]
    async fn test_rejected_order_surfaces_gateway_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/orders"))
            .respond_with(ResponseTemplate::new(400).set_body_string("post-only would cross"))
            .mount(&server)
            .await;

        let client = gateway(server.uri());
        let intent = OrderIntent::market(0, OrderSide::Long, dec!(1), 0);
        let err = client.place_order(&intent).await.unwrap_err();
        let gateway_err = err.downcast_ref::<GatewayError>().expect("GatewayError");
        let GatewayError::Rejected { status, message } = gateway_err;
        assert_eq!(*status, 400);
        assert!(message.contains("post-only"));
    }

    #[tokio::test]
    async fn test_cancel_all_scoped_to_subaccount() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v2/orders"))
            .and(query_param("subAccountId", "1"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = gateway(server.uri());
        client.cancel_all_orders(1).await.unwrap();
    }

    #[tokio::test]
    async fn test_replace_ladder_posts_all_levels() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/orders/cancelAndPlace"))
            .and(body_partial_json(json!({
                "marketIndex": 0,
                "subAccountId": 0
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tx": "sig456"})))
            .mount(&server)
            .await;

        let client = gateway(server.uri());
        let levels = vec![
            QuoteLevel {
                side: OrderSide::Long,
                level: 1,
                price: dec!(99.5),
                size: dec!(1),
            },
            QuoteLevel {
                side: OrderSide::Short,
                level: 1,
                price: dec!(100.5),
                size: dec!(1),
            },
        ];
        let id = client.replace_ladder(0, 0, &levels).await.unwrap();
        assert_eq!(id.to_string(), "sig456");
    }
}
