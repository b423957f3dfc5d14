//! Order, quote and market data types shared by all strategies.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order direction, in the venue's perp naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Long,
    Short,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Long => write!(f, "LONG"),
            OrderSide::Short => write!(f, "SHORT"),
        }
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
    Market,
}

/// Opaque submission acknowledgment from the execution layer
/// (a transaction signature on the live venue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionId(pub String);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Minimum price/size increments for one perp market.
#[derive(Debug, Clone)]
pub struct MarketSpec {
    /// Perp market index (0=SOL, 1=BTC, 2=ETH on the devnet deployment).
    pub index: u16,
    pub tick_size: Decimal,
    pub step_size: Decimal,
}

impl Default for MarketSpec {
    fn default() -> Self {
        Self {
            index: 0,
            tick_size: dec!(0.0001),
            step_size: dec!(0.01),
        }
    }
}

/// A single resting quote within a ladder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteLevel {
    pub side: OrderSide,
    /// 1-based distance from the reference price.
    pub level: u32,
    pub price: Decimal,
    pub size: Decimal,
}

/// One order a strategy wants submitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderIntent {
    pub market_index: u16,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub size: Decimal,
    /// Limit price; `None` for market orders.
    pub price: Option<Decimal>,
    /// Must-not-cross flag: the order rests or is rejected, never takes.
    pub post_only: bool,
    pub sub_account_id: u16,
}

impl OrderIntent {
    /// A taker-eligible market order.
    pub fn market(market_index: u16, side: OrderSide, size: Decimal, sub_account_id: u16) -> Self {
        Self {
            market_index,
            side,
            order_type: OrderType::Market,
            size,
            price: None,
            post_only: false,
            sub_account_id,
        }
    }

    /// A taker-eligible limit order.
    pub fn limit(
        market_index: u16,
        side: OrderSide,
        size: Decimal,
        price: Decimal,
        sub_account_id: u16,
    ) -> Self {
        Self {
            market_index,
            side,
            order_type: OrderType::Limit,
            size,
            price: Some(price),
            post_only: false,
            sub_account_id,
        }
    }
}

/// Best bid/ask for one market; either side may be empty.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BookSnapshot {
    pub best_bid: Option<Decimal>,
    pub best_ask: Option<Decimal>,
}

impl BookSnapshot {
    pub fn new(best_bid: Option<Decimal>, best_ask: Option<Decimal>) -> Self {
        Self { best_bid, best_ask }
    }

    /// True when both sides are present and the best bid is at or above
    /// the best ask (a riskless taker fill is available).
    pub fn is_crossed(&self) -> bool {
        matches!((self.best_bid, self.best_ask), (Some(bid), Some(ask)) if bid >= ask)
    }
}

/// Wire format of the aggregator's `/l2` endpoint. Best level first
/// in each array, prices and sizes string-encoded.
#[derive(Debug, Clone, Deserialize)]
pub struct L2Book {
    pub bids: Vec<L2Level>,
    pub asks: Vec<L2Level>,
}

/// One price level in an [`L2Book`].
#[derive(Debug, Clone, Deserialize)]
pub struct L2Level {
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub size: Decimal,
}

impl L2Book {
    /// Collapse to best bid/ask; an empty side maps to `None`.
    pub fn to_snapshot(&self) -> BookSnapshot {
        BookSnapshot {
            best_bid: self.bids.first().map(|l| l.price),
            best_ask: self.asks.first().map(|l| l.price),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crossed_book_detection() {
        let crossed = BookSnapshot::new(Some(dec!(101)), Some(dec!(100)));
        assert!(crossed.is_crossed());

        let locked = BookSnapshot::new(Some(dec!(100)), Some(dec!(100)));
        assert!(locked.is_crossed());

        let normal = BookSnapshot::new(Some(dec!(99)), Some(dec!(100)));
        assert!(!normal.is_crossed());

        let one_sided = BookSnapshot::new(Some(dec!(101)), None);
        assert!(!one_sided.is_crossed());
    }

    #[test]
    fn test_l2_parsing_and_snapshot() {
        let raw = r#"{
            "bids": [{"price": "101.25", "size": "3"}, {"price": "100.5", "size": "1"}],
            "asks": [{"price": "100.0", "size": "2.5"}]
        }"#;
        let book: L2Book = serde_json::from_str(raw).unwrap();
        let snapshot = book.to_snapshot();
        assert_eq!(snapshot.best_bid, Some(dec!(101.25)));
        assert_eq!(snapshot.best_ask, Some(dec!(100.0)));
        assert!(snapshot.is_crossed());
    }

    #[test]
    fn test_l2_empty_side() {
        let raw = r#"{"bids": [], "asks": [{"price": "100", "size": "1"}]}"#;
        let book: L2Book = serde_json::from_str(raw).unwrap();
        let snapshot = book.to_snapshot();
        assert_eq!(snapshot.best_bid, None);
        assert!(!snapshot.is_crossed());
    }

    #[test]
    fn test_order_intent_constructors() {
        let taker = OrderIntent::market(0, OrderSide::Short, dec!(0.1), 2);
        assert_eq!(taker.order_type, OrderType::Market);
        assert_eq!(taker.price, None);
        assert!(!taker.post_only);

        let limit = OrderIntent::limit(1, OrderSide::Long, dec!(2.5), dec!(99.5), 1);
        assert_eq!(limit.order_type, OrderType::Limit);
        assert_eq!(limit.price, Some(dec!(99.5)));
    }
}
