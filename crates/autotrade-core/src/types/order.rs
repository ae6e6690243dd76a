//! Order and fill types.
//!
//! The coordinator only places market orders; exchange-specific order
//! variants live behind the gateway implementations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Get the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Get the sign for position calculations (+1 for buy, -1 for sell).
    pub fn sign(&self) -> Decimal {
        match self {
            Side::Buy => Decimal::ONE,
            Side::Sell => -Decimal::ONE,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// A market order request submitted to an exchange gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Portfolio placing the order
    pub portfolio_id: String,
    /// Symbol to trade
    pub symbol: String,
    /// Buy or sell
    pub side: Side,
    /// Quantity to trade (always positive)
    pub quantity: Decimal,
    /// Client-provided order ID
    pub client_order_id: Uuid,
}

impl OrderRequest {
    /// Create a market order request.
    pub fn market(
        portfolio_id: impl Into<String>,
        symbol: impl Into<String>,
        side: Side,
        quantity: Decimal,
    ) -> Self {
        Self {
            portfolio_id: portfolio_id.into(),
            symbol: symbol.into(),
            side,
            quantity,
            client_order_id: Uuid::new_v4(),
        }
    }
}

/// The confirmed result of an order submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillReport {
    /// Order this fill belongs to
    pub order_id: Uuid,
    /// Symbol traded
    pub symbol: String,
    /// Buy or sell
    pub side: Side,
    /// Quantity actually executed (always positive)
    pub quantity: Decimal,
    /// Price at which the fill occurred
    pub price: Decimal,
    /// Commission charged
    pub commission: Decimal,
    /// Timestamp of the fill
    pub timestamp: DateTime<Utc>,
}
