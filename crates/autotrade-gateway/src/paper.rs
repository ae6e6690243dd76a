//! Paper trading gateway for simulation.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;
use uuid::Uuid;

use autotrade_core::error::GatewayError;
use autotrade_core::traits::{ExchangeGateway, MarketData};
use autotrade_core::types::{FillReport, OrderRequest, Position, Side};

/// Simulated exchange gateway.
///
/// Fills market orders at the current quote with configurable slippage and
/// commission. Always fills in full; partial fills are an exchange-specific
/// behavior the simulation does not model.
///
/// One gateway instance is shared by every portfolio; the submission budget
/// models the exchange-wide rate limit and is the only state portfolios
/// contend on.
pub struct PaperGateway {
    market_data: Arc<dyn MarketData>,
    slippage_pct: Decimal,
    commission_per_unit: Decimal,
    /// Exchange-wide cap on in-flight submissions
    budget: Semaphore,
}

impl PaperGateway {
    /// Create a new paper gateway pricing fills from the given quote source.
    pub fn new(market_data: Arc<dyn MarketData>) -> Self {
        Self {
            market_data,
            slippage_pct: dec!(0.05),
            commission_per_unit: Decimal::ZERO,
            budget: Semaphore::new(8),
        }
    }

    /// Set slippage percentage.
    pub fn with_slippage(mut self, slippage_pct: Decimal) -> Self {
        self.slippage_pct = slippage_pct;
        self
    }

    /// Set commission per unit.
    pub fn with_commission(mut self, commission: Decimal) -> Self {
        self.commission_per_unit = commission;
        self
    }

    /// Set the cap on concurrent order submissions.
    pub fn with_order_budget(mut self, permits: usize) -> Self {
        self.budget = Semaphore::new(permits);
        self
    }

    fn fill_price(&self, side: Side, market_price: Decimal) -> Decimal {
        match side {
            Side::Buy => market_price * (dec!(1) + self.slippage_pct / dec!(100)),
            Side::Sell => market_price * (dec!(1) - self.slippage_pct / dec!(100)),
        }
    }
}

#[async_trait]
impl ExchangeGateway for PaperGateway {
    async fn submit_order(&self, request: &OrderRequest) -> Result<FillReport, GatewayError> {
        if request.quantity <= Decimal::ZERO {
            return Err(GatewayError::OrderRejected(format!(
                "non-positive quantity {}",
                request.quantity
            )));
        }

        let _permit = self
            .budget
            .acquire()
            .await
            .map_err(|_| GatewayError::Network("submission budget closed".to_string()))?;

        let quote = self
            .market_data
            .get_quote(&request.symbol)
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let price = self.fill_price(request.side, quote.price);
        debug!(
            symbol = %request.symbol,
            side = %request.side,
            quantity = %request.quantity,
            %price,
            "paper fill"
        );

        Ok(FillReport {
            order_id: request.client_order_id,
            symbol: request.symbol.clone(),
            side: request.side,
            quantity: request.quantity,
            price,
            commission: self.commission_per_unit * request.quantity,
            timestamp: Utc::now(),
        })
    }

    async fn close_position(&self, position: &Position) -> Result<FillReport, GatewayError> {
        if position.is_flat() {
            return Err(GatewayError::PositionNotFound(position.symbol.clone()));
        }

        let side = if position.is_long() {
            Side::Sell
        } else {
            Side::Buy
        };
        let request = OrderRequest {
            portfolio_id: position.portfolio_id.clone(),
            symbol: position.symbol.clone(),
            side,
            quantity: position.abs_quantity(),
            client_order_id: Uuid::new_v4(),
        };

        self.submit_order(&request).await
    }

    fn name(&self) -> &str {
        "paper"
    }
}
