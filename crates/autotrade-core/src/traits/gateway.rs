//! Exchange order gateway trait.

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::types::{FillReport, OrderRequest, Position};

/// Trait for exchange order gateways.
///
/// Credentials and authentication are handled entirely outside the pipeline;
/// implementations receive fully-formed market orders and report fills.
#[async_trait]
pub trait ExchangeGateway: Send + Sync {
    /// Submit a market order and wait for its fill.
    async fn submit_order(&self, request: &OrderRequest) -> Result<FillReport, GatewayError>;

    /// Close an open position with an opposing market order.
    async fn close_position(&self, position: &Position) -> Result<FillReport, GatewayError>;

    /// Get the gateway name.
    fn name(&self) -> &str;
}
