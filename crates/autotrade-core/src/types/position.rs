//! Position and trade-history types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::Signed;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{FillReport, Side};
use crate::error::LedgerError;

/// Direction of an open holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    /// Side implied by an opening order.
    pub fn from_order_side(side: Side) -> Self {
        match side {
            Side::Buy => PositionSide::Long,
            Side::Sell => PositionSide::Short,
        }
    }
}

/// An open holding in a single symbol, scoped to one portfolio.
///
/// Quantity is signed: positive for long, negative for short, and its sign
/// always agrees with `side`. Unrealized P&L is recomputed on every price
/// update and is zero once the position is flat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: Uuid,
    pub portfolio_id: String,
    pub symbol: String,
    pub side: PositionSide,
    /// Signed quantity (positive long, negative short)
    pub quantity: Decimal,
    /// Average entry price
    pub entry_price: Decimal,
    /// Current market price
    pub current_price: Decimal,
    /// Unrealized profit/loss at the current price
    pub unrealized_pnl: Decimal,
    /// Realized profit/loss from closed portions
    pub realized_pnl: Decimal,
    /// Exchange the position lives on
    pub exchange_name: String,
    /// Signal whose execution opened this position
    pub associated_signal_id: Option<Uuid>,
    pub opened_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Position {
    /// Open a new position from the first fill of an executed signal.
    pub fn open(
        portfolio_id: impl Into<String>,
        fill: &FillReport,
        exchange_name: impl Into<String>,
        associated_signal_id: Option<Uuid>,
    ) -> Result<Self, LedgerError> {
        if fill.quantity <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveQuantity(fill.quantity));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            portfolio_id: portfolio_id.into(),
            symbol: fill.symbol.clone(),
            side: PositionSide::from_order_side(fill.side),
            quantity: fill.side.sign() * fill.quantity,
            entry_price: fill.price,
            current_price: fill.price,
            unrealized_pnl: Decimal::ZERO,
            realized_pnl: Decimal::ZERO,
            exchange_name: exchange_name.into(),
            associated_signal_id,
            opened_at: fill.timestamp,
            updated_at: fill.timestamp,
        })
    }

    /// Check if this is a long position.
    pub fn is_long(&self) -> bool {
        self.quantity > Decimal::ZERO
    }

    /// Check if this is a short position.
    pub fn is_short(&self) -> bool {
        self.quantity < Decimal::ZERO
    }

    /// Check if the position is flat (fully closed).
    pub fn is_flat(&self) -> bool {
        self.quantity == Decimal::ZERO
    }

    /// Get the absolute quantity.
    pub fn abs_quantity(&self) -> Decimal {
        self.quantity.abs()
    }

    /// Market value of the position at the current price (always positive).
    pub fn market_value(&self) -> Decimal {
        self.quantity.abs() * self.current_price
    }

    /// Verify the quantity sign agrees with the side.
    pub fn validate(&self) -> Result<(), LedgerError> {
        let consistent = match self.side {
            PositionSide::Long => self.quantity > Decimal::ZERO,
            PositionSide::Short => self.quantity < Decimal::ZERO,
        };
        if !consistent && !self.is_flat() {
            return Err(LedgerError::QuantitySideMismatch {
                side: self.side,
                quantity: self.quantity,
            });
        }
        Ok(())
    }

    /// Update the current market price and recompute unrealized P&L.
    pub fn update_price(&mut self, price: Decimal, now: DateTime<Utc>) {
        self.current_price = price;
        self.unrealized_pnl = self.quantity * (price - self.entry_price);
        self.updated_at = now;
    }

    /// Apply a fill to the position.
    /// Returns the realized P&L on any closed portion.
    pub fn apply_fill(&mut self, fill: &FillReport) -> Result<Decimal, LedgerError> {
        if fill.quantity <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveQuantity(fill.quantity));
        }

        let fill_qty = fill.side.sign() * fill.quantity;
        let mut realized = Decimal::ZERO;

        let same_direction = (self.quantity > Decimal::ZERO && fill_qty > Decimal::ZERO)
            || (self.quantity < Decimal::ZERO && fill_qty < Decimal::ZERO);

        if same_direction || self.is_flat() {
            // Adding to the position: update average entry price
            let total_cost = self.quantity * self.entry_price + fill_qty * fill.price;
            let new_quantity = self.quantity + fill_qty;

            if new_quantity != Decimal::ZERO {
                self.entry_price = total_cost / new_quantity;
            }
            self.quantity = new_quantity;
        } else {
            // Reducing or reversing the position
            let close_qty = fill_qty.abs().min(self.quantity.abs());

            realized = if self.quantity > Decimal::ZERO {
                close_qty * (fill.price - self.entry_price)
            } else {
                close_qty * (self.entry_price - fill.price)
            };
            self.realized_pnl += realized;

            let remaining = fill_qty.abs() - close_qty;
            if remaining > Decimal::ZERO {
                // Position reversed
                self.quantity = fill_qty.signum() * remaining;
                self.entry_price = fill.price;
            } else {
                self.quantity += fill_qty;
            }
        }

        if !self.is_flat() {
            self.side = if self.quantity > Decimal::ZERO {
                PositionSide::Long
            } else {
                PositionSide::Short
            };
        }
        self.update_price(fill.price, fill.timestamp);

        Ok(realized)
    }
}

/// Archived record of a closed position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub portfolio_id: String,
    pub symbol: String,
    pub side: PositionSide,
    /// Absolute quantity closed
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub realized_pnl: Decimal,
    pub opened_at: DateTime<Utc>,
    pub closed_at: DateTime<Utc>,
    /// Signal whose execution opened the position
    pub signal_id: Option<Uuid>,
}

impl TradeRecord {
    /// Archive a position that has just gone flat.
    pub fn from_closed(position: &Position, exit: &FillReport) -> Self {
        Self {
            portfolio_id: position.portfolio_id.clone(),
            symbol: position.symbol.clone(),
            side: position.side,
            quantity: exit.quantity,
            entry_price: position.entry_price,
            exit_price: exit.price,
            realized_pnl: position.realized_pnl,
            opened_at: position.opened_at,
            closed_at: exit.timestamp,
            signal_id: position.associated_signal_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn fill(side: Side, quantity: Decimal, price: Decimal) -> FillReport {
        FillReport {
            order_id: Uuid::new_v4(),
            symbol: "ETH-USD".to_string(),
            side,
            quantity,
            price,
            commission: Decimal::ZERO,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_open_long() {
        let position =
            Position::open("p1", &fill(Side::Buy, dec!(2), dec!(3000)), "paper", None).unwrap();
        assert!(position.is_long());
        assert_eq!(position.side, PositionSide::Long);
        assert_eq!(position.quantity, dec!(2));
        assert!(position.validate().is_ok());
    }

    #[test]
    fn test_open_rejects_non_positive_quantity() {
        let err = Position::open("p1", &fill(Side::Buy, dec!(0), dec!(3000)), "paper", None)
            .unwrap_err();
        assert!(matches!(err, LedgerError::NonPositiveQuantity(_)));
    }

    #[test]
    fn test_update_price_recomputes_unrealized() {
        let mut position =
            Position::open("p1", &fill(Side::Buy, dec!(2), dec!(3000)), "paper", None).unwrap();

        position.update_price(dec!(3100), Utc::now());
        assert_eq!(position.unrealized_pnl, dec!(200));

        position.update_price(dec!(2900), Utc::now());
        assert_eq!(position.unrealized_pnl, dec!(-200));
    }

    #[test]
    fn test_short_unrealized_gains_on_drop() {
        let mut position =
            Position::open("p1", &fill(Side::Sell, dec!(1), dec!(3000)), "paper", None).unwrap();
        assert!(position.is_short());

        position.update_price(dec!(2800), Utc::now());
        assert_eq!(position.unrealized_pnl, dec!(200));
    }

    #[test]
    fn test_apply_fill_increase_averages_entry() {
        let mut position =
            Position::open("p1", &fill(Side::Buy, dec!(1), dec!(3000)), "paper", None).unwrap();

        let realized = position.apply_fill(&fill(Side::Buy, dec!(1), dec!(3200))).unwrap();
        assert_eq!(realized, Decimal::ZERO);
        assert_eq!(position.quantity, dec!(2));
        assert_eq!(position.entry_price, dec!(3100));
    }

    #[test]
    fn test_apply_fill_close_realizes_pnl() {
        let mut position =
            Position::open("p1", &fill(Side::Buy, dec!(2), dec!(3000)), "paper", None).unwrap();

        let realized = position.apply_fill(&fill(Side::Sell, dec!(2), dec!(3150))).unwrap();
        assert_eq!(realized, dec!(300));
        assert!(position.is_flat());
        assert_eq!(position.unrealized_pnl, Decimal::ZERO);
    }

    #[test]
    fn test_apply_fill_reversal_flips_side() {
        let mut position =
            Position::open("p1", &fill(Side::Buy, dec!(1), dec!(3000)), "paper", None).unwrap();

        let realized = position.apply_fill(&fill(Side::Sell, dec!(3), dec!(3100))).unwrap();
        assert_eq!(realized, dec!(100));
        assert_eq!(position.quantity, dec!(-2));
        assert_eq!(position.side, PositionSide::Short);
        assert_eq!(position.entry_price, dec!(3100));
        assert!(position.validate().is_ok());
    }
}
