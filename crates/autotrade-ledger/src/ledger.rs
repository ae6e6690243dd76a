//! Position ledger implementation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use autotrade_core::error::LedgerError;
use autotrade_core::types::{FillReport, Position, TradeRecord};

/// Per-portfolio book of open positions and archived trades.
#[derive(Debug, Default)]
struct Book {
    positions: HashMap<String, Position>,
    history: Vec<TradeRecord>,
    /// Realized P&L accumulated across open and archived positions
    realized_pnl: Decimal,
}

/// Result of applying a fill.
#[derive(Debug, Clone)]
pub struct FillOutcome {
    /// P&L realized by this fill (zero when opening or adding)
    pub realized_pnl: Decimal,
    /// Archived trade, present when the fill took the position flat. Carries
    /// the position's total realized P&L and its opening signal id for the
    /// late profit_loss backfill.
    pub closed_trade: Option<TradeRecord>,
}

impl FillOutcome {
    pub fn position_closed(&self) -> bool {
        self.closed_trade.is_some()
    }
}

/// Read-only view of one portfolio's book.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    pub portfolio_id: String,
    pub positions: Vec<Position>,
    pub history: Vec<TradeRecord>,
    pub realized_pnl: Decimal,
    pub unrealized_pnl: Decimal,
}

impl LedgerSnapshot {
    /// Total absolute market value across open positions.
    pub fn total_exposure(&self) -> Decimal {
        self.positions.iter().map(|p| p.market_value()).sum()
    }

    /// Largest single-position market value.
    pub fn max_position_value(&self) -> Decimal {
        self.positions
            .iter()
            .map(|p| p.market_value())
            .max()
            .unwrap_or(Decimal::ZERO)
    }

    /// Equity given the portfolio's initial capital.
    pub fn equity(&self, initial_capital: Decimal) -> Decimal {
        initial_capital + self.realized_pnl + self.unrealized_pnl
    }
}

/// Authoritative record of open and closed positions per portfolio.
pub struct PositionLedger {
    books: RwLock<HashMap<String, Book>>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self {
            books: RwLock::new(HashMap::new()),
        }
    }

    /// Apply a fill to the portfolio's book, creating the position on first
    /// fill and archiving it into trade history when it goes flat.
    pub fn apply_fill(
        &self,
        portfolio_id: &str,
        fill: &FillReport,
        signal_id: Option<Uuid>,
        exchange_name: &str,
    ) -> Result<FillOutcome, LedgerError> {
        let mut books = self.books.write().unwrap();
        let book = books.entry(portfolio_id.to_string()).or_default();

        let outcome = match book.positions.get_mut(&fill.symbol) {
            Some(position) => {
                let realized = position.apply_fill(fill)?;
                book.realized_pnl += realized;

                if position.is_flat() {
                    let record = TradeRecord::from_closed(position, fill);
                    debug!(
                        portfolio_id,
                        symbol = %fill.symbol,
                        realized = %realized,
                        "position closed, archiving trade"
                    );
                    book.history.push(record.clone());
                    book.positions.remove(&fill.symbol);

                    FillOutcome {
                        realized_pnl: realized,
                        closed_trade: Some(record),
                    }
                } else {
                    FillOutcome {
                        realized_pnl: realized,
                        closed_trade: None,
                    }
                }
            }
            None => {
                let position = Position::open(portfolio_id, fill, exchange_name, signal_id)?;
                position.validate()?;
                book.positions.insert(fill.symbol.clone(), position);

                FillOutcome {
                    realized_pnl: Decimal::ZERO,
                    closed_trade: None,
                }
            }
        };

        Ok(outcome)
    }

    /// Update the market price of one open position.
    pub fn update_price(
        &self,
        portfolio_id: &str,
        symbol: &str,
        price: Decimal,
        now: DateTime<Utc>,
    ) {
        let mut books = self.books.write().unwrap();
        if let Some(position) = books
            .get_mut(portfolio_id)
            .and_then(|book| book.positions.get_mut(symbol))
        {
            position.update_price(price, now);
        }
    }

    /// Open position in a symbol, if any.
    pub fn position(&self, portfolio_id: &str, symbol: &str) -> Option<Position> {
        let books = self.books.read().unwrap();
        books
            .get(portfolio_id)
            .and_then(|book| book.positions.get(symbol))
            .cloned()
    }

    /// Symbols with an open position.
    pub fn open_symbols(&self, portfolio_id: &str) -> Vec<String> {
        let books = self.books.read().unwrap();
        books
            .get(portfolio_id)
            .map(|book| book.positions.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Cloned snapshot of the portfolio's book. May lag concurrent writes;
    /// readers treat it as advisory, never as the source of truth.
    pub fn snapshot(&self, portfolio_id: &str) -> LedgerSnapshot {
        let books = self.books.read().unwrap();
        match books.get(portfolio_id) {
            Some(book) => LedgerSnapshot {
                portfolio_id: portfolio_id.to_string(),
                positions: book.positions.values().cloned().collect(),
                history: book.history.clone(),
                realized_pnl: book.realized_pnl,
                unrealized_pnl: book.positions.values().map(|p| p.unrealized_pnl).sum(),
            },
            None => LedgerSnapshot {
                portfolio_id: portfolio_id.to_string(),
                positions: Vec::new(),
                history: Vec::new(),
                realized_pnl: Decimal::ZERO,
                unrealized_pnl: Decimal::ZERO,
            },
        }
    }
}

impl Default for PositionLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autotrade_core::types::Side;
    use rust_decimal_macros::dec;

    fn fill(side: Side, quantity: Decimal, price: Decimal) -> FillReport {
        FillReport {
            order_id: Uuid::new_v4(),
            symbol: "BTC-USD".to_string(),
            side,
            quantity,
            price,
            commission: Decimal::ZERO,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_first_fill_opens_position() {
        let ledger = PositionLedger::new();
        let signal_id = Uuid::new_v4();

        let outcome = ledger
            .apply_fill("p1", &fill(Side::Buy, dec!(1), dec!(50000)), Some(signal_id), "paper")
            .unwrap();

        assert_eq!(outcome.realized_pnl, Decimal::ZERO);
        assert!(!outcome.position_closed());

        let position = ledger.position("p1", "BTC-USD").unwrap();
        assert_eq!(position.quantity, dec!(1));
        assert_eq!(position.associated_signal_id, Some(signal_id));
    }

    #[test]
    fn test_close_archives_trade_and_reports_signal() {
        let ledger = PositionLedger::new();
        let signal_id = Uuid::new_v4();

        ledger
            .apply_fill("p1", &fill(Side::Buy, dec!(1), dec!(50000)), Some(signal_id), "paper")
            .unwrap();
        let outcome = ledger
            .apply_fill("p1", &fill(Side::Sell, dec!(1), dec!(51000)), None, "paper")
            .unwrap();

        assert_eq!(outcome.realized_pnl, dec!(1000));
        let trade = outcome.closed_trade.as_ref().unwrap();
        assert_eq!(trade.signal_id, Some(signal_id));
        assert_eq!(trade.realized_pnl, dec!(1000));

        assert!(ledger.position("p1", "BTC-USD").is_none());
        let snapshot = ledger.snapshot("p1");
        assert_eq!(snapshot.history.len(), 1);
        assert_eq!(snapshot.history[0].realized_pnl, dec!(1000));
        assert_eq!(snapshot.realized_pnl, dec!(1000));
        assert_eq!(snapshot.unrealized_pnl, Decimal::ZERO);
    }

    #[test]
    fn test_partial_close_keeps_position_open() {
        let ledger = PositionLedger::new();

        ledger
            .apply_fill("p1", &fill(Side::Buy, dec!(2), dec!(50000)), None, "paper")
            .unwrap();
        let outcome = ledger
            .apply_fill("p1", &fill(Side::Sell, dec!(1), dec!(52000)), None, "paper")
            .unwrap();

        assert_eq!(outcome.realized_pnl, dec!(2000));
        assert!(!outcome.position_closed());
        assert_eq!(ledger.position("p1", "BTC-USD").unwrap().quantity, dec!(1));
    }

    #[test]
    fn test_price_update_moves_unrealized() {
        let ledger = PositionLedger::new();

        ledger
            .apply_fill("p1", &fill(Side::Buy, dec!(2), dec!(50000)), None, "paper")
            .unwrap();
        ledger.update_price("p1", "BTC-USD", dec!(49000), Utc::now());

        let snapshot = ledger.snapshot("p1");
        assert_eq!(snapshot.unrealized_pnl, dec!(-2000));
        assert_eq!(snapshot.equity(dec!(100000)), dec!(98000));
    }

    #[test]
    fn test_portfolios_are_isolated() {
        let ledger = PositionLedger::new();

        ledger
            .apply_fill("p1", &fill(Side::Buy, dec!(1), dec!(50000)), None, "paper")
            .unwrap();

        assert!(ledger.position("p2", "BTC-USD").is_none());
        assert_eq!(ledger.snapshot("p2").positions.len(), 0);
        assert_eq!(ledger.open_symbols("p1"), vec!["BTC-USD".to_string()]);
    }

    #[test]
    fn test_exposure_and_concentration_inputs() {
        let ledger = PositionLedger::new();

        ledger
            .apply_fill("p1", &fill(Side::Buy, dec!(1), dec!(50000)), None, "paper")
            .unwrap();
        let mut eth = fill(Side::Buy, dec!(10), dec!(3000));
        eth.symbol = "ETH-USD".to_string();
        ledger.apply_fill("p1", &eth, None, "paper").unwrap();

        let snapshot = ledger.snapshot("p1");
        assert_eq!(snapshot.total_exposure(), dec!(80000));
        assert_eq!(snapshot.max_position_value(), dec!(50000));
    }
}
