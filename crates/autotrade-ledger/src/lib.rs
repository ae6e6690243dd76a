//! Authoritative position ledger.
//!
//! One ledger instance serves every portfolio; all entries are scoped to
//! exactly one portfolio and never shared across portfolios. The execution
//! coordinator is the only writer (while holding the portfolio's exclusion
//! token); metrics and dashboards read cloned snapshots that may be slightly
//! stale.

mod ledger;

pub use ledger::{FillOutcome, LedgerSnapshot, PositionLedger};
