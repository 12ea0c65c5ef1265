//! Derived holdings domain models.
//!
//! Everything in this module is a pure derivation of the transaction log.
//! Positions and realized P&L events are regenerated wholesale on each
//! replay and are never patched in place.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::transactions::{AssetCategory, TransactionType};

/// Current holding for one symbol within a portfolio, carrying the
/// weighted-average cost of the open quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub portfolio_id: String,
    pub symbol: String,
    pub asset_name: Option<String>,
    pub category: AssetCategory,
    pub quantity: Decimal,
    pub avg_cost: Decimal,
    pub currency: String,
    /// Execution timestamp of the first transaction that opened the position.
    pub opened_at: DateTime<Utc>,
}

impl Position {
    pub fn new(
        portfolio_id: String,
        symbol: String,
        category: AssetCategory,
        currency: String,
        opened_at: DateTime<Utc>,
    ) -> Self {
        Self {
            portfolio_id,
            symbol,
            asset_name: None,
            category,
            quantity: Decimal::ZERO,
            avg_cost: Decimal::ZERO,
            currency,
            opened_at,
        }
    }

    /// Total invested cost of the open quantity.
    pub fn total_cost(&self) -> Decimal {
        self.quantity * self.avg_cost
    }
}

/// The flavor of a realized P&L event, mirroring the transaction that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RealizedPnlKind {
    /// Sell of a priced asset; consumes weighted-average basis.
    Sale,
    /// Withdrawal from a cash-like position.
    Withdrawal,
    /// Dividend or other pure income; consumes no basis.
    Income,
}

impl RealizedPnlKind {
    pub fn from_transaction_type(kind: TransactionType) -> Option<Self> {
        match kind {
            TransactionType::Sell => Some(RealizedPnlKind::Sale),
            TransactionType::Withdraw => Some(RealizedPnlKind::Withdrawal),
            TransactionType::Dividend => Some(RealizedPnlKind::Income),
            TransactionType::Buy | TransactionType::Deposit => None,
        }
    }
}

/// Profit or loss permanently fixed by a sell/withdraw/dividend transaction.
/// Immutable once computed; the whole set is regenerated on replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealizedPnlEvent {
    pub transaction_id: String,
    pub portfolio_id: String,
    pub symbol: String,
    pub category: AssetCategory,
    pub kind: RealizedPnlKind,
    /// Quantity affected by the event.
    pub quantity: Decimal,
    /// Cost basis consumed (zero for income events).
    pub cost_basis: Decimal,
    /// Gross proceeds before fee.
    pub proceeds: Decimal,
    pub fee: Decimal,
    /// `proceeds - cost_basis - fee`.
    pub pnl: Decimal,
    pub currency: String,
    pub occurred_at: DateTime<Utc>,
}

/// Complete derived state of one portfolio: the result of folding its full
/// transaction history from a zero initial state.
///
/// Positions are keyed by symbol in a `BTreeMap` so two replays of the same
/// history compare (and serialize) identically.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerReplay {
    pub positions: BTreeMap<String, Position>,
    pub realized_events: Vec<RealizedPnlEvent>,
}

impl LedgerReplay {
    /// Positions with open (non-zero) quantity. Fully closed positions are
    /// retained in the derived set but excluded from valuation.
    pub fn open_positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values().filter(|p| !p.quantity.is_zero())
    }

    /// Sum of realized P&L in native currencies, grouped by currency.
    pub fn realized_pnl_by_currency(&self) -> BTreeMap<String, Decimal> {
        let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
        for event in &self.realized_events {
            *totals.entry(event.currency.clone()).or_default() += event.pnl;
        }
        totals
    }
}
