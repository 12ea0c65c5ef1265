//! Transaction domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::transactions_errors::TransactionError;

/// Asset classification for a transaction or position.
///
/// Closed set: every projector and valuation branch matches exhaustively on
/// this enum, so adding a category is a compile-time event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    TwStock,
    UsStock,
    Crypto,
    Fiat,
    Liability,
}

impl AssetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::TwStock => "tw_stock",
            AssetCategory::UsStock => "us_stock",
            AssetCategory::Crypto => "crypto",
            AssetCategory::Fiat => "fiat",
            AssetCategory::Liability => "liability",
        }
    }

    /// Liabilities are netted against assets in net-worth rollups.
    pub fn is_liability(&self) -> bool {
        matches!(self, AssetCategory::Liability)
    }

    /// Cash-like categories move via deposit/withdraw with avg_cost pinned at 1.
    pub fn is_cash_like(&self) -> bool {
        matches!(self, AssetCategory::Fiat | AssetCategory::Liability)
    }

    pub fn all() -> [AssetCategory; 5] {
        [
            AssetCategory::TwStock,
            AssetCategory::UsStock,
            AssetCategory::Crypto,
            AssetCategory::Fiat,
            AssetCategory::Liability,
        ]
    }
}

impl std::fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transaction type. Closed set, matched exhaustively by the projector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Buy,
    Sell,
    Dividend,
    Deposit,
    Withdraw,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Buy => "buy",
            TransactionType::Sell => "sell",
            TransactionType::Dividend => "dividend",
            TransactionType::Deposit => "deposit",
            TransactionType::Withdraw => "withdraw",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user-entered ledger event. Immutable once accepted except through the
/// explicit update/delete paths, both of which invalidate derived state for
/// the whole portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub portfolio_id: String,
    pub category: AssetCategory,
    pub symbol: String,
    pub asset_name: Option<String>,
    pub kind: TransactionType,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub fee: Decimal,
    pub currency: String,
    pub executed_at: DateTime<Utc>,
    pub note: Option<String>,
    /// Creation sequence id assigned by the ledger store. Used as the
    /// secondary sort key when execution timestamps tie.
    pub sequence: i64,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Gross amount of the trade including fee.
    pub fn total_amount(&self) -> Decimal {
        self.quantity * self.unit_price + self.fee
    }

    /// Replay ordering key: execution timestamp, ties broken by creation
    /// sequence.
    pub fn sort_key(&self) -> (DateTime<Utc>, i64) {
        (self.executed_at, self.sequence)
    }
}

fn validate_common(
    portfolio_id: &str,
    symbol: &str,
    currency: &str,
    kind: TransactionType,
    category: AssetCategory,
    quantity: Decimal,
    unit_price: Decimal,
    fee: Decimal,
) -> Result<(), TransactionError> {
    if portfolio_id.trim().is_empty() {
        return Err(TransactionError::InvalidData(
            "Portfolio ID cannot be empty".to_string(),
        ));
    }
    if symbol.trim().is_empty() {
        return Err(TransactionError::InvalidData(
            "Symbol cannot be empty".to_string(),
        ));
    }
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(TransactionError::InvalidData(format!(
            "Invalid currency code: {}",
            currency
        )));
    }
    if quantity <= Decimal::ZERO {
        return Err(TransactionError::InvalidData(format!(
            "Quantity must be positive, got {}",
            quantity
        )));
    }
    if unit_price < Decimal::ZERO {
        return Err(TransactionError::InvalidData(format!(
            "Unit price cannot be negative, got {}",
            unit_price
        )));
    }
    if fee < Decimal::ZERO {
        return Err(TransactionError::InvalidData(format!(
            "Fee cannot be negative, got {}",
            fee
        )));
    }

    let compatible = match kind {
        TransactionType::Deposit | TransactionType::Withdraw => category.is_cash_like(),
        TransactionType::Buy | TransactionType::Sell | TransactionType::Dividend => {
            !category.is_cash_like()
        }
    };
    if !compatible {
        return Err(TransactionError::InvalidData(format!(
            "Transaction type '{}' is not valid for category '{}'",
            kind, category
        )));
    }

    Ok(())
}

/// Input model for creating a new transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub portfolio_id: String,
    pub category: AssetCategory,
    pub symbol: String,
    pub asset_name: Option<String>,
    pub kind: TransactionType,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    #[serde(default)]
    pub fee: Option<Decimal>,
    pub currency: String,
    pub executed_at: DateTime<Utc>,
    pub note: Option<String>,
}

impl NewTransaction {
    /// Validates the payload before it is allowed anywhere near the ledger.
    pub fn validate(&self) -> Result<(), TransactionError> {
        validate_common(
            &self.portfolio_id,
            &self.symbol,
            &self.currency,
            self.kind,
            self.category,
            self.quantity,
            self.unit_price,
            self.fee.unwrap_or(Decimal::ZERO),
        )
    }

    /// Materializes a `Transaction` with a fresh id. The ledger store assigns
    /// the creation sequence; callers pass a provisional one for candidate
    /// replays.
    pub fn into_transaction(self, sequence: i64) -> Transaction {
        Transaction {
            id: Uuid::new_v4().to_string(),
            portfolio_id: self.portfolio_id,
            category: self.category,
            symbol: self.symbol,
            asset_name: self.asset_name,
            kind: self.kind,
            quantity: self.quantity,
            unit_price: self.unit_price,
            fee: self.fee.unwrap_or(Decimal::ZERO),
            currency: self.currency,
            executed_at: self.executed_at,
            note: self.note,
            sequence,
            created_at: Utc::now(),
        }
    }
}

/// Input model for updating an existing transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    pub id: String,
    pub category: AssetCategory,
    pub symbol: String,
    pub asset_name: Option<String>,
    pub kind: TransactionType,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    #[serde(default)]
    pub fee: Option<Decimal>,
    pub currency: String,
    pub executed_at: DateTime<Utc>,
    pub note: Option<String>,
}

impl TransactionUpdate {
    pub fn validate(&self) -> Result<(), TransactionError> {
        if self.id.trim().is_empty() {
            return Err(TransactionError::InvalidData(
                "Transaction ID is required for updates".to_string(),
            ));
        }
        validate_common(
            // Portfolio id comes from the stored record; a placeholder keeps
            // the shared checks uniform.
            "-",
            &self.symbol,
            &self.currency,
            self.kind,
            self.category,
            self.quantity,
            self.unit_price,
            self.fee.unwrap_or(Decimal::ZERO),
        )
    }

    /// Applies the update onto the stored record, preserving identity,
    /// sequence, and audit fields.
    pub fn apply_to(&self, existing: &Transaction) -> Transaction {
        Transaction {
            id: existing.id.clone(),
            portfolio_id: existing.portfolio_id.clone(),
            category: self.category,
            symbol: self.symbol.clone(),
            asset_name: self.asset_name.clone(),
            kind: self.kind,
            quantity: self.quantity,
            unit_price: self.unit_price,
            fee: self.fee.unwrap_or(Decimal::ZERO),
            currency: self.currency.clone(),
            executed_at: self.executed_at,
            note: self.note.clone(),
            sequence: existing.sequence,
            created_at: existing.created_at,
        }
    }
}

/// One page of a transaction listing, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
    pub items: Vec<Transaction>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}
