//! Valuation view models. Everything here is ephemeral: computed on read
//! from derived positions plus live price/FX data, never stored as truth.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::transactions::AssetCategory;

/// Per-position valuation detail. Native-currency figures for display,
/// base-currency figures for cross-currency rollups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionDetail {
    pub symbol: String,
    pub asset_name: Option<String>,
    pub category: AssetCategory,
    pub quantity: Decimal,
    pub avg_cost: Decimal,
    pub current_price: Decimal,
    pub total_value: Decimal,
    pub total_cost: Decimal,
    pub unrealized_pnl: Decimal,
    pub unrealized_pnl_pct: Decimal,
    pub total_value_base: Decimal,
    pub unrealized_pnl_base: Decimal,
    pub currency: String,
    /// True when no live price was available and a cached quote or the
    /// average cost was substituted.
    pub price_stale: bool,
}

/// Portfolio-level valuation summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub portfolio_id: String,
    pub base_currency: String,
    pub total_assets: Decimal,
    pub total_liabilities: Decimal,
    pub net_worth: Decimal,
    pub total_unrealized_pnl: Decimal,
    pub total_realized_pnl: Decimal,
    pub positions: Vec<PositionDetail>,
    /// Set when any position was valued without a fresh live price; the
    /// summary is served in a degraded mode rather than failing.
    pub has_stale_prices: bool,
    /// Set when any cross-currency amount could not be converted and the
    /// unconverted native figure was summed instead; base-currency totals
    /// are approximate, never silently exact.
    pub has_stale_rates: bool,
    pub as_of: DateTime<Utc>,
}

/// One slice of the allocation chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationItem {
    pub category: AssetCategory,
    pub value: Decimal,
    pub percentage: Decimal,
    pub color: String,
}

/// Allocation of total assets across categories, in base currency.
/// Liabilities are excluded from the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResponse {
    pub portfolio_id: String,
    pub base_currency: String,
    pub total_value: Decimal,
    pub allocations: Vec<AllocationItem>,
}

/// One point of the net-worth trend, in base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetWorthHistoryPoint {
    pub date: NaiveDate,
    pub net_worth: Decimal,
    /// True when the value is carried forward from an earlier day or was
    /// computed with a fallback FX rate or stale price.
    pub approximate: bool,
}

/// Persisted end-of-day net-worth snapshot (external repository).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetWorthSnapshot {
    pub portfolio_id: String,
    pub date: NaiveDate,
    pub total_assets: Decimal,
    pub total_liabilities: Decimal,
    pub net_worth: Decimal,
    pub approximate: bool,
}
