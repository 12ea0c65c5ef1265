//! Recalculation domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::holdings::LedgerReplay;

/// Per-portfolio freshness of derived state.
///
/// Lifecycle: `Clean -> Dirty -> Recalculating -> Clean`. Any accepted
/// transaction mutation moves the portfolio to `Dirty`; a replay trigger
/// moves it to `Recalculating`; completion atomically publishes the new
/// derived state and returns to `Clean`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FreshnessState {
    Clean,
    Dirty,
    Recalculating,
}

impl FreshnessState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FreshnessState::Clean => "CLEAN",
            FreshnessState::Dirty => "DIRTY",
            FreshnessState::Recalculating => "RECALCULATING",
        }
    }
}

impl std::fmt::Display for FreshnessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The replay result cached for a portfolio, swapped in wholesale so readers
/// never observe a partially rebuilt state.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedState {
    pub portfolio_id: String,
    pub replay: LedgerReplay,
    /// Number of transactions folded into this state.
    pub transaction_count: usize,
    pub computed_at: DateTime<Utc>,
}

/// Result of an explicit recalculation trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculationOutcome {
    pub status: FreshnessState,
    /// Number of derived positions in the (possibly cached) state.
    pub affected_count: usize,
    /// False when the trigger was an idempotent no-op on a Clean portfolio.
    pub replayed: bool,
}
