use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One observation of an FX rate against the portfolio's base currency.
///
/// Convention, fixed once for the whole engine: `rate` expresses how many
/// units of the base currency one unit of `currency` is worth
/// (1 `currency` = `rate` base units). Converting to base multiplies,
/// converting from base divides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateSnapshot {
    /// Quote currency (e.g. "USD" when the base is "TWD").
    pub currency: String,
    pub rate: Decimal,
    pub as_of: DateTime<Utc>,
}

/// Result of a currency conversion.
///
/// `approximate` is set when the requested as-of rate was unavailable and a
/// latest-known rate was substituted. Approximations are always flagged,
/// never presented as exact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Converted {
    pub amount: Decimal,
    pub approximate: bool,
}

impl Converted {
    pub fn exact(amount: Decimal) -> Self {
        Self {
            amount,
            approximate: false,
        }
    }

    pub fn approximate(amount: Decimal) -> Self {
        Self {
            amount,
            approximate: true,
        }
    }
}

/// Strategy for historical conversions when no as-of rate exists for the
/// requested date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoricalRateFallback {
    /// Fail the conversion, producing a gap in history.
    Strict,
    /// Use the latest known rate and flag the result as approximate.
    #[default]
    LatestKnown,
}
