//! Engine configuration.

use std::time::Duration;

use crate::constants::{DEFAULT_BASE_CURRENCY, DEFAULT_EXTERNAL_FETCH_TIMEOUT_MS};
use crate::fx::HistoricalRateFallback;

/// Runtime configuration for the valuation engine.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// The portfolio's reporting currency; all cross-currency totals are
    /// normalized into it.
    pub base_currency: String,
    /// Upper bound for any single external price/FX fetch.
    pub external_fetch_timeout: Duration,
    /// Strategy for historical FX conversions without an as-of rate.
    pub historical_rate_fallback: HistoricalRateFallback,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            base_currency: DEFAULT_BASE_CURRENCY.to_string(),
            external_fetch_timeout: Duration::from_millis(DEFAULT_EXTERNAL_FETCH_TIMEOUT_MS),
            historical_rate_fallback: HistoricalRateFallback::default(),
        }
    }
}

impl EngineSettings {
    pub fn with_base_currency(base_currency: impl Into<String>) -> Self {
        Self {
            base_currency: base_currency.into(),
            ..Self::default()
        }
    }
}
