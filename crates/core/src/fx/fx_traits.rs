use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

use super::fx_model::{Converted, ExchangeRateSnapshot};
use crate::errors::Result;

/// FX Rate Provider collaborator. May be slow or unavailable; the normalizer
/// wraps every call in a timeout and degrades to cached snapshots.
#[async_trait]
pub trait FxRateProviderTrait: Send + Sync {
    /// Returns the latest rates against `base_currency`, keyed by quote
    /// currency, in the engine-wide convention
    /// (1 quote unit = rate base units).
    async fn get_rates(&self, base_currency: &str) -> Result<HashMap<String, Decimal>>;
}

/// Currency normalization surface used by valuation and history.
///
/// Conversion methods are synchronous and cache-backed; only `refresh` talks
/// to the provider.
#[async_trait]
pub trait CurrencyNormalizerTrait: Send + Sync {
    fn base_currency(&self) -> &str;

    /// Converts an amount into the base currency using the latest snapshot.
    fn to_base(&self, amount: Decimal, currency: &str) -> Result<Decimal>;

    /// Converts a base-currency amount into a foreign currency.
    fn from_base(&self, amount: Decimal, currency: &str) -> Result<Decimal>;

    /// Converts an amount into the base currency as of a given date. When no
    /// as-of rate is known, behavior follows the configured
    /// `HistoricalRateFallback`; a substituted latest rate is flagged
    /// approximate.
    fn to_base_for_date(&self, amount: Decimal, currency: &str, date: NaiveDate)
        -> Result<Converted>;

    /// Records an externally observed rate snapshot into the cache.
    fn record_snapshot(&self, snapshot: ExchangeRateSnapshot);

    /// Pulls fresh rates from the provider. A timeout or provider failure
    /// keeps the cached snapshots and is reported as an error the caller may
    /// treat as a freshness degradation.
    async fn refresh(&self) -> Result<()>;
}
