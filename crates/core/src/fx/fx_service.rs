//! Currency normalizer backed by cached FX rate snapshots.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::warn;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use super::fx_errors::FxError;
use super::fx_model::{Converted, ExchangeRateSnapshot, HistoricalRateFallback};
use super::fx_traits::{CurrencyNormalizerTrait, FxRateProviderTrait};
use crate::errors::Result;

/// Converts currency-denominated amounts into the portfolio's base currency.
///
/// Holds the latest snapshot per quote currency plus every dated rate it has
/// observed. A slow or failed provider never blocks conversion: the cache
/// keeps serving and staleness is the caller's signal to degrade.
pub struct CurrencyNormalizer {
    base_currency: String,
    provider: Arc<dyn FxRateProviderTrait>,
    fallback: HistoricalRateFallback,
    fetch_timeout: Duration,
    latest: RwLock<HashMap<String, ExchangeRateSnapshot>>,
    dated: RwLock<HashMap<(String, NaiveDate), Decimal>>,
}

impl CurrencyNormalizer {
    pub fn new(
        base_currency: impl Into<String>,
        provider: Arc<dyn FxRateProviderTrait>,
        fallback: HistoricalRateFallback,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            base_currency: base_currency.into(),
            provider,
            fallback,
            fetch_timeout,
            latest: RwLock::new(HashMap::new()),
            dated: RwLock::new(HashMap::new()),
        }
    }

    fn validate_currency(currency: &str) -> Result<()> {
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(FxError::InvalidCurrencyCode(currency.to_string()).into());
        }
        Ok(())
    }

    fn latest_rate(&self, currency: &str) -> Result<Decimal> {
        let latest = self
            .latest
            .read()
            .map_err(|e| FxError::CacheError(e.to_string()))?;
        latest
            .get(currency)
            .map(|s| s.rate)
            .ok_or_else(|| {
                FxError::RateNotFound(format!("{}/{}", currency, self.base_currency)).into()
            })
    }

    fn store(&self, snapshot: ExchangeRateSnapshot) -> Result<()> {
        if snapshot.rate <= Decimal::ZERO {
            warn!(
                "Discarding non-positive FX rate {} for {}/{}",
                snapshot.rate, snapshot.currency, self.base_currency
            );
            return Ok(());
        }

        self.dated
            .write()
            .map_err(|e| FxError::CacheError(e.to_string()))?
            .insert(
                (snapshot.currency.clone(), snapshot.as_of.date_naive()),
                snapshot.rate,
            );

        let mut latest = self
            .latest
            .write()
            .map_err(|e| FxError::CacheError(e.to_string()))?;
        match latest.get(&snapshot.currency) {
            Some(existing) if existing.as_of > snapshot.as_of => {}
            _ => {
                latest.insert(snapshot.currency.clone(), snapshot);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CurrencyNormalizerTrait for CurrencyNormalizer {
    fn base_currency(&self) -> &str {
        &self.base_currency
    }

    fn to_base(&self, amount: Decimal, currency: &str) -> Result<Decimal> {
        Self::validate_currency(currency)?;
        if currency == self.base_currency {
            return Ok(amount);
        }
        Ok(amount * self.latest_rate(currency)?)
    }

    fn from_base(&self, amount: Decimal, currency: &str) -> Result<Decimal> {
        Self::validate_currency(currency)?;
        if currency == self.base_currency {
            return Ok(amount);
        }
        let rate = self.latest_rate(currency)?;
        if rate.is_zero() {
            return Err(FxError::InvalidRate(format!(
                "Zero rate for {}/{}",
                currency, self.base_currency
            ))
            .into());
        }
        Ok(amount / rate)
    }

    fn to_base_for_date(
        &self,
        amount: Decimal,
        currency: &str,
        date: NaiveDate,
    ) -> Result<Converted> {
        Self::validate_currency(currency)?;
        if currency == self.base_currency {
            return Ok(Converted::exact(amount));
        }

        {
            let dated = self
                .dated
                .read()
                .map_err(|e| FxError::CacheError(e.to_string()))?;
            if let Some(rate) = dated.get(&(currency.to_string(), date)) {
                return Ok(Converted::exact(amount * rate));
            }
        }

        match self.fallback {
            HistoricalRateFallback::Strict => Err(FxError::RateNotFound(format!(
                "No {}/{} rate for {}",
                currency, self.base_currency, date
            ))
            .into()),
            HistoricalRateFallback::LatestKnown => {
                let rate = self.latest_rate(currency)?;
                warn!(
                    "No {}/{} rate for {}. Using latest known rate as a flagged approximation",
                    currency, self.base_currency, date
                );
                Ok(Converted::approximate(amount * rate))
            }
        }
    }

    fn record_snapshot(&self, snapshot: ExchangeRateSnapshot) {
        if let Err(e) = self.store(snapshot) {
            warn!("Failed to record FX snapshot: {}", e);
        }
    }

    async fn refresh(&self) -> Result<()> {
        let fetch = self.provider.get_rates(&self.base_currency);
        let rates = match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Ok(Ok(rates)) => rates,
            Ok(Err(e)) => {
                warn!("FX provider failed, keeping cached rates: {}", e);
                return Err(FxError::ProviderError(e.to_string()).into());
            }
            Err(_) => {
                warn!(
                    "FX provider timed out after {:?}, keeping cached rates",
                    self.fetch_timeout
                );
                return Err(FxError::ProviderTimeout(format!(
                    "get_rates({}) exceeded {:?}",
                    self.base_currency, self.fetch_timeout
                ))
                .into());
            }
        };

        let as_of = Utc::now();
        for (currency, rate) in rates {
            self.store(ExchangeRateSnapshot {
                currency,
                rate,
                as_of,
            })?;
        }
        Ok(())
    }
}
