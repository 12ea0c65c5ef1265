//! FX (Foreign Exchange) module - currency normalization against the
//! portfolio base currency.

mod fx_errors;
mod fx_model;
mod fx_service;
mod fx_traits;


pub use fx_errors::FxError;
pub use fx_model::{Converted, ExchangeRateSnapshot, HistoricalRateFallback};
pub use fx_service::CurrencyNormalizer;
pub use fx_traits::{CurrencyNormalizerTrait, FxRateProviderTrait};
