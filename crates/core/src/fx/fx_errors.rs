use thiserror::Error;

/// Errors raised by currency normalization.
#[derive(Error, Debug)]
pub enum FxError {
    #[error("Exchange rate not found: {0}")]
    RateNotFound(String),

    #[error("Invalid currency code: {0}")]
    InvalidCurrencyCode(String),

    #[error("Invalid exchange rate: {0}")]
    InvalidRate(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("FX provider timed out: {0}")]
    ProviderTimeout(String),

    #[error("FX provider error: {0}")]
    ProviderError(String),
}
