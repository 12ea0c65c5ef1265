use thiserror::Error;

/// Errors raised by live price lookups.
#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("No price available for symbol: {0}")]
    PriceNotFound(String),

    #[error("Market data provider timed out: {0}")]
    ProviderTimeout(String),

    #[error("Market data provider error: {0}")]
    ProviderError(String),
}
