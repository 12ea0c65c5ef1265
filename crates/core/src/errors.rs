//! Core error types for the valuation engine.
//!
//! This module defines storage-agnostic error types. Repository-specific
//! errors are converted to these types by the adapter that implements the
//! repository traits.

use thiserror::Error;

use crate::fx::FxError;
use crate::holdings::CalculatorError;
use crate::market_data::MarketDataError;
use crate::transactions::TransactionError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the engine.
///
/// Domain-specific errors are wrapped via `#[from]`; repository errors are
/// carried in string form to keep this type storage-agnostic.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),

    #[error("Cost-basis calculation failed: {0}")]
    Calculation(#[from] CalculatorError),

    #[error("Fx error: {0}")]
    Fx(#[from] FxError),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Unexpected(err.to_string())
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
