use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that occur during cost-basis replay.
#[derive(Error, Debug)]
pub enum CalculatorError {
    #[error(
        "Insufficient quantity for {symbol}: transaction {transaction_id} needs {requested}, held {held}"
    )]
    InsufficientQuantity {
        symbol: String,
        transaction_id: String,
        requested: Decimal,
        held: Decimal,
    },

    #[error("Invalid transaction data: {0}")]
    InvalidTransaction(String),
}
