use thiserror::Error;

/// Errors raised by transaction validation and the mutation service.
#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("Invalid transaction data: {0}")]
    InvalidData(String),

    #[error("Transaction not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
