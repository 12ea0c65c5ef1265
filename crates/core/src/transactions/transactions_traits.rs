use async_trait::async_trait;

use super::transactions_model::{NewTransaction, Transaction, TransactionPage, TransactionUpdate};
use crate::errors::Result;

/// Ledger Store contract. The transaction log behind this trait is the sole
/// source of truth; everything else in the engine is derived from it by
/// replay. Implementations assign the creation `sequence` on insert and must
/// return transactions in stable order.
#[async_trait]
pub trait TransactionRepositoryTrait: Send + Sync {
    /// Returns the complete transaction history for a portfolio.
    async fn list_transactions(&self, portfolio_id: &str) -> Result<Vec<Transaction>>;

    async fn get(&self, transaction_id: &str) -> Result<Transaction>;

    /// Persists a new transaction and returns it with its assigned sequence.
    async fn insert(&self, transaction: Transaction) -> Result<Transaction>;

    async fn update(&self, transaction: Transaction) -> Result<Transaction>;

    /// Deletes and returns the removed transaction.
    async fn delete(&self, transaction_id: &str) -> Result<Transaction>;
}

/// Mutation and query surface for the transaction log.
#[async_trait]
pub trait TransactionServiceTrait: Send + Sync {
    async fn create_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction>;
    async fn update_transaction(&self, update: TransactionUpdate) -> Result<Transaction>;
    async fn delete_transaction(&self, transaction_id: &str) -> Result<Transaction>;
    async fn get_transactions(
        &self,
        portfolio_id: &str,
        page: usize,
        page_size: usize,
    ) -> Result<TransactionPage>;
}
