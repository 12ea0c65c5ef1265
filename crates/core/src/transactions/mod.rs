//! Transactions module - domain models, validation, and the ledger write path.

mod transactions_errors;
mod transactions_model;
mod transactions_service;
mod transactions_traits;

#[cfg(test)]
mod transactions_model_tests;


pub use transactions_errors::TransactionError;
pub use transactions_model::{
    AssetCategory, NewTransaction, Transaction, TransactionPage, TransactionType,
    TransactionUpdate,
};
pub use transactions_service::TransactionService;
pub use transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};
