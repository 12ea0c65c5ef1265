//! Foliotrack Core - Domain entities, services, and traits.
//!
//! This crate contains the ledger-replay and valuation logic for
//! Foliotrack. It is storage-agnostic: persistence and external data
//! providers are defined as traits and implemented by adapter crates.

pub mod constants;
pub mod errors;
pub mod fx;
pub mod holdings;
pub mod market_data;
pub mod recalculation;
pub mod settings;
pub mod transactions;
pub mod valuation;

// Re-export common types from the transaction and holdings modules
pub use holdings::*;
pub use transactions::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
