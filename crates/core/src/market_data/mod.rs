//! Market data module - live price collaborator contract.

mod market_data_errors;
mod market_data_model;
mod market_data_traits;

pub use market_data_errors::MarketDataError;
pub use market_data_model::Quote;
pub use market_data_traits::MarketDataProviderTrait;
