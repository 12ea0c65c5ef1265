use async_trait::async_trait;

use super::market_data_model::Quote;
use crate::errors::Result;
use crate::transactions::AssetCategory;

/// Market Data Provider collaborator.
///
/// The only potentially slow or failing call on the valuation path; callers
/// wrap it in a timeout and fall back to cached quotes. A failure here
/// degrades summary freshness, it never corrupts derived state.
#[async_trait]
pub trait MarketDataProviderTrait: Send + Sync {
    async fn get_price(&self, symbol: &str, category: AssetCategory) -> Result<Quote>;
}
