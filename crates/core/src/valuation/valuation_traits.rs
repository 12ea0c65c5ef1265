use async_trait::async_trait;
use chrono::NaiveDate;

use super::valuation_model::{
    AllocationResponse, NetWorthHistoryPoint, NetWorthSnapshot, PortfolioSummary,
};
use crate::errors::Result;

/// Read surface of the valuation engine.
#[async_trait]
pub trait ValuationServiceTrait: Send + Sync {
    async fn get_summary(&self, portfolio_id: &str) -> Result<PortfolioSummary>;
    async fn get_allocations(&self, portfolio_id: &str) -> Result<AllocationResponse>;
    async fn get_history(
        &self,
        portfolio_id: &str,
        days: i64,
    ) -> Result<Vec<NetWorthHistoryPoint>>;
    /// Computes and upserts today's net-worth snapshot (scheduler entry
    /// point).
    async fn save_daily_snapshot(&self, portfolio_id: &str) -> Result<NetWorthSnapshot>;
}

/// External store for daily net-worth snapshots. Snapshots are a cache:
/// always reconstructable by replay plus historical rates, never
/// authoritative on their own.
#[async_trait]
pub trait NetWorthHistoryRepositoryTrait: Send + Sync {
    /// Returns snapshots on or after `from`, ascending by date.
    async fn list_since(&self, portfolio_id: &str, from: NaiveDate)
        -> Result<Vec<NetWorthSnapshot>>;

    /// Inserts or replaces the snapshot for its (portfolio, date) key.
    async fn upsert(&self, snapshot: NetWorthSnapshot) -> Result<()>;
}
