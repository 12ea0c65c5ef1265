use async_trait::async_trait;
use std::sync::Arc;

use super::recalculation_model::{DerivedState, FreshnessState, RecalculationOutcome};
use crate::errors::Result;

/// Freshness registry surface exposed to the transaction write path.
///
/// The registry is owned by the orchestrator and tied to portfolio lifecycle
/// through `track`/`untrack`; it is not process-global state.
pub trait FreshnessTrackerTrait: Send + Sync {
    /// Invalidates all derived state for a portfolio. Called on every
    /// accepted create/update/delete.
    fn mark_dirty(&self, portfolio_id: &str);

    /// Registers a portfolio with the freshness registry.
    fn track(&self, portfolio_id: &str);

    /// Removes a portfolio and its cached derived state.
    fn untrack(&self, portfolio_id: &str);

    fn freshness(&self, portfolio_id: &str) -> FreshnessState;
}

/// Replay orchestration surface exposed to readers.
#[async_trait]
pub trait RecalculationServiceTrait: FreshnessTrackerTrait {
    /// Explicit full-rebuild trigger. Idempotent when the portfolio is
    /// already Clean; concurrent triggers for the same portfolio coalesce
    /// into a single in-flight replay.
    async fn recalculate(&self, portfolio_id: &str) -> Result<RecalculationOutcome>;

    /// Returns the current derived state, replaying first if the portfolio
    /// is Dirty. Callers arriving during an in-flight replay attach to it
    /// rather than starting a duplicate.
    async fn derived_state(&self, portfolio_id: &str) -> Result<Arc<DerivedState>>;
}
