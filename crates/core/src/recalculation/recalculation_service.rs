//! Recalculation orchestrator: drives full-history replays and owns the
//! per-portfolio freshness registry.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use log::{debug, warn};
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;

use super::recalculation_model::{DerivedState, FreshnessState, RecalculationOutcome};
use super::recalculation_traits::{FreshnessTrackerTrait, RecalculationServiceTrait};
use crate::errors::{Error, Result};
use crate::holdings::CostBasisCalculator;
use crate::transactions::TransactionRepositoryTrait;

/// Registry entry for one portfolio.
struct PortfolioEntry {
    /// Single-flight discipline: at most one replay per portfolio at a time.
    /// Waiters attach to the in-flight replay by awaiting this lock.
    replay_lock: Mutex<()>,
    freshness: RwLock<FreshnessState>,
    /// Published derived state. Swapped wholesale under the replay lock so
    /// readers never observe a partially rebuilt set.
    derived: RwLock<Option<Arc<DerivedState>>>,
}

impl PortfolioEntry {
    fn new() -> Self {
        Self {
            replay_lock: Mutex::new(()),
            freshness: RwLock::new(FreshnessState::Dirty),
            derived: RwLock::new(None),
        }
    }
}

/// Manages per-portfolio freshness state and serializes replays.
///
/// Replays for distinct portfolios are independent and run concurrently;
/// the replay itself is a synchronous CPU-bound fold with no suspension
/// points, so holding the entry lock across it is cheap.
pub struct RecalculationOrchestrator {
    ledger: Arc<dyn TransactionRepositoryTrait>,
    registry: DashMap<String, Arc<PortfolioEntry>>,
}

impl RecalculationOrchestrator {
    pub fn new(ledger: Arc<dyn TransactionRepositoryTrait>) -> Self {
        Self {
            ledger,
            registry: DashMap::new(),
        }
    }

    fn entry(&self, portfolio_id: &str) -> Arc<PortfolioEntry> {
        self.registry
            .entry(portfolio_id.to_string())
            .or_insert_with(|| Arc::new(PortfolioEntry::new()))
            .clone()
    }

    fn lock_poisoned(e: impl std::fmt::Display) -> Error {
        Error::Unexpected(format!("freshness lock poisoned: {}", e))
    }

    /// Runs the replay for one portfolio. Must be called with the entry's
    /// replay lock held.
    async fn run_replay(
        &self,
        portfolio_id: &str,
        entry: &PortfolioEntry,
    ) -> Result<Arc<DerivedState>> {
        *entry.freshness.write().map_err(Self::lock_poisoned)? = FreshnessState::Recalculating;

        let transactions = match self.ledger.list_transactions(portfolio_id).await {
            Ok(transactions) => transactions,
            Err(e) => {
                // Ledger unavailability is fatal to the operation; the
                // portfolio stays Dirty for the next trigger.
                if let Ok(mut freshness) = entry.freshness.write() {
                    *freshness = FreshnessState::Dirty;
                }
                return Err(e);
            }
        };

        let replay = match CostBasisCalculator::replay(&transactions) {
            Ok(replay) => replay,
            Err(e) => {
                warn!("Replay failed for portfolio {}: {}", portfolio_id, e);
                if let Ok(mut freshness) = entry.freshness.write() {
                    *freshness = FreshnessState::Dirty;
                }
                return Err(e.into());
            }
        };

        let state = Arc::new(DerivedState {
            portfolio_id: portfolio_id.to_string(),
            transaction_count: transactions.len(),
            replay,
            computed_at: Utc::now(),
        });

        *entry.derived.write().map_err(Self::lock_poisoned)? = Some(state.clone());

        // A mutation that raced in during the replay moved us to Dirty;
        // honor it so the next read replays again.
        let mut freshness = entry.freshness.write().map_err(Self::lock_poisoned)?;
        if *freshness == FreshnessState::Recalculating {
            *freshness = FreshnessState::Clean;
        }

        debug!(
            "Replayed {} transactions into {} positions for portfolio {}",
            state.transaction_count,
            state.replay.positions.len(),
            portfolio_id
        );
        Ok(state)
    }
}

impl FreshnessTrackerTrait for RecalculationOrchestrator {
    fn mark_dirty(&self, portfolio_id: &str) {
        let entry = self.entry(portfolio_id);
        match entry.freshness.write() {
            Ok(mut freshness) => {
                *freshness = FreshnessState::Dirty;
                debug!("Portfolio {} marked dirty", portfolio_id);
            }
            Err(e) => warn!(
                "Failed to mark portfolio {} dirty, lock poisoned: {}",
                portfolio_id, e
            ),
        };
    }

    fn track(&self, portfolio_id: &str) {
        self.entry(portfolio_id);
    }

    fn untrack(&self, portfolio_id: &str) {
        self.registry.remove(portfolio_id);
    }

    fn freshness(&self, portfolio_id: &str) -> FreshnessState {
        match self.registry.get(portfolio_id) {
            // A poisoned lock reads as Dirty so the next trigger replays.
            Some(entry) => entry
                .freshness
                .read()
                .map(|guard| *guard)
                .unwrap_or(FreshnessState::Dirty),
            None => FreshnessState::Dirty,
        }
    }
}

#[async_trait]
impl RecalculationServiceTrait for RecalculationOrchestrator {
    async fn recalculate(&self, portfolio_id: &str) -> Result<RecalculationOutcome> {
        let entry = self.entry(portfolio_id);
        let _guard = entry.replay_lock.lock().await;

        // A waiter that queued behind an in-flight replay sees Clean here
        // and returns the freshly published state without replaying again.
        let is_clean = *entry.freshness.read().map_err(Self::lock_poisoned)?
            == FreshnessState::Clean;
        let cached = if is_clean {
            entry.derived.read().map_err(Self::lock_poisoned)?.clone()
        } else {
            None
        };
        if let Some(cached) = cached {
            return Ok(RecalculationOutcome {
                status: FreshnessState::Clean,
                affected_count: cached.replay.positions.len(),
                replayed: false,
            });
        }

        let state = self.run_replay(portfolio_id, &entry).await?;
        let status = *entry.freshness.read().map_err(Self::lock_poisoned)?;
        Ok(RecalculationOutcome {
            status,
            affected_count: state.replay.positions.len(),
            replayed: true,
        })
    }

    async fn derived_state(&self, portfolio_id: &str) -> Result<Arc<DerivedState>> {
        let entry = self.entry(portfolio_id);

        // Fast path: serve the cached result for a Clean portfolio.
        if *entry.freshness.read().map_err(Self::lock_poisoned)? == FreshnessState::Clean {
            if let Some(state) = entry.derived.read().map_err(Self::lock_poisoned)?.clone() {
                return Ok(state);
            }
        }

        let _guard = entry.replay_lock.lock().await;
        let clean_now =
            *entry.freshness.read().map_err(Self::lock_poisoned)? == FreshnessState::Clean;
        if clean_now {
            if let Some(state) = entry.derived.read().map_err(Self::lock_poisoned)?.clone() {
                return Ok(state);
            }
        }
        self.run_replay(portfolio_id, &entry).await
    }
}
