//! Transaction mutation service: the only write path into the ledger.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::transactions_model::{NewTransaction, Transaction, TransactionPage, TransactionUpdate};
use super::transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};
use crate::constants::DEFAULT_PAGE_SIZE;
use crate::errors::Result;
use crate::holdings::CostBasisCalculator;
use crate::recalculation::FreshnessTrackerTrait;

/// Validates mutations, guards the ledger against unreplayable histories,
/// and marks the owning portfolio dirty on every accepted change.
pub struct TransactionService {
    repository: Arc<dyn TransactionRepositoryTrait>,
    freshness: Arc<dyn FreshnessTrackerTrait>,
}

impl TransactionService {
    pub fn new(
        repository: Arc<dyn TransactionRepositoryTrait>,
        freshness: Arc<dyn FreshnessTrackerTrait>,
    ) -> Self {
        Self {
            repository,
            freshness,
        }
    }

    /// Replays the candidate history through the pure projector. A mutation
    /// that would leave the log unreplayable anywhere downstream (e.g. a
    /// sell exceeding held quantity, or deleting the buy it depended on) is
    /// rejected here instead of poisoning the ledger.
    fn check_replayable(candidate_history: &[Transaction]) -> Result<()> {
        CostBasisCalculator::replay(candidate_history)?;
        Ok(())
    }
}

#[async_trait]
impl TransactionServiceTrait for TransactionService {
    async fn create_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        new_transaction.validate()?;

        let portfolio_id = new_transaction.portfolio_id.clone();
        let mut history = self.repository.list_transactions(&portfolio_id).await?;

        // Provisional sequence beyond every stored one; the store assigns the
        // real value on insert.
        let provisional_sequence = history.iter().map(|t| t.sequence).max().unwrap_or(0) + 1;
        let candidate = new_transaction.into_transaction(provisional_sequence);

        history.push(candidate.clone());
        Self::check_replayable(&history)?;

        let inserted = self.repository.insert(candidate).await?;
        debug!(
            "Accepted {} {} x{} for portfolio {}",
            inserted.kind, inserted.symbol, inserted.quantity, portfolio_id
        );

        self.freshness.mark_dirty(&portfolio_id);
        Ok(inserted)
    }

    async fn update_transaction(&self, update: TransactionUpdate) -> Result<Transaction> {
        update.validate()?;

        let existing = self.repository.get(&update.id).await?;
        let portfolio_id = existing.portfolio_id.clone();
        let updated = update.apply_to(&existing);

        let mut history = self.repository.list_transactions(&portfolio_id).await?;
        for slot in history.iter_mut() {
            if slot.id == updated.id {
                *slot = updated.clone();
            }
        }
        Self::check_replayable(&history)?;

        let saved = self.repository.update(updated).await?;
        self.freshness.mark_dirty(&portfolio_id);
        Ok(saved)
    }

    async fn delete_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        let existing = self.repository.get(transaction_id).await?;
        let portfolio_id = existing.portfolio_id.clone();

        let mut history = self.repository.list_transactions(&portfolio_id).await?;
        history.retain(|t| t.id != transaction_id);
        Self::check_replayable(&history)?;

        let deleted = self.repository.delete(transaction_id).await?;
        self.freshness.mark_dirty(&portfolio_id);
        Ok(deleted)
    }

    async fn get_transactions(
        &self,
        portfolio_id: &str,
        page: usize,
        page_size: usize,
    ) -> Result<TransactionPage> {
        let mut transactions = self.repository.list_transactions(portfolio_id).await?;
        transactions.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));

        let total = transactions.len();
        let page = page.max(1);
        let page_size = if page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };
        let start = (page - 1) * page_size;
        let items = transactions
            .into_iter()
            .skip(start)
            .take(page_size)
            .collect();

        Ok(TransactionPage {
            items,
            total,
            page,
            page_size,
        })
    }
}
