use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::recalculation_model::FreshnessState;
use super::recalculation_service::RecalculationOrchestrator;
use super::recalculation_traits::{FreshnessTrackerTrait, RecalculationServiceTrait};
use crate::errors::{Error, Result};
use crate::transactions::{
    AssetCategory, Transaction, TransactionRepositoryTrait, TransactionType,
};

/// Ledger stub with a failure switch and a call counter, so tests can observe
/// how many replays actually hit the store.
struct ScriptedLedger {
    rows: Mutex<Vec<Transaction>>,
    fail: AtomicBool,
    list_calls: AtomicUsize,
}

impl ScriptedLedger {
    fn with_rows(rows: Vec<Transaction>) -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(rows),
            fail: AtomicBool::new(false),
            list_calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TransactionRepositoryTrait for ScriptedLedger {
    async fn list_transactions(&self, portfolio_id: &str) -> Result<Vec<Transaction>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Repository("ledger unavailable".to_string()));
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.portfolio_id == portfolio_id)
            .cloned()
            .collect())
    }

    async fn get(&self, _transaction_id: &str) -> Result<Transaction> {
        Err(Error::Unexpected("not used in these tests".to_string()))
    }

    async fn insert(&self, _transaction: Transaction) -> Result<Transaction> {
        Err(Error::Unexpected("not used in these tests".to_string()))
    }

    async fn update(&self, _transaction: Transaction) -> Result<Transaction> {
        Err(Error::Unexpected("not used in these tests".to_string()))
    }

    async fn delete(&self, _transaction_id: &str) -> Result<Transaction> {
        Err(Error::Unexpected("not used in these tests".to_string()))
    }
}

fn tx(sequence: i64, kind: TransactionType, quantity: Decimal) -> Transaction {
    let at = Utc
        .with_ymd_and_hms(2024, 1, sequence as u32, 12, 0, 0)
        .unwrap();
    Transaction {
        id: format!("tx-{}", sequence),
        portfolio_id: "pf-1".to_string(),
        category: AssetCategory::UsStock,
        symbol: "AAPL".to_string(),
        asset_name: None,
        kind,
        quantity,
        unit_price: dec!(100),
        fee: Decimal::ZERO,
        currency: "USD".to_string(),
        executed_at: at,
        note: None,
        sequence,
        created_at: at,
    }
}

#[tokio::test]
async fn test_unknown_portfolio_starts_dirty() {
    let ledger = ScriptedLedger::with_rows(vec![]);
    let orchestrator = RecalculationOrchestrator::new(ledger);
    assert_eq!(orchestrator.freshness("pf-1"), FreshnessState::Dirty);
}

#[tokio::test]
async fn test_recalculate_moves_dirty_to_clean() {
    let ledger = ScriptedLedger::with_rows(vec![tx(1, TransactionType::Buy, dec!(10))]);
    let orchestrator = RecalculationOrchestrator::new(ledger);

    let outcome = orchestrator.recalculate("pf-1").await.unwrap();
    assert_eq!(outcome.status, FreshnessState::Clean);
    assert_eq!(outcome.affected_count, 1);
    assert!(outcome.replayed);
    assert_eq!(orchestrator.freshness("pf-1"), FreshnessState::Clean);
}

#[tokio::test]
async fn test_recalculate_on_clean_portfolio_is_a_noop() {
    let ledger = ScriptedLedger::with_rows(vec![tx(1, TransactionType::Buy, dec!(10))]);
    let orchestrator = RecalculationOrchestrator::new(ledger.clone());

    orchestrator.recalculate("pf-1").await.unwrap();
    let second = orchestrator.recalculate("pf-1").await.unwrap();

    assert!(!second.replayed);
    assert_eq!(second.affected_count, 1);
    assert_eq!(ledger.list_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_mark_dirty_forces_next_replay() {
    let ledger = ScriptedLedger::with_rows(vec![tx(1, TransactionType::Buy, dec!(10))]);
    let orchestrator = RecalculationOrchestrator::new(ledger.clone());

    orchestrator.recalculate("pf-1").await.unwrap();
    orchestrator.mark_dirty("pf-1");
    assert_eq!(orchestrator.freshness("pf-1"), FreshnessState::Dirty);

    let outcome = orchestrator.recalculate("pf-1").await.unwrap();
    assert!(outcome.replayed);
    assert_eq!(ledger.list_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_derived_state_serves_cache_when_clean() {
    let ledger = ScriptedLedger::with_rows(vec![
        tx(1, TransactionType::Buy, dec!(10)),
        tx(2, TransactionType::Sell, dec!(4)),
    ]);
    let orchestrator = RecalculationOrchestrator::new(ledger.clone());

    let first = orchestrator.derived_state("pf-1").await.unwrap();
    assert_eq!(first.transaction_count, 2);
    assert_eq!(first.replay.positions["AAPL"].quantity, dec!(6));

    let second = orchestrator.derived_state("pf-1").await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(ledger.list_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_triggers_coalesce_into_one_replay() {
    let ledger = ScriptedLedger::with_rows(vec![tx(1, TransactionType::Buy, dec!(10))]);
    let orchestrator = Arc::new(RecalculationOrchestrator::new(ledger.clone()));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let orchestrator = orchestrator.clone();
        handles.push(tokio::spawn(
            async move { orchestrator.recalculate("pf-1").await },
        ));
    }

    let mut replayed = 0;
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert_eq!(outcome.status, FreshnessState::Clean);
        if outcome.replayed {
            replayed += 1;
        }
    }

    assert_eq!(replayed, 1);
    assert_eq!(ledger.list_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_ledger_failure_leaves_portfolio_dirty() {
    let ledger = ScriptedLedger::with_rows(vec![tx(1, TransactionType::Buy, dec!(10))]);
    ledger.fail.store(true, Ordering::SeqCst);
    let orchestrator = RecalculationOrchestrator::new(ledger.clone());

    let err = orchestrator.recalculate("pf-1").await.unwrap_err();
    assert!(matches!(err, Error::Repository(_)));
    assert_eq!(orchestrator.freshness("pf-1"), FreshnessState::Dirty);

    // A later trigger succeeds once the ledger recovers.
    ledger.fail.store(false, Ordering::SeqCst);
    let outcome = orchestrator.recalculate("pf-1").await.unwrap();
    assert!(outcome.replayed);
}

#[tokio::test]
async fn test_unreplayable_history_leaves_portfolio_dirty() {
    // A stored log that oversells cannot be replayed; the portfolio must not
    // pretend to be Clean.
    let ledger = ScriptedLedger::with_rows(vec![tx(1, TransactionType::Sell, dec!(5))]);
    let orchestrator = RecalculationOrchestrator::new(ledger);

    let err = orchestrator.recalculate("pf-1").await.unwrap_err();
    assert!(matches!(err, Error::Calculation(_)));
    assert_eq!(orchestrator.freshness("pf-1"), FreshnessState::Dirty);
}

#[tokio::test]
async fn test_untrack_drops_cached_state() {
    let ledger = ScriptedLedger::with_rows(vec![tx(1, TransactionType::Buy, dec!(10))]);
    let orchestrator = RecalculationOrchestrator::new(ledger.clone());

    orchestrator.recalculate("pf-1").await.unwrap();
    orchestrator.untrack("pf-1");
    assert_eq!(orchestrator.freshness("pf-1"), FreshnessState::Dirty);

    orchestrator.derived_state("pf-1").await.unwrap();
    assert_eq!(ledger.list_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_portfolios_are_isolated() {
    let mut other = tx(1, TransactionType::Buy, dec!(3));
    other.portfolio_id = "pf-2".to_string();
    let ledger = ScriptedLedger::with_rows(vec![tx(1, TransactionType::Buy, dec!(10)), other]);
    let orchestrator = RecalculationOrchestrator::new(ledger);

    orchestrator.recalculate("pf-1").await.unwrap();
    assert_eq!(orchestrator.freshness("pf-1"), FreshnessState::Clean);
    assert_eq!(orchestrator.freshness("pf-2"), FreshnessState::Dirty);

    orchestrator.mark_dirty("pf-2");
    assert_eq!(orchestrator.freshness("pf-1"), FreshnessState::Clean);
}
