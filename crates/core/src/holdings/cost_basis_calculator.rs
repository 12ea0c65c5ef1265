//! Cost-basis projector: a pure fold over a portfolio's transaction history.
//!
//! Determinism contract: the projector is a pure function of its input list.
//! No clock reads, no I/O, no hidden state. Identical transaction sequences
//! always yield identical `LedgerReplay` results, which is what makes replay
//! safe to re-run after any edit or delete.

use rust_decimal::Decimal;

use super::holdings_errors::CalculatorError;
use super::holdings_model::{LedgerReplay, Position, RealizedPnlEvent, RealizedPnlKind};
use crate::constants::COST_BASIS_PRECISION;
use crate::transactions::{Transaction, TransactionType};

pub struct CostBasisCalculator;

impl CostBasisCalculator {
    /// Folds the given transactions into per-symbol positions and realized
    /// P&L events, starting from quantity=0, avg_cost=0.
    ///
    /// Input order does not matter: transactions are sorted by execution
    /// timestamp with ties broken by creation sequence before the fold.
    pub fn replay(transactions: &[Transaction]) -> Result<LedgerReplay, CalculatorError> {
        let mut ordered: Vec<&Transaction> = transactions.iter().collect();
        ordered.sort_by_key(|t| t.sort_key());

        let mut replay = LedgerReplay::default();

        for transaction in ordered {
            Self::apply(&mut replay, transaction)?;
        }

        Ok(replay)
    }

    fn apply(replay: &mut LedgerReplay, tx: &Transaction) -> Result<(), CalculatorError> {
        match tx.kind {
            TransactionType::Buy => Self::apply_buy(replay, tx),
            TransactionType::Sell => Self::apply_sell(replay, tx),
            TransactionType::Dividend => Self::apply_dividend(replay, tx),
            TransactionType::Deposit => Self::apply_deposit(replay, tx),
            TransactionType::Withdraw => Self::apply_withdraw(replay, tx),
        }
    }

    fn position_mut<'a>(replay: &'a mut LedgerReplay, tx: &Transaction) -> &'a mut Position {
        let position = replay
            .positions
            .entry(tx.symbol.clone())
            .or_insert_with(|| {
                Position::new(
                    tx.portfolio_id.clone(),
                    tx.symbol.clone(),
                    tx.category,
                    tx.currency.clone(),
                    tx.executed_at,
                )
            });
        if position.asset_name.is_none() && tx.asset_name.is_some() {
            position.asset_name = tx.asset_name.clone();
        }
        position
    }

    /// buy: `new_avg_cost = (qty*avg_cost + delta*unit_price + fee) / new_qty`.
    /// The fee is capitalized into basis.
    fn apply_buy(replay: &mut LedgerReplay, tx: &Transaction) -> Result<(), CalculatorError> {
        let position = Self::position_mut(replay, tx);

        let new_quantity = position.quantity + tx.quantity;
        let invested = position.quantity * position.avg_cost + tx.quantity * tx.unit_price + tx.fee;
        position.avg_cost = (invested / new_quantity).round_dp(COST_BASIS_PRECISION);
        position.quantity = new_quantity;
        Ok(())
    }

    /// sell: requires sufficient held quantity; realized P&L is
    /// `delta*(unit_price - avg_cost) - fee`; the avg_cost of the remaining
    /// quantity is unchanged.
    fn apply_sell(replay: &mut LedgerReplay, tx: &Transaction) -> Result<(), CalculatorError> {
        let held = replay
            .positions
            .get(&tx.symbol)
            .map(|p| p.quantity)
            .unwrap_or(Decimal::ZERO);
        if held < tx.quantity {
            return Err(CalculatorError::InsufficientQuantity {
                symbol: tx.symbol.clone(),
                transaction_id: tx.id.clone(),
                requested: tx.quantity,
                held,
            });
        }

        let position = Self::position_mut(replay, tx);
        let cost_basis = tx.quantity * position.avg_cost;
        let proceeds = tx.quantity * tx.unit_price;
        position.quantity -= tx.quantity;

        replay.realized_events.push(RealizedPnlEvent {
            transaction_id: tx.id.clone(),
            portfolio_id: tx.portfolio_id.clone(),
            symbol: tx.symbol.clone(),
            category: tx.category,
            kind: RealizedPnlKind::Sale,
            quantity: tx.quantity,
            cost_basis,
            proceeds,
            fee: tx.fee,
            pnl: proceeds - cost_basis - tx.fee,
            currency: tx.currency.clone(),
            occurred_at: tx.executed_at,
        });
        Ok(())
    }

    /// dividend: pure income, no change to quantity or avg_cost.
    fn apply_dividend(replay: &mut LedgerReplay, tx: &Transaction) -> Result<(), CalculatorError> {
        let proceeds = tx.quantity * tx.unit_price;
        replay.realized_events.push(RealizedPnlEvent {
            transaction_id: tx.id.clone(),
            portfolio_id: tx.portfolio_id.clone(),
            symbol: tx.symbol.clone(),
            category: tx.category,
            kind: RealizedPnlKind::Income,
            quantity: tx.quantity,
            cost_basis: Decimal::ZERO,
            proceeds,
            fee: tx.fee,
            pnl: proceeds - tx.fee,
            currency: tx.currency.clone(),
            occurred_at: tx.executed_at,
        });
        Ok(())
    }

    /// deposit: cash-like quantity moves 1:1 with avg_cost pinned at 1.
    fn apply_deposit(replay: &mut LedgerReplay, tx: &Transaction) -> Result<(), CalculatorError> {
        if !tx.category.is_cash_like() {
            return Err(CalculatorError::InvalidTransaction(format!(
                "Deposit on non-cash category '{}' for {}",
                tx.category, tx.symbol
            )));
        }
        let position = Self::position_mut(replay, tx);
        position.quantity += tx.quantity;
        position.avg_cost = Decimal::ONE;
        Ok(())
    }

    /// withdraw: requires sufficient quantity; emits a realized event whose
    /// basis is the pinned avg_cost of 1, so the P&L normally reduces to the
    /// negated fee.
    fn apply_withdraw(replay: &mut LedgerReplay, tx: &Transaction) -> Result<(), CalculatorError> {
        if !tx.category.is_cash_like() {
            return Err(CalculatorError::InvalidTransaction(format!(
                "Withdraw on non-cash category '{}' for {}",
                tx.category, tx.symbol
            )));
        }

        let held = replay
            .positions
            .get(&tx.symbol)
            .map(|p| p.quantity)
            .unwrap_or(Decimal::ZERO);
        if held < tx.quantity {
            return Err(CalculatorError::InsufficientQuantity {
                symbol: tx.symbol.clone(),
                transaction_id: tx.id.clone(),
                requested: tx.quantity,
                held,
            });
        }

        let position = Self::position_mut(replay, tx);
        let cost_basis = tx.quantity * position.avg_cost;
        let proceeds = tx.quantity * tx.unit_price;
        position.quantity -= tx.quantity;

        replay.realized_events.push(RealizedPnlEvent {
            transaction_id: tx.id.clone(),
            portfolio_id: tx.portfolio_id.clone(),
            symbol: tx.symbol.clone(),
            category: tx.category,
            kind: RealizedPnlKind::Withdrawal,
            quantity: tx.quantity,
            cost_basis,
            proceeds,
            fee: tx.fee,
            pnl: proceeds - cost_basis - tx.fee,
            currency: tx.currency.clone(),
            occurred_at: tx.executed_at,
        });
        Ok(())
    }
}
