//! Holdings module - cost-basis projection over the transaction log.

mod cost_basis_calculator;
mod holdings_errors;
mod holdings_model;


pub use cost_basis_calculator::CostBasisCalculator;
pub use holdings_errors::CalculatorError;
pub use holdings_model::{LedgerReplay, Position, RealizedPnlEvent, RealizedPnlKind};
