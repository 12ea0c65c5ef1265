//! Valuation module - portfolio summaries, allocations, and net-worth
//! history built on top of derived replay state.

mod valuation_constants;
mod valuation_model;
mod valuation_service;
mod valuation_traits;


pub use valuation_constants::category_color;
pub use valuation_model::{
    AllocationItem, AllocationResponse, NetWorthHistoryPoint, NetWorthSnapshot, PortfolioSummary,
    PositionDetail,
};
pub use valuation_service::ValuationService;
pub use valuation_traits::{NetWorthHistoryRepositoryTrait, ValuationServiceTrait};
