//! Recalculation module - freshness tracking and replay orchestration.

mod recalculation_model;
mod recalculation_service;
mod recalculation_traits;

#[cfg(test)]
mod recalculation_service_tests;

pub use recalculation_model::{DerivedState, FreshnessState, RecalculationOutcome};
pub use recalculation_service::RecalculationOrchestrator;
pub use recalculation_traits::{FreshnessTrackerTrait, RecalculationServiceTrait};
