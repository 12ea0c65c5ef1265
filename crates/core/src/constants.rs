/// Default reporting currency for portfolios that do not specify one.
pub const DEFAULT_BASE_CURRENCY: &str = "TWD";

/// Decimal precision for weighted-average cost figures.
pub const COST_BASIS_PRECISION: u32 = 8;

/// Decimal precision for display (totals, P&L, percentages).
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Default timeout for external price/FX fetches, in milliseconds.
pub const DEFAULT_EXTERNAL_FETCH_TIMEOUT_MS: u64 = 5_000;

/// Default page size for transaction listings.
pub const DEFAULT_PAGE_SIZE: usize = 20;
