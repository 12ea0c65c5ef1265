//! Valuation engine: merges derived positions with live price and FX data
//! into summaries, allocations, and net-worth history.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use dashmap::DashMap;
use futures::future::join_all;
use log::{debug, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::valuation_constants::category_color;
use super::valuation_model::{
    AllocationItem, AllocationResponse, NetWorthHistoryPoint, NetWorthSnapshot, PortfolioSummary,
    PositionDetail,
};
use super::valuation_traits::{NetWorthHistoryRepositoryTrait, ValuationServiceTrait};
use crate::constants::DISPLAY_DECIMAL_PRECISION;
use crate::errors::Result;
use crate::fx::CurrencyNormalizerTrait;
use crate::market_data::{MarketDataProviderTrait, Quote};
use crate::recalculation::RecalculationServiceTrait;
use crate::settings::EngineSettings;
use crate::transactions::AssetCategory;

/// Computes portfolio valuations on read. Derived state comes from the
/// orchestrator; prices and FX rates come from external collaborators with
/// timeouts and cached fallbacks, so a slow provider degrades freshness
/// instead of blocking the read.
pub struct ValuationService {
    recalculation: Arc<dyn RecalculationServiceTrait>,
    market_data: Arc<dyn MarketDataProviderTrait>,
    normalizer: Arc<dyn CurrencyNormalizerTrait>,
    history_repository: Arc<dyn NetWorthHistoryRepositoryTrait>,
    settings: EngineSettings,
    last_known_prices: DashMap<String, Quote>,
}

impl ValuationService {
    pub fn new(
        recalculation: Arc<dyn RecalculationServiceTrait>,
        market_data: Arc<dyn MarketDataProviderTrait>,
        normalizer: Arc<dyn CurrencyNormalizerTrait>,
        history_repository: Arc<dyn NetWorthHistoryRepositoryTrait>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            recalculation,
            market_data,
            normalizer,
            history_repository,
            settings,
            last_known_prices: DashMap::new(),
        }
    }

    /// Fetches one symbol's live price with a timeout. Returns the quote and
    /// whether it is fresh; a miss or timeout falls back to the last known
    /// cached quote.
    async fn fetch_price(
        &self,
        symbol: String,
        category: AssetCategory,
    ) -> (String, Option<Quote>, bool) {
        let fetch = self.market_data.get_price(&symbol, category);
        match tokio::time::timeout(self.settings.external_fetch_timeout, fetch).await {
            Ok(Ok(quote)) => {
                self.last_known_prices.insert(symbol.clone(), quote.clone());
                (symbol, Some(quote), true)
            }
            Ok(Err(e)) => {
                warn!(
                    "Price fetch failed for {}: {}. Falling back to last known price",
                    symbol, e
                );
                let cached = self.last_known_prices.get(&symbol).map(|q| q.clone());
                (symbol, cached, false)
            }
            Err(_) => {
                warn!(
                    "Price fetch for {} timed out after {:?}. Falling back to last known price",
                    symbol, self.settings.external_fetch_timeout
                );
                let cached = self.last_known_prices.get(&symbol).map(|q| q.clone());
                (symbol, cached, false)
            }
        }
    }

    /// Converts into base currency, degrading to the unconverted amount with
    /// a warning when no rate is available. A fallback sets `degraded` so the
    /// summary is flagged rather than presented as exact.
    fn to_base_or_native(&self, amount: Decimal, currency: &str, degraded: &mut bool) -> Decimal {
        match self.normalizer.to_base(amount, currency) {
            Ok(converted) => converted,
            Err(e) => {
                warn!(
                    "Failed to convert {} {} to {}: {}. Using unconverted amount",
                    amount,
                    currency,
                    self.normalizer.base_currency(),
                    e
                );
                *degraded = true;
                amount
            }
        }
    }
}

#[async_trait]
impl ValuationServiceTrait for ValuationService {
    async fn get_summary(&self, portfolio_id: &str) -> Result<PortfolioSummary> {
        let derived = self.recalculation.derived_state(portfolio_id).await?;

        // FX staleness degrades the summary, it never blocks it.
        if let Err(e) = self.normalizer.refresh().await {
            warn!("FX refresh failed, serving cached rates: {}", e);
        }

        let positions: Vec<_> = derived.replay.open_positions().cloned().collect();

        let unique_symbols: BTreeMap<String, AssetCategory> = positions
            .iter()
            .map(|p| (p.symbol.clone(), p.category))
            .collect();
        let fetches = unique_symbols
            .into_iter()
            .map(|(symbol, category)| self.fetch_price(symbol, category));
        let quotes: HashMap<String, (Quote, bool)> = join_all(fetches)
            .await
            .into_iter()
            .filter_map(|(symbol, quote, fresh)| quote.map(|q| (symbol, (q, fresh))))
            .collect();

        let mut total_assets = Decimal::ZERO;
        let mut total_liabilities = Decimal::ZERO;
        let mut total_unrealized_pnl = Decimal::ZERO;
        let mut has_stale_rates = false;
        let mut details = Vec::with_capacity(positions.len());

        for position in &positions {
            // Fallback order: live price, last known price, avg_cost.
            let (current_price, fresh) = match quotes.get(&position.symbol) {
                Some((quote, fresh)) => (quote.price, *fresh),
                None => (position.avg_cost, false),
            };

            let total_value =
                (position.quantity * current_price).round_dp(DISPLAY_DECIMAL_PRECISION);
            let total_cost =
                (position.quantity * position.avg_cost).round_dp(DISPLAY_DECIMAL_PRECISION);
            let unrealized_pnl = total_value - total_cost;
            let unrealized_pnl_pct = if total_cost > Decimal::ZERO {
                (unrealized_pnl / total_cost * dec!(100)).round_dp(DISPLAY_DECIMAL_PRECISION)
            } else {
                Decimal::ZERO
            };

            let total_value_base =
                self.to_base_or_native(total_value, &position.currency, &mut has_stale_rates);
            let unrealized_pnl_base =
                self.to_base_or_native(unrealized_pnl, &position.currency, &mut has_stale_rates);

            if position.category.is_liability() {
                total_liabilities += total_value_base.abs();
            } else {
                total_assets += total_value_base;
            }
            total_unrealized_pnl += unrealized_pnl_base;

            details.push(PositionDetail {
                symbol: position.symbol.clone(),
                asset_name: position.asset_name.clone(),
                category: position.category,
                quantity: position.quantity,
                avg_cost: position.avg_cost,
                current_price,
                total_value,
                total_cost,
                unrealized_pnl,
                unrealized_pnl_pct,
                total_value_base,
                unrealized_pnl_base,
                currency: position.currency.clone(),
                price_stale: !fresh,
            });
        }

        let mut total_realized_pnl = Decimal::ZERO;
        for (currency, amount) in derived.replay.realized_pnl_by_currency() {
            total_realized_pnl += self.to_base_or_native(amount, &currency, &mut has_stale_rates);
        }

        let has_stale_prices = details.iter().any(|d| d.price_stale);
        debug!(
            "Summary for portfolio {}: {} positions, stale prices: {}, stale rates: {}",
            portfolio_id,
            details.len(),
            has_stale_prices,
            has_stale_rates
        );

        Ok(PortfolioSummary {
            portfolio_id: portfolio_id.to_string(),
            base_currency: self.settings.base_currency.clone(),
            total_assets,
            total_liabilities,
            net_worth: total_assets - total_liabilities,
            total_unrealized_pnl,
            total_realized_pnl,
            positions: details,
            has_stale_prices,
            has_stale_rates,
            as_of: Utc::now(),
        })
    }

    async fn get_allocations(&self, portfolio_id: &str) -> Result<AllocationResponse> {
        let summary = self.get_summary(portfolio_id).await?;

        // Liabilities are excluded from the allocation chart.
        let mut by_category: BTreeMap<AssetCategory, Decimal> = BTreeMap::new();
        for detail in &summary.positions {
            if detail.category.is_liability() {
                continue;
            }
            *by_category.entry(detail.category).or_default() += detail.total_value_base;
        }

        let total_value: Decimal = by_category.values().copied().sum();

        let mut allocations: Vec<AllocationItem> = by_category
            .into_iter()
            .map(|(category, value)| {
                let percentage = if total_value > Decimal::ZERO {
                    (value / total_value * dec!(100)).round_dp(DISPLAY_DECIMAL_PRECISION)
                } else {
                    Decimal::ZERO
                };
                AllocationItem {
                    category,
                    value,
                    percentage,
                    color: category_color(category).to_string(),
                }
            })
            .collect();
        allocations.sort_by(|a, b| b.value.cmp(&a.value));

        Ok(AllocationResponse {
            portfolio_id: portfolio_id.to_string(),
            base_currency: summary.base_currency,
            total_value,
            allocations,
        })
    }

    async fn get_history(
        &self,
        portfolio_id: &str,
        days: i64,
    ) -> Result<Vec<NetWorthHistoryPoint>> {
        let days = days.max(1);
        let today = Utc::now().date_naive();
        let start = today - Duration::days(days - 1);

        let records = self.history_repository.list_since(portfolio_id, start).await?;
        let mut by_date: BTreeMap<NaiveDate, (Decimal, bool)> = records
            .into_iter()
            .map(|r| (r.date, (r.net_worth, r.approximate)))
            .collect();

        // Today has no snapshot yet: fill it with a live valuation so the
        // chart ends on the current value. A failed valuation just leaves
        // the day to be carried forward.
        if !by_date.contains_key(&today) {
            match self.get_summary(portfolio_id).await {
                Ok(summary) => {
                    let approximate = summary.has_stale_prices || summary.has_stale_rates;
                    by_date.insert(today, (summary.net_worth, approximate));
                }
                Err(e) => {
                    warn!(
                        "Live valuation for history of portfolio {} failed: {}",
                        portfolio_id, e
                    );
                }
            }
        }

        // Gap days carry the last known value forward, flagged approximate.
        let mut points = Vec::with_capacity(days as usize);
        let mut last_value = Decimal::ZERO;
        let mut seen_any = false;
        for offset in 0..days {
            let date = start + Duration::days(offset);
            match by_date.get(&date) {
                Some((value, approximate)) => {
                    last_value = *value;
                    seen_any = true;
                    points.push(NetWorthHistoryPoint {
                        date,
                        net_worth: *value,
                        approximate: *approximate,
                    });
                }
                None => points.push(NetWorthHistoryPoint {
                    date,
                    net_worth: last_value,
                    approximate: seen_any,
                }),
            }
        }

        Ok(points)
    }

    async fn save_daily_snapshot(&self, portfolio_id: &str) -> Result<NetWorthSnapshot> {
        let summary = self.get_summary(portfolio_id).await?;
        let snapshot = NetWorthSnapshot {
            portfolio_id: portfolio_id.to_string(),
            date: Utc::now().date_naive(),
            total_assets: summary.total_assets,
            total_liabilities: summary.total_liabilities,
            net_worth: summary.net_worth,
            approximate: summary.has_stale_prices || summary.has_stale_rates,
        };
        self.history_repository.upsert(snapshot.clone()).await?;
        Ok(snapshot)
    }
}
