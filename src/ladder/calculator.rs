//! Buy-ladder calculator: compounding rung prices, running totals and
//! volume-weighted average entry.
//!
//! Everything here stays at full `f64` precision. Rounding for display is
//! done by the report and export layers and never feeds back into the
//! next rung.

use tracing::{debug, info, warn};

use super::input::{ensure_bounded, StrategyInput};
use super::types::{LadderResult, LadderRow};
use crate::error::LadderError;

/// Default take-profit markup over the weighted average (20%).
pub const DEFAULT_TAKE_PROFIT_MULTIPLIER: f64 = 1.2;

/// Calculator for DCA buy ladders.
#[derive(Debug, Clone, Copy)]
pub struct LadderCalculator {
    take_profit_multiplier: f64,
}

impl LadderCalculator {
    pub fn new(take_profit_multiplier: f64) -> Self {
        Self { take_profit_multiplier }
    }

    pub fn take_profit_multiplier(&self) -> f64 {
        self.take_profit_multiplier
    }

    /// Compute every rung of the ladder.
    ///
    /// Each drop compounds on the previous rung's price, starting from the
    /// local high. Fails with `ConfigurationMismatch` before producing any
    /// row if the drop and allocation sequences differ in length.
    pub fn compute(&self, input: &StrategyInput) -> Result<LadderResult, LadderError> {
        input.validate()?;

        let mut rows = Vec::with_capacity(input.drops.len());
        let mut prev_price = input.local_high;
        let mut cumulative_invested = 0.0;
        let mut cumulative_alloc_pct = 0.0;
        let mut weighted_price_acc = 0.0;

        for (i, (&drop_pct, &alloc_pct)) in input.drops.iter().zip(&input.allocations).enumerate() {
            let price = prev_price * (1.0 + drop_pct / 100.0);
            let invested_amount = input.allocated_value * alloc_pct / 100.0;

            cumulative_invested += invested_amount;
            weighted_price_acc += price * invested_amount;
            cumulative_alloc_pct += alloc_pct;

            let weighted_average_price = if cumulative_invested > 0.0 {
                weighted_price_acc / cumulative_invested
            } else {
                f64::NAN
            };

            if price <= 0.0 {
                warn!(rung = i + 1, price, drop_pct, "Rung price is not positive");
            }

            debug!(
                rung = i + 1,
                price,
                invested = invested_amount,
                avg = weighted_average_price,
                "Computed rung"
            );

            let row = LadderRow {
                index: i + 1,
                drop_pct,
                price,
                alloc_pct,
                invested_amount,
                cumulative_invested,
                weighted_average_price,
                take_profit_price: weighted_average_price * self.take_profit_multiplier,
                cumulative_invested_pct: cumulative_alloc_pct,
            };
            check_row_magnitude(&row)?;
            rows.push(row);

            prev_price = price;
        }

        let result = LadderResult::from_rows(rows, self.take_profit_multiplier);

        if !result.is_empty() && result.final_weighted_average_price.is_nan() {
            warn!("Nothing invested; weighted average is undefined");
        }

        info!(
            rungs = result.len(),
            total_invested = result.total_invested,
            avg = result.final_weighted_average_price,
            take_profit = result.final_take_profit_price,
            "Ladder computed"
        );

        Ok(result)
    }
}

impl Default for LadderCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_TAKE_PROFIT_MULTIPLIER)
    }
}

/// Reject rows whose values cannot be shown at display precision.
///
/// Undefined averages (`NaN`) are allowed through.
fn check_row_magnitude(row: &LadderRow) -> Result<(), LadderError> {
    ensure_bounded("price", row.price)?;
    ensure_bounded("invested amount", row.invested_amount)?;
    ensure_bounded("cumulative invested", row.cumulative_invested)?;
    ensure_bounded("cumulative invested percent", row.cumulative_invested_pct)?;
    if row.has_average() {
        ensure_bounded("weighted average price", row.weighted_average_price)?;
        ensure_bounded("take-profit price", row.take_profit_price)?;
    }
    Ok(())
}

/// Compute a ladder from plain scalars and sequences.
pub fn compute(
    local_high: f64,
    allocated_value: f64,
    drops: &[f64],
    allocations: &[f64],
    take_profit_multiplier: f64,
) -> Result<LadderResult, LadderError> {
    let input = StrategyInput::new(local_high, allocated_value, drops.to_vec(), allocations.to_vec());
    LadderCalculator::new(take_profit_multiplier).compute(&input)
}

/// Amount to sell for a trim of `trim_pct` percent of the whole portfolio.
pub fn compute_trim(portfolio_total: f64, trim_pct: f64) -> f64 {
    portfolio_total * trim_pct / 100.0
}
