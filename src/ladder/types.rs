//! Ladder rows, results, trim plan and chart series.

use serde::{Deserialize, Serialize};

use crate::error::LadderError;

/// One rung of the buy ladder, kept at full precision.
///
/// Undefined averages (nothing invested yet) are `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LadderRow {
    /// 1-based rung number
    pub index: usize,

    /// Pullback from the previous rung's price (percent)
    pub drop_pct: f64,

    /// Entry price of this rung
    pub price: f64,

    /// Share of the allocated value bought at this rung (percent)
    pub alloc_pct: f64,

    /// Amount invested at this rung
    pub invested_amount: f64,

    /// Running total invested up to and including this rung
    pub cumulative_invested: f64,

    /// Volume-weighted average entry price so far
    pub weighted_average_price: f64,

    /// Exit target for the position held so far
    pub take_profit_price: f64,

    /// Running sum of allocation percents
    pub cumulative_invested_pct: f64,
}

impl LadderRow {
    /// Display label for the rung, e.g. `Buy 3`.
    pub fn label(&self) -> String {
        format!("Buy {}", self.index)
    }

    pub fn has_average(&self) -> bool {
        !self.weighted_average_price.is_nan()
    }
}

/// Output of a single ladder computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LadderResult {
    pub rows: Vec<LadderRow>,
    pub total_invested: f64,
    pub final_weighted_average_price: f64,
    pub final_take_profit_price: f64,
    pub total_invested_pct: f64,
    pub take_profit_multiplier: f64,
}

impl LadderResult {
    /// Build the result and read summary scalars off the last row.
    pub(crate) fn from_rows(rows: Vec<LadderRow>, take_profit_multiplier: f64) -> Self {
        let (total_invested, final_weighted_average_price, total_invested_pct) = rows
            .last()
            .map(|r| (r.cumulative_invested, r.weighted_average_price, r.cumulative_invested_pct))
            .unwrap_or((0.0, f64::NAN, 0.0));

        Self {
            rows,
            total_invested,
            final_weighted_average_price,
            final_take_profit_price: final_weighted_average_price * take_profit_multiplier,
            total_invested_pct,
            take_profit_multiplier,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Final weighted average price, or `UndefinedAverage` if nothing was invested.
    pub fn require_average(&self) -> Result<f64, LadderError> {
        if self.final_weighted_average_price.is_nan() {
            return Err(LadderError::UndefinedAverage);
        }
        Ok(self.final_weighted_average_price)
    }

    /// Rungs whose price fell to zero or below.
    pub fn non_positive_rungs(&self) -> Vec<usize> {
        self.rows
            .iter()
            .filter(|r| r.price <= 0.0)
            .map(|r| r.index)
            .collect()
    }

    pub fn summary(&self) -> LadderSummary {
        LadderSummary {
            rungs: self.rows.len(),
            total_invested: self.total_invested,
            total_invested_pct: self.total_invested_pct,
            final_weighted_average_price: self.final_weighted_average_price,
            final_take_profit_price: self.final_take_profit_price,
            take_profit_multiplier: self.take_profit_multiplier,
        }
    }

    /// Price series plus the average and take-profit reference lines.
    pub fn chart_data(&self) -> ChartData {
        ChartData {
            labels: self.rows.iter().map(LadderRow::label).collect(),
            prices: self.rows.iter().map(|r| r.price).collect(),
            average_line: finite(self.final_weighted_average_price),
            take_profit_line: finite(self.final_take_profit_price),
        }
    }
}

/// Summary scalars of a ladder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LadderSummary {
    pub rungs: usize,
    pub total_invested: f64,
    pub total_invested_pct: f64,
    pub final_weighted_average_price: f64,
    pub final_take_profit_price: f64,
    pub take_profit_multiplier: f64,
}

/// Partial position reduction when price returns to the average entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimPlan {
    /// Share of the whole portfolio to sell (percent)
    pub trim_pct: f64,

    /// Amount to sell
    pub trim_amount: f64,

    /// Reference price that triggers the trim
    pub trigger_price: Option<f64>,
}

impl TrimPlan {
    pub fn new(portfolio_total: f64, trim_pct: f64, result: &LadderResult) -> Self {
        Self {
            trim_pct,
            trim_amount: super::compute_trim(portfolio_total, trim_pct),
            trigger_price: result.require_average().ok(),
        }
    }
}

/// Data needed to plot the ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub prices: Vec<f64>,
    pub average_line: Option<f64>,
    pub take_profit_line: Option<f64>,
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
