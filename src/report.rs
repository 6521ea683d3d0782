//! Display rounding and the text report printed by the CLI.
//!
//! Rows are rounded here, at the output boundary: prices to 4 decimals,
//! currency and percentages to 2. The calculator's full-precision values
//! are never modified.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::config::LadderConfig;
use crate::ladder::{LadderResult, LadderRow, TrimPlan};

pub const PRICE_DP: u32 = 4;
pub const CURRENCY_DP: u32 = 2;
pub const PERCENT_DP: u32 = 2;

/// A ladder row rounded for display and export.
///
/// `None` marks a value that is undefined (e.g. the average before
/// anything is invested).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRow {
    pub rung: String,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub drop_pct: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub alloc_pct: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub invested_amount: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub cumulative_invested: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub weighted_average_price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub take_profit_price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub cumulative_invested_pct: Option<Decimal>,
}

impl DisplayRow {
    pub fn from_row(row: &LadderRow) -> Self {
        Self {
            rung: row.label(),
            drop_pct: round(row.drop_pct, PERCENT_DP),
            price: round(row.price, PRICE_DP),
            alloc_pct: round(row.alloc_pct, PERCENT_DP),
            invested_amount: round(row.invested_amount, CURRENCY_DP),
            cumulative_invested: round(row.cumulative_invested, CURRENCY_DP),
            weighted_average_price: round(row.weighted_average_price, PRICE_DP),
            take_profit_price: round(row.take_profit_price, PRICE_DP),
            cumulative_invested_pct: round(row.cumulative_invested_pct, PERCENT_DP),
        }
    }
}

/// Rounded rows for a whole ladder.
pub fn display_rows(result: &LadderResult) -> Vec<DisplayRow> {
    result.rows.iter().map(DisplayRow::from_row).collect()
}

/// Round to `dp` decimals (banker's rounding) on the shortest decimal form
/// of `value`. Non-finite values yield `None`.
///
/// Values above [`MAX_MAGNITUDE`](crate::ladder::MAX_MAGNITUDE) are rejected
/// by the calculator, so every finite ladder value converts.
pub fn round(value: f64, dp: u32) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value).map(|d| rounded(d, dp))
}

fn rounded(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven)
}

/// Format an amount with thousands separators, e.g. `1,234,567.89`.
pub fn format_amount(value: Option<Decimal>) -> String {
    match value {
        Some(d) => group_thousands(&format!("{:.2}", rounded(d, CURRENCY_DP))),
        None => "n/a".to_string(),
    }
}

/// Format a price with 4 decimals.
pub fn format_price(value: Option<Decimal>) -> String {
    value
        .map(|d| format!("{:.4}", rounded(d, PRICE_DP)))
        .unwrap_or_else(|| "n/a".to_string())
}

/// Format a percentage with 2 decimals.
pub fn format_pct(value: Option<Decimal>) -> String {
    value
        .map(|d| format!("{:.2}", rounded(d, PERCENT_DP)))
        .unwrap_or_else(|| "n/a".to_string())
}

fn group_thousands(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// Render rounded rows as a fixed-width text table.
pub fn format_table(rows: &[DisplayRow]) -> String {
    let mut out = format!(
        "{:<8} {:>8} {:>12} {:>8} {:>16} {:>16} {:>12} {:>12} {:>8}\n",
        "RUNG", "DROP%", "PRICE", "ALLOC%", "INVESTED", "CUMULATIVE", "AVG PRICE", "TAKE-PROFIT", "CUM%"
    );
    out.push_str(&"-".repeat(108));
    out.push('\n');

    for row in rows {
        out.push_str(&format!(
            "{:<8} {:>8} {:>12} {:>8} {:>16} {:>16} {:>12} {:>12} {:>8}\n",
            row.rung,
            format_pct(row.drop_pct),
            format_price(row.price),
            format_pct(row.alloc_pct),
            format_amount(row.invested_amount),
            format_amount(row.cumulative_invested),
            format_price(row.weighted_average_price),
            format_price(row.take_profit_price),
            format_pct(row.cumulative_invested_pct),
        ));
    }
    out
}

/// Everything the `calc` command prints.
#[derive(Debug, Clone)]
pub struct LadderReport {
    pub symbol: String,
    pub local_high: f64,
    pub portfolio_total: f64,
    pub allocated_pct: f64,
    pub allocated_value: f64,
    pub result: LadderResult,
    pub trim: TrimPlan,
}

impl LadderReport {
    pub fn new(config: &LadderConfig, result: LadderResult, trim: TrimPlan) -> Self {
        Self {
            symbol: config.symbol.clone(),
            local_high: config.local_high,
            portfolio_total: config.portfolio_total,
            allocated_pct: config.allocated_pct,
            allocated_value: config.allocated_value(),
            result,
            trim,
        }
    }

    /// Take-profit markup over the average, in percent.
    pub fn markup_pct(&self) -> f64 {
        (self.result.take_profit_multiplier - 1.0) * 100.0
    }
}

impl std::fmt::Display for LadderReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let title = format!(" {} BUY LADDER ", self.symbol);
        writeln!(f, "\n{:=^100}", title)?;
        writeln!(f)?;
        writeln!(f, "Local High:       {}", format_price(round(self.local_high, PRICE_DP)))?;
        writeln!(f, "Portfolio:        {}", format_amount(round(self.portfolio_total, CURRENCY_DP)))?;
        writeln!(
            f,
            "Allocated:        {} ({}%)",
            format_amount(round(self.allocated_value, CURRENCY_DP)),
            format_pct(round(self.allocated_pct, PERCENT_DP))
        )?;
        writeln!(f)?;

        write!(f, "{}", format_table(&display_rows(&self.result)))?;

        let summary = self.result.summary();
        writeln!(f)?;
        writeln!(f, "--- Summary ---")?;
        writeln!(
            f,
            "Total Invested:   {} ({:.1}% of allocation)",
            format_amount(round(summary.total_invested, CURRENCY_DP)),
            summary.total_invested_pct
        )?;
        writeln!(
            f,
            "Avg Price (end):  {}",
            format_price(round(summary.final_weighted_average_price, PRICE_DP))
        )?;
        writeln!(
            f,
            "Take-Profit ({:.0}%): {}",
            self.markup_pct(),
            format_price(round(summary.final_take_profit_price, PRICE_DP))
        )?;

        writeln!(f)?;
        writeln!(f, "--- Trim at Break-even ---")?;
        match self.trim.trigger_price {
            Some(price) => writeln!(
                f,
                "When price returns to {}, trimming {}% sells about {}",
                format_price(round(price, PRICE_DP)),
                format_pct(round(self.trim.trim_pct, PERCENT_DP)),
                format_amount(round(self.trim.trim_amount, CURRENCY_DP))
            )?,
            None => writeln!(
                f,
                "No average entry price; trimming {}% would sell about {}",
                format_pct(round(self.trim.trim_pct, PERCENT_DP)),
                format_amount(round(self.trim.trim_amount, CURRENCY_DP))
            )?,
        }

        let non_positive = self.result.non_positive_rungs();
        if !non_positive.is_empty() {
            writeln!(f)?;
            writeln!(f, "Warning: non-positive price at rung(s) {:?}", non_positive)?;
        }

        writeln!(f, "{:=^100}", "")?;
        Ok(())
    }
}
