//! Ladder configuration.

use serde::{Deserialize, Serialize};

use crate::error::LadderError;
use crate::ladder::{allocated_value, ensure_non_negative, parse_sequence, StrategyInput, DEFAULT_TAKE_PROFIT_MULTIPLIER};

/// User-facing parameters for a ladder run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LadderConfig {
    /// Ticker the ladder is planned for (display and file names only)
    pub symbol: String,

    /// Recent local high of the instrument
    pub local_high: f64,

    /// Total portfolio value
    pub portfolio_total: f64,

    /// Share of the portfolio assigned to this ladder (0 to 100)
    pub allocated_pct: f64,

    /// Comma-separated pullbacks per rung in percent
    pub drops: String,

    /// Comma-separated allocation per rung in percent of the allocated value
    pub allocations: String,

    /// Share of the portfolio to trim at break-even (0 to 100)
    pub trim_pct: f64,

    /// Take-profit target as a multiple of the weighted average
    pub take_profit_multiplier: f64,
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            symbol: "SPXL".to_string(),
            local_high: 190.34,
            portfolio_total: 1_000_000.0,
            allocated_pct: 70.0,
            drops: "-15,-10,-7,-10,-10".to_string(),
            allocations: "20,15,20,20,15".to_string(),
            trim_pct: 10.0,
            take_profit_multiplier: DEFAULT_TAKE_PROFIT_MULTIPLIER, // 20% over average
        }
    }
}

impl LadderConfig {
    /// Check scalar ranges.
    pub fn validate(&self) -> Result<(), LadderError> {
        ensure_non_negative("local high", self.local_high)?;
        ensure_non_negative("portfolio total", self.portfolio_total)?;
        percent("allocated percent", self.allocated_pct)?;
        percent("trim percent", self.trim_pct)?;

        if !self.take_profit_multiplier.is_finite() || self.take_profit_multiplier <= 0.0 {
            return Err(LadderError::InvalidParameter {
                name: "take-profit multiplier",
                value: self.take_profit_multiplier,
            });
        }
        Ok(())
    }

    /// Capital assigned to the ladder.
    pub fn allocated_value(&self) -> f64 {
        allocated_value(self.portfolio_total, self.allocated_pct)
    }

    /// Validate and parse into calculator input.
    pub fn strategy_input(&self) -> Result<StrategyInput, LadderError> {
        self.validate()?;

        let drops = parse_sequence("drops", &self.drops)?;
        let allocations = parse_sequence("allocations", &self.allocations)?;

        let input = StrategyInput::new(self.local_high, self.allocated_value(), drops, allocations);
        input.rungs()?;
        Ok(input)
    }

    /// Default CSV file name, e.g. `spxl_entry_points.csv`.
    pub fn csv_file_name(&self) -> String {
        format!("{}_entry_points.csv", self.symbol.to_lowercase())
    }
}

fn percent(name: &'static str, value: f64) -> Result<(), LadderError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(LadderError::InvalidParameter { name, value });
    }
    Ok(())
}
