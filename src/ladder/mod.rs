//! Ladder logic: inputs, the calculator, and its result types.

mod calculator;
mod input;
mod types;

pub use calculator::{compute, compute_trim, LadderCalculator, DEFAULT_TAKE_PROFIT_MULTIPLIER};
pub use input::{allocated_value, parse_sequence, StrategyInput, MAX_MAGNITUDE};
pub(crate) use input::ensure_non_negative;
pub use types::{ChartData, LadderResult, LadderRow, LadderSummary, TrimPlan};
