//! DCA buy-ladder calculator.
//!
//! Derives entry prices, invested amounts, the volume-weighted average
//! entry and a take-profit target for a ladder of compounding pullbacks
//! from a local high.

pub mod config;
pub mod error;
pub mod export;
pub mod ladder;
pub mod report;

pub use config::LadderConfig;
pub use error::LadderError;
pub use ladder::{compute, compute_trim, LadderCalculator, LadderResult, LadderRow, StrategyInput};
