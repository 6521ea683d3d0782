//! Strategy input and parsing of comma-separated sequences.

use serde::{Deserialize, Serialize};

use crate::error::LadderError;

/// Largest magnitude a ladder value may take; `rust_decimal` tops out near 7.9e28.
pub const MAX_MAGNITUDE: f64 = 1e28;

/// Inputs for one ladder computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyInput {
    /// Reference peak price the first pullback is measured from
    pub local_high: f64,

    /// Capital available to this ladder
    pub allocated_value: f64,

    /// Percentage pullback per rung, relative to the previous rung's price
    pub drops: Vec<f64>,

    /// Percentage of `allocated_value` deployed at each rung
    pub allocations: Vec<f64>,
}

impl StrategyInput {
    pub fn new(local_high: f64, allocated_value: f64, drops: Vec<f64>, allocations: Vec<f64>) -> Self {
        Self {
            local_high,
            allocated_value,
            drops,
            allocations,
        }
    }

    /// Number of rungs, or a mismatch error if the sequences disagree.
    pub fn rungs(&self) -> Result<usize, LadderError> {
        if self.drops.len() != self.allocations.len() {
            return Err(LadderError::ConfigurationMismatch {
                drops: self.drops.len(),
                allocations: self.allocations.len(),
            });
        }
        Ok(self.drops.len())
    }

    /// Check the scalar preconditions and the sequence lengths.
    pub fn validate(&self) -> Result<(), LadderError> {
        ensure_non_negative("local high", self.local_high)?;
        ensure_non_negative("allocated value", self.allocated_value)?;
        self.rungs()?;
        for &drop in &self.drops {
            ensure_bounded("drop percent", drop)?;
        }
        for &alloc in &self.allocations {
            ensure_bounded("allocation percent", alloc)?;
        }
        Ok(())
    }
}

/// Capital assigned to the ladder: `portfolio_total * allocated_pct / 100`.
pub fn allocated_value(portfolio_total: f64, allocated_pct: f64) -> f64 {
    portfolio_total * allocated_pct / 100.0
}

/// Parse a comma-separated list of numbers.
///
/// Tokens are trimmed and empty tokens are skipped, so `"-15, -10,,"`
/// parses to `[-15.0, -10.0]`.
pub fn parse_sequence(field: &str, text: &str) -> Result<Vec<f64>, LadderError> {
    text.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token.parse::<f64>().map_err(|_| LadderError::Parse {
                field: field.to_string(),
                token: token.to_string(),
            })
        })
        .collect()
}

pub(crate) fn ensure_non_negative(name: &'static str, value: f64) -> Result<(), LadderError> {
    ensure_bounded(name, value)?;
    if value < 0.0 {
        return Err(LadderError::InvalidParameter { name, value });
    }
    Ok(())
}

/// Finite and within [`MAX_MAGNITUDE`].
pub(crate) fn ensure_bounded(name: &'static str, value: f64) -> Result<(), LadderError> {
    if !value.is_finite() || value.abs() > MAX_MAGNITUDE {
        return Err(LadderError::InvalidParameter { name, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sequence_trims_and_skips_empty() {
        let drops = parse_sequence("drops", " -15, -10 ,,-7,").unwrap();
        assert_eq!(drops, vec![-15.0, -10.0, -7.0]);

        assert!(parse_sequence("drops", "").unwrap().is_empty());
        assert!(parse_sequence("drops", " , ,").unwrap().is_empty());
    }

    #[test]
    fn test_parse_sequence_rejects_bad_token() {
        let err = parse_sequence("allocations", "20, abc, 15").unwrap_err();
        assert_eq!(
            err,
            LadderError::Parse {
                field: "allocations".to_string(),
                token: "abc".to_string(),
            }
        );
    }

    #[test]
    fn test_allocated_value() {
        assert_eq!(allocated_value(1_000_000.0, 70.0), 700_000.0);
        assert_eq!(allocated_value(1_000_000.0, 0.0), 0.0);
    }

    #[test]
    fn test_validate() {
        let input = StrategyInput::new(190.34, 700_000.0, vec![-15.0, -10.0], vec![20.0]);
        assert_eq!(
            input.validate(),
            Err(LadderError::ConfigurationMismatch { drops: 2, allocations: 1 })
        );

        let input = StrategyInput::new(f64::NAN, 700_000.0, vec![], vec![]);
        assert!(matches!(
            input.validate(),
            Err(LadderError::InvalidParameter { name: "local high", .. })
        ));

        let input = StrategyInput::new(190.34, -1.0, vec![], vec![]);
        assert!(input.validate().is_err());

        let input = StrategyInput::new(190.34, 0.0, vec![], vec![]);
        assert!(input.validate().is_ok());

        let input = StrategyInput::new(190.34, 1e30, vec![-10.0], vec![50.0]);
        assert!(matches!(
            input.validate(),
            Err(LadderError::InvalidParameter { name: "allocated value", .. })
        ));

        let input = StrategyInput::new(190.34, 1_000.0, vec![f64::INFINITY], vec![50.0]);
        assert!(matches!(
            input.validate(),
            Err(LadderError::InvalidParameter { name: "drop percent", .. })
        ));
    }
}
