//! Error taxonomy for ladder input and computation.

use thiserror::Error;

/// Errors raised while building or evaluating a buy ladder.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LadderError {
    /// Drop and allocation sequences differ in length.
    #[error("drop count ({drops}) does not match allocation count ({allocations})")]
    ConfigurationMismatch { drops: usize, allocations: usize },

    /// A comma-separated token is not a valid number.
    #[error("invalid number '{token}' in {field}")]
    Parse { field: String, token: String },

    /// Nothing has been invested, so there is no average entry price.
    #[error("weighted average price is undefined (nothing invested)")]
    UndefinedAverage,

    /// A scalar input is out of range or not finite.
    #[error("invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}
