//! Grade engine error types.
//!
//! Every variant is recoverable at the call site: the caller reports the
//! message and asks for corrected input.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradeError {
    /// No row has both a grade and a weight.
    #[error("please enter at least one grade and weight")]
    EmptyInput,

    /// A row's grade or weight could not be parsed, or its weight is negative.
    #[error("invalid grade or weight for \"{0}\"")]
    InvalidEntry(String),

    /// Percentage weights add up to more than 100.
    #[error("total weight cannot exceed 100% (got {total:.1}%)")]
    WeightOverflow { total: f64 },

    /// Weights add up to zero, so no average exists.
    #[error("total weight cannot be zero")]
    ZeroWeight,

    /// Final exam weight outside (0, 100].
    #[error("final exam weight must be greater than 0 and at most 100 (got {0})")]
    InvalidWeight(f64),

    /// A numeric field holds something other than a finite number.
    #[error("{field} must be a valid number (got '{value}')")]
    InvalidNumber { field: &'static str, value: String },

    /// A computed value overflowed or is not a number.
    #[error("{field} is too large to compute")]
    OutOfRange { field: &'static str },
}
