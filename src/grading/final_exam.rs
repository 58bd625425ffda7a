use serde::{Deserialize, Serialize};

use super::engine::round_one_decimal;
use super::error::GradeError;
use super::parser::parse_decimal;

/// Inputs for the required-final-score calculation.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct FinalExamQuery {
    pub current: f64,
    pub desired: f64,
    /// Weight of the final exam as a percentage of the course grade.
    pub final_weight: f64,
}

/// Score needed on the final exam. Values outside [0, 100] are returned as-is
/// and flagged; judging them is left to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct FinalExamResult {
    pub query: FinalExamQuery,
    /// Rounded to one decimal place.
    pub required: f64,
    pub raw_required: f64,
    /// More than 100 is needed.
    pub exceeds_maximum: bool,
    /// The desired grade is reached even with a zero on the final.
    pub already_secured: bool,
}

impl FinalExamQuery {
    pub fn new(current: f64, desired: f64, final_weight: f64) -> Self {
        Self {
            current,
            desired,
            final_weight,
        }
    }

    /// Build a query from text fields, rejecting anything that is not a finite number.
    pub fn parse(current: &str, desired: &str, final_weight: &str) -> Result<Self, GradeError> {
        Ok(Self::new(
            parse_field("current grade", current)?,
            parse_field("desired grade", desired)?,
            parse_field("final exam weight", final_weight)?,
        ))
    }

    pub fn solve(&self) -> Result<FinalExamResult, GradeError> {
        let raw_required = solve_required(self.current, self.desired, self.final_weight)?;
        Ok(FinalExamResult {
            query: *self,
            required: round_one_decimal(raw_required),
            raw_required,
            exceeds_maximum: raw_required > 100.0,
            already_secured: raw_required <= 0.0,
        })
    }
}

fn parse_field(field: &'static str, value: &str) -> Result<f64, GradeError> {
    parse_decimal(value.trim()).ok_or_else(|| GradeError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

fn solve_required(current: f64, desired: f64, final_weight_pct: f64) -> Result<f64, GradeError> {
    if !(final_weight_pct > 0.0 && final_weight_pct <= 100.0) {
        return Err(GradeError::InvalidWeight(final_weight_pct));
    }
    let w = final_weight_pct / 100.0;
    let required = (desired - current * (1.0 - w)) / w;
    if !round_one_decimal(required).is_finite() {
        return Err(GradeError::OutOfRange {
            field: "required final score",
        });
    }
    Ok(required)
}

/// Score needed on a final worth `final_weight_pct` percent to move from
/// `current` to `desired`, rounded to one decimal place. Not clamped.
pub fn required_final_score(
    current: f64,
    desired: f64,
    final_weight_pct: f64,
) -> Result<f64, GradeError> {
    solve_required(current, desired, final_weight_pct).map(round_one_decimal)
}
