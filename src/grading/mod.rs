pub mod config;
pub mod engine;
pub mod error;
pub mod final_exam;
pub mod parser;
pub mod scale;
pub mod validation;

pub use config::*;
pub use engine::{
    aggregate, required_on_remaining, round_one_decimal, AggregationResult, GoalProjection,
    GradeEntry,
};
pub use error::GradeError;
pub use final_exam::{required_final_score, FinalExamQuery, FinalExamResult};
pub use parser::{parse_grade, parse_weight};
pub use scale::{letter_for, LetterGrade, GRADING_SCALE, LETTER_BOUNDARIES};
pub use validation::validate_worksheet;
