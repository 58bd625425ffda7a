use super::config::GradeScheme;
use super::scale::LetterGrade;

/// Parse a grade token into a numeric score under the given scheme.
///
/// Letters are matched case-insensitively against the grading scale. In
/// `Mixed` mode a token that is not a letter is parsed as a decimal number.
/// Numbers are not clamped; range checks belong to the caller.
/// Returns `None` for empty or unparseable tokens.
pub fn parse_grade(token: &str, scheme: GradeScheme) -> Option<f64> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(letter) = trimmed.parse::<LetterGrade>() {
        return Some(letter.score());
    }

    match scheme {
        GradeScheme::Letters => None,
        GradeScheme::Mixed => parse_decimal(trimmed),
    }
}

/// Parse a weight token: a finite, non-negative decimal number.
pub fn parse_weight(token: &str) -> Option<f64> {
    parse_decimal(token.trim()).filter(|w| *w >= 0.0)
}

/// Strict decimal parse; rejects trailing text and non-finite values.
pub(crate) fn parse_decimal(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}
