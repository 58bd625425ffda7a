use super::config::{GradingConfig, WeightFormat};
use super::parser::{parse_grade, parse_weight};
use crate::worksheet::Worksheet;

/// Check a worksheet before calculating.
/// Returns all problems at once (not just the first).
pub fn validate_worksheet(worksheet: &Worksheet, config: &GradingConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let mut total_weight = 0.0;
    let mut complete_rows = 0;

    for (i, entry) in worksheet.entries.iter().enumerate() {
        // Half-filled rows are ignored by the calculation, not rejected
        if !entry.is_complete() {
            continue;
        }
        complete_rows += 1;

        if parse_grade(&entry.grade, config.scheme).is_none() {
            errors.push(format!(
                "entries[{}] ({}).grade: invalid '{}' for {} scheme",
                i,
                entry.display_label(),
                entry.grade.trim(),
                config.scheme
            ));
        }
        match parse_weight(&entry.weight) {
            Some(w) => total_weight += w,
            None => errors.push(format!(
                "entries[{}] ({}).weight: invalid '{}' - must be a non-negative number",
                i,
                entry.display_label(),
                entry.weight.trim()
            )),
        }
    }

    if complete_rows == 0 {
        errors.push("entries: at least one row needs both a grade and a weight".to_string());
    } else if errors.is_empty() {
        if config.weight_format == WeightFormat::Percentage && total_weight > 100.0 {
            errors.push(format!(
                "entries: total weight {}% exceeds 100%",
                total_weight
            ));
        }
        if total_weight == 0.0 {
            errors.push("entries: total weight is zero".to_string());
        }
    }

    let goal = worksheet.goal.as_deref().map(str::trim).filter(|g| !g.is_empty());
    let remaining = worksheet
        .remaining_weight
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());

    if let Some(goal) = goal {
        if parse_grade(goal, config.scheme).is_none() {
            errors.push(format!(
                "goal: invalid '{}' for {} scheme",
                goal, config.scheme
            ));
        }
    }
    if let Some(remaining) = remaining {
        if !matches!(parse_weight(remaining), Some(w) if w > 0.0) {
            errors.push(format!(
                "remaining_weight: invalid '{}' - must be a positive number",
                remaining
            ));
        }
    }
    match (goal, remaining) {
        (Some(_), None) => errors.push("goal: ignored without remaining_weight".to_string()),
        (None, Some(_)) => errors.push("remaining_weight: ignored without goal".to_string()),
        _ => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
