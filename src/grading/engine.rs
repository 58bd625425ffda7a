use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::config::{GradeScheme, GradingConfig, WeightFormat};
use super::error::GradeError;
use super::parser::{parse_grade, parse_weight};
use super::scale::{letter_for, LetterGrade};

/// One row of input. Tokens are kept as typed so results can echo them back.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GradeEntry {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub weight: String,
}

impl GradeEntry {
    pub fn new(
        label: impl Into<String>,
        grade: impl Into<String>,
        weight: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            grade: grade.into(),
            weight: weight.into(),
        }
    }

    /// True when the row has both a grade and a weight and takes part in aggregation.
    pub fn is_complete(&self) -> bool {
        !self.grade.trim().is_empty() && !self.weight.trim().is_empty()
    }

    /// Label used in messages; blank labels read as "unnamed row".
    pub fn display_label(&self) -> &str {
        let label = self.label.trim();
        if label.is_empty() {
            "unnamed row"
        } else {
            label
        }
    }
}

impl FromStr for GradeEntry {
    type Err = String;

    /// Parse `LABEL:GRADE:WEIGHT` or `GRADE:WEIGHT`. The label may itself contain colons.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.rsplitn(3, ':');
        let weight = parts.next().unwrap_or_default();
        let grade = parts
            .next()
            .ok_or_else(|| format!("expected LABEL:GRADE:WEIGHT or GRADE:WEIGHT, got '{}'", s))?;
        let label = parts.next().unwrap_or_default();
        Ok(GradeEntry::new(label.trim(), grade.trim(), weight.trim()))
    }
}

/// Outcome of a weighted-average calculation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AggregationResult {
    /// Weighted average rounded to one decimal place.
    pub average: f64,
    pub raw_average: f64,
    pub letter: LetterGrade,
    pub total_weight: f64,
    pub weighted_sum: f64,
    /// Rows that contributed, in input order.
    pub entries: Vec<GradeEntry>,
}

/// How much is needed on the remaining work to reach a goal average.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GoalProjection {
    pub goal: f64,
    pub remaining_weight: f64,
    /// Unrounded required score.
    pub required: f64,
    /// The required score is above 100.
    pub unattainable: bool,
}

/// Float drift allowed when checking that percentage weights stay within 100.
const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Round half away from zero to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Weighted average of every complete entry.
///
/// Rows missing a grade or a weight are skipped. Sums are accumulated in
/// input order. The letter is chosen from the unrounded average; only the
/// reported `average` is rounded.
pub fn aggregate(
    entries: &[GradeEntry],
    config: &GradingConfig,
) -> Result<AggregationResult, GradeError> {
    let used: Vec<GradeEntry> = entries.iter().filter(|e| e.is_complete()).cloned().collect();
    let skipped = entries.len() - used.len();
    if skipped > 0 {
        tracing::debug!(skipped, "ignoring rows without both grade and weight");
    }

    if used.is_empty() {
        return Err(GradeError::EmptyInput);
    }

    let mut total_weight = 0.0;
    let mut weighted_sum = 0.0;

    for entry in &used {
        let score = parse_grade(&entry.grade, config.scheme);
        let weight = parse_weight(&entry.weight);
        let (Some(score), Some(weight)) = (score, weight) else {
            return Err(GradeError::InvalidEntry(entry.display_label().to_string()));
        };

        total_weight += weight;
        weighted_sum += score * weight;
        if !(total_weight.is_finite() && weighted_sum.is_finite()) {
            return Err(GradeError::InvalidEntry(entry.display_label().to_string()));
        }
    }

    if config.weight_format == WeightFormat::Percentage && total_weight > 100.0 + WEIGHT_TOLERANCE
    {
        return Err(GradeError::WeightOverflow {
            total: total_weight,
        });
    }

    if total_weight == 0.0 {
        return Err(GradeError::ZeroWeight);
    }

    let raw_average = weighted_sum / total_weight;
    let average = round_one_decimal(raw_average);
    if !average.is_finite() {
        return Err(GradeError::OutOfRange {
            field: "weighted average",
        });
    }
    tracing::debug!(
        rows = used.len(),
        total_weight,
        weighted_sum,
        raw_average,
        "aggregated grades"
    );

    Ok(AggregationResult {
        average,
        raw_average,
        letter: letter_for(raw_average),
        total_weight,
        weighted_sum,
        entries: used,
    })
}

/// Score needed on the remaining weight so the overall average reaches `goal_score`.
///
/// Solves `goal = (weighted_sum + required * remaining) / (total + remaining)`.
/// `remaining_weight` must be positive.
pub fn required_on_remaining(
    weighted_sum_so_far: f64,
    total_weight_so_far: f64,
    remaining_weight: f64,
    goal_score: f64,
) -> f64 {
    (goal_score * (total_weight_so_far + remaining_weight) - weighted_sum_so_far) / remaining_weight
}

impl AggregationResult {
    /// Project the score needed on remaining work to hit a goal.
    ///
    /// Returns `None` when either token is blank, the goal does not parse
    /// under `scheme`, or the remaining weight is not positive. An
    /// unattainable goal is flagged on the projection, not reported as an error.
    pub fn project_goal(
        &self,
        goal_token: &str,
        remaining_token: &str,
        scheme: GradeScheme,
    ) -> Option<GoalProjection> {
        if goal_token.trim().is_empty() || remaining_token.trim().is_empty() {
            return None;
        }

        let Some(goal) = parse_grade(goal_token, scheme) else {
            tracing::debug!(goal = goal_token, "goal does not parse, skipping projection");
            return None;
        };
        let remaining_weight = match parse_weight(remaining_token) {
            Some(w) if w > 0.0 => w,
            _ => {
                tracing::debug!(
                    remaining = remaining_token,
                    "remaining weight is not positive, skipping projection"
                );
                return None;
            }
        };

        let required = required_on_remaining(
            self.weighted_sum,
            self.total_weight,
            remaining_weight,
            goal,
        );
        if !required.is_finite() {
            tracing::debug!(goal, remaining_weight, "required score overflows, skipping projection");
            return None;
        }

        Some(GoalProjection {
            goal,
            remaining_weight,
            required,
            unattainable: required > 100.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters_pct() -> GradingConfig {
        GradingConfig::new(GradeScheme::Letters, WeightFormat::Percentage)
    }

    fn sample_entries() -> Vec<GradeEntry> {
        vec![
            GradeEntry::new("HW1", "A", "5"),
            GradeEntry::new("Project", "B", "20"),
            GradeEntry::new("Midterm", "B+", "20"),
        ]
    }

    #[test]
    fn test_sample_course() {
        let result = aggregate(&sample_entries(), &letters_pct()).unwrap();
        assert_eq!(result.weighted_sum, 3875.0);
        assert_eq!(result.total_weight, 45.0);
        assert_eq!(result.average, 86.1);
        assert_eq!(result.letter, LetterGrade::B);
        assert_eq!(result.entries.len(), 3);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(aggregate(&[], &letters_pct()), Err(GradeError::EmptyInput));
        let blank = vec![GradeEntry::new("", "", "")];
        assert_eq!(aggregate(&blank, &letters_pct()), Err(GradeError::EmptyInput));
    }

    #[test]
    fn test_incomplete_rows_are_skipped() {
        let mut entries = sample_entries();
        entries.push(GradeEntry::new("Final", "", "30"));
        entries.push(GradeEntry::new("Quiz", "C", " "));
        let result = aggregate(&entries, &letters_pct()).unwrap();
        assert_eq!(result.entries.len(), 3);
        assert_eq!(result.average, 86.1);
    }

    #[test]
    fn test_invalid_grade_names_row() {
        let entries = vec![
            GradeEntry::new("HW1", "A", "5"),
            GradeEntry::new("Lab", "92", "10"),
        ];
        assert_eq!(
            aggregate(&entries, &letters_pct()),
            Err(GradeError::InvalidEntry("Lab".to_string()))
        );
    }

    #[test]
    fn test_invalid_weight_on_unnamed_row() {
        let entries = vec![GradeEntry::new("", "A", "-5")];
        assert_eq!(
            aggregate(&entries, &letters_pct()),
            Err(GradeError::InvalidEntry("unnamed row".to_string()))
        );
    }

    #[test]
    fn test_percentage_overflow() {
        let entries = vec![
            GradeEntry::new("A", "A", "50"),
            GradeEntry::new("B", "B", "51"),
        ];
        assert!(matches!(
            aggregate(&entries, &letters_pct()),
            Err(GradeError::WeightOverflow { .. })
        ));
    }

    #[test]
    fn test_overflow_message_is_rounded() {
        let entries = vec![
            GradeEntry::new("A", "A", "60"),
            GradeEntry::new("B", "B", "41"),
        ];
        let err = aggregate(&entries, &letters_pct()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "total weight cannot exceed 100% (got 101.0%)"
        );
    }

    #[test]
    fn test_percentage_float_drift_is_not_overflow() {
        let entries = vec![
            GradeEntry::new("a", "A", "33.3"),
            GradeEntry::new("b", "B", "33.3"),
            GradeEntry::new("c", "C", "33.4"),
            GradeEntry::new("d", "A", "0.1"),
        ];
        assert!(matches!(
            aggregate(&entries, &letters_pct()),
            Err(GradeError::WeightOverflow { .. })
        ));
        let result = aggregate(&entries[..3], &letters_pct()).unwrap();
        assert!((result.total_weight - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_overflowing_product_names_row() {
        let config = GradingConfig::new(GradeScheme::Mixed, WeightFormat::Points);
        let entries = vec![
            GradeEntry::new("HW", "90", "5"),
            GradeEntry::new("x", "1e308", "10"),
        ];
        assert_eq!(
            aggregate(&entries, &config),
            Err(GradeError::InvalidEntry("x".to_string()))
        );
    }

    #[test]
    fn test_average_too_large_to_round() {
        let config = GradingConfig::new(GradeScheme::Mixed, WeightFormat::Points);
        let entries = vec![GradeEntry::new("x", "1.7e308", "1")];
        assert_eq!(
            aggregate(&entries, &config),
            Err(GradeError::OutOfRange {
                field: "weighted average"
            })
        );
    }

    #[test]
    fn test_projection_skipped_when_required_overflows() {
        let result = aggregate(&sample_entries(), &letters_pct()).unwrap();
        assert!(result.project_goal("1e308", "55", GradeScheme::Mixed).is_none());
    }

    #[test]
    fn test_percentage_exactly_hundred_succeeds() {
        let entries = vec![
            GradeEntry::new("A", "A", "50"),
            GradeEntry::new("B", "B", "50"),
        ];
        let result = aggregate(&entries, &letters_pct()).unwrap();
        assert_eq!(result.average, 89.0);
        assert_eq!(result.letter, LetterGrade::BPlus);
    }

    #[test]
    fn test_points_mode_allows_large_totals() {
        let config = GradingConfig::new(GradeScheme::Mixed, WeightFormat::Points);
        let entries = vec![
            GradeEntry::new("Exam 1", "80", "150"),
            GradeEntry::new("Exam 2", "90", "150"),
        ];
        let result = aggregate(&entries, &config).unwrap();
        assert_eq!(result.total_weight, 300.0);
        assert_eq!(result.average, 85.0);
        assert_eq!(result.letter, LetterGrade::B);
    }

    #[test]
    fn test_zero_weight() {
        let entries = vec![GradeEntry::new("HW", "A", "0")];
        assert_eq!(aggregate(&entries, &letters_pct()), Err(GradeError::ZeroWeight));
    }

    #[test]
    fn test_permutation_invariant() {
        let config = GradingConfig::new(GradeScheme::Mixed, WeightFormat::Points);
        let entries = vec![
            GradeEntry::new("a", "91.3", "7"),
            GradeEntry::new("b", "C-", "13"),
            GradeEntry::new("c", "78.25", "3.5"),
            GradeEntry::new("d", "A+", "11"),
        ];
        let expected = aggregate(&entries, &config).unwrap();

        let orders = [[3, 2, 1, 0], [1, 3, 0, 2], [2, 0, 3, 1]];
        for order in orders {
            let permuted: Vec<GradeEntry> = order.iter().map(|i| entries[*i].clone()).collect();
            let result = aggregate(&permuted, &config).unwrap();
            assert_eq!(result.average, expected.average);
            assert_eq!(result.letter, expected.letter);
        }
    }

    #[test]
    fn test_letter_uses_unrounded_average() {
        let config = GradingConfig::new(GradeScheme::Mixed, WeightFormat::Points);
        let entries = vec![GradeEntry::new("x", "86.96", "1")];
        let result = aggregate(&entries, &config).unwrap();
        assert_eq!(result.average, 87.0);
        assert_eq!(result.letter, LetterGrade::B);
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_one_decimal(86.25), 86.3);
        assert_eq!(round_one_decimal(-2.25), -2.3);
        assert_eq!(round_one_decimal(73.333), 73.3);
    }

    #[test]
    fn test_required_on_remaining_formula() {
        // 45% done at 3875 weighted points, 55% left, goal 90
        let required = required_on_remaining(3875.0, 45.0, 55.0, 90.0);
        assert!((required - 93.1818).abs() < 1e-3);
    }

    #[test]
    fn test_projection_flags_unattainable_without_failing() {
        let result = aggregate(&sample_entries(), &letters_pct()).unwrap();
        let projection = result.project_goal("A+", "10", GradeScheme::Letters).unwrap();
        assert!(projection.required > 100.0);
        assert!(projection.unattainable);
        assert_eq!(result.average, 86.1);
    }

    #[test]
    fn test_projection_attainable() {
        let result = aggregate(&sample_entries(), &letters_pct()).unwrap();
        let projection = result.project_goal("B", "55", GradeScheme::Letters).unwrap();
        assert!(!projection.unattainable);
        assert_eq!(projection.goal, 83.0);
        assert_eq!(projection.remaining_weight, 55.0);
    }

    #[test]
    fn test_projection_skipped_on_bad_inputs() {
        let result = aggregate(&sample_entries(), &letters_pct()).unwrap();
        assert!(result.project_goal("", "55", GradeScheme::Letters).is_none());
        assert!(result.project_goal("B", "", GradeScheme::Letters).is_none());
        assert!(result.project_goal("B", "0", GradeScheme::Letters).is_none());
        assert!(result.project_goal("90", "55", GradeScheme::Letters).is_none());
        assert!(result.project_goal("90", "55", GradeScheme::Mixed).is_some());
    }

    #[test]
    fn test_entry_from_str() {
        let entry: GradeEntry = "Midterm Exam:B+:20".parse().unwrap();
        assert_eq!(entry, GradeEntry::new("Midterm Exam", "B+", "20"));

        let entry: GradeEntry = "A:5".parse().unwrap();
        assert_eq!(entry, GradeEntry::new("", "A", "5"));

        let entry: GradeEntry = "Unit 2: Vectors:88:10".parse().unwrap();
        assert_eq!(entry.label, "Unit 2: Vectors");
        assert_eq!(entry.grade, "88");

        assert!("A".parse::<GradeEntry>().is_err());
    }
}
