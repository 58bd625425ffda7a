use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::grading::{
    aggregate, AggregationResult, GoalProjection, GradeEntry, GradeError, GradingConfig,
};

/// A set of graded rows plus an optional goal for the rest of the course.
///
/// Example YAML:
/// ```yaml
/// entries:
///   - { label: "Homework 1", grade: "A", weight: "5" }
///   - { label: "Project", grade: "B", weight: "20" }
/// goal: "B+"
/// remaining_weight: "55"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Worksheet {
    #[serde(default)]
    pub entries: Vec<GradeEntry>,

    /// Target overall grade (letter, or number in mixed scheme).
    #[serde(default)]
    pub goal: Option<String>,

    /// Weight of work not yet graded.
    #[serde(default)]
    pub remaining_weight: Option<String>,
}

/// Aggregation result plus the goal projection, if one was requested.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GradeReport {
    /// Settings the report was computed under.
    pub grading: GradingConfig,
    pub result: AggregationResult,
    #[serde(default)]
    pub projection: Option<GoalProjection>,
}

impl Worksheet {
    pub fn new(entries: Vec<GradeEntry>) -> Self {
        Self {
            entries,
            goal: None,
            remaining_weight: None,
        }
    }

    pub fn with_goal(mut self, goal: Option<String>, remaining_weight: Option<String>) -> Self {
        if goal.is_some() {
            self.goal = goal;
        }
        if remaining_weight.is_some() {
            self.remaining_weight = remaining_weight;
        }
        self
    }

    /// Aggregate the entries and, when both goal and remaining weight are
    /// present, attach the projection.
    pub fn evaluate(&self, config: &GradingConfig) -> Result<GradeReport, GradeError> {
        let result = aggregate(&self.entries, config)?;
        let projection = match (self.goal.as_deref(), self.remaining_weight.as_deref()) {
            (Some(goal), Some(remaining)) => result.project_goal(goal, remaining, config.scheme),
            _ => None,
        };
        Ok(GradeReport {
            grading: *config,
            result,
            projection,
        })
    }
}

/// Load a worksheet from a YAML file.
pub fn load_worksheet(path: &Path) -> Result<Worksheet> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read worksheet at {}", path.display()))?;

    let worksheet: Worksheet = serde_saphyr::from_str(&content)
        .with_context(|| format!("Failed to parse worksheet: invalid YAML in {}", path.display()))?;

    tracing::debug!(
        path = %path.display(),
        rows = worksheet.entries.len(),
        "loaded worksheet"
    );
    Ok(worksheet)
}
