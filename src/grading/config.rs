use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How grade tokens are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeScheme {
    /// Only letter grades from the grading scale are accepted.
    #[default]
    Letters,
    /// Letter grades or plain numbers (points, percentages).
    #[serde(alias = "mix")]
    Mixed,
}

/// How weight tokens are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightFormat {
    /// Weights are percentages of the course grade and may not exceed 100 in total.
    #[default]
    Percentage,
    /// Weights are point values with no upper bound on their total.
    Points,
}

/// Grading configuration passed explicitly to every engine call.
///
/// Example YAML:
/// ```yaml
/// grading:
///   scheme: mixed
///   weight_format: points
/// ```
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GradingConfig {
    #[serde(default)]
    pub scheme: GradeScheme,

    #[serde(default)]
    pub weight_format: WeightFormat,
}

impl GradingConfig {
    pub fn new(scheme: GradeScheme, weight_format: WeightFormat) -> Self {
        Self {
            scheme,
            weight_format,
        }
    }
}

impl FromStr for GradeScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "letters" => Ok(GradeScheme::Letters),
            "mixed" | "mix" => Ok(GradeScheme::Mixed),
            other => Err(format!(
                "unknown grade scheme '{}' (expected 'letters' or 'mixed')",
                other
            )),
        }
    }
}

impl fmt::Display for GradeScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradeScheme::Letters => f.write_str("letters"),
            GradeScheme::Mixed => f.write_str("mixed"),
        }
    }
}

impl FromStr for WeightFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "percentage" | "percent" => Ok(WeightFormat::Percentage),
            "points" => Ok(WeightFormat::Points),
            other => Err(format!(
                "unknown weight format '{}' (expected 'percentage' or 'points')",
                other
            )),
        }
    }
}

impl fmt::Display for WeightFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightFormat::Percentage => f.write_str("percentage"),
            WeightFormat::Points => f.write_str("points"),
        }
    }
}
