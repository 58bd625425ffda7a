use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A letter grade, ordered from highest (`A+`) to lowest (`F`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "D-")]
    DMinus,
    #[serde(rename = "F")]
    F,
}

/// Grading scale: each letter and the score it stands for when entered as a grade.
/// Scores never increase going down the table.
pub static GRADING_SCALE: [(LetterGrade, f64); 13] = [
    (LetterGrade::APlus, 100.0),
    (LetterGrade::A, 95.0),
    (LetterGrade::AMinus, 90.0),
    (LetterGrade::BPlus, 87.0),
    (LetterGrade::B, 83.0),
    (LetterGrade::BMinus, 80.0),
    (LetterGrade::CPlus, 77.0),
    (LetterGrade::C, 73.0),
    (LetterGrade::CMinus, 70.0),
    (LetterGrade::DPlus, 67.0),
    (LetterGrade::D, 65.0),
    (LetterGrade::DMinus, 60.0),
    (LetterGrade::F, 0.0),
];

/// Minimum score for each letter, highest threshold first.
/// Anything below the last threshold is an `F`.
pub static LETTER_BOUNDARIES: [(f64, LetterGrade); 12] = [
    (97.0, LetterGrade::APlus),
    (93.0, LetterGrade::A),
    (90.0, LetterGrade::AMinus),
    (87.0, LetterGrade::BPlus),
    (83.0, LetterGrade::B),
    (80.0, LetterGrade::BMinus),
    (77.0, LetterGrade::CPlus),
    (73.0, LetterGrade::C),
    (70.0, LetterGrade::CMinus),
    (67.0, LetterGrade::DPlus),
    (65.0, LetterGrade::D),
    (60.0, LetterGrade::DMinus),
];

impl LetterGrade {
    /// All letters in descending rank.
    pub fn all() -> impl Iterator<Item = LetterGrade> {
        GRADING_SCALE.iter().map(|(letter, _)| *letter)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LetterGrade::APlus => "A+",
            LetterGrade::A => "A",
            LetterGrade::AMinus => "A-",
            LetterGrade::BPlus => "B+",
            LetterGrade::B => "B",
            LetterGrade::BMinus => "B-",
            LetterGrade::CPlus => "C+",
            LetterGrade::C => "C",
            LetterGrade::CMinus => "C-",
            LetterGrade::DPlus => "D+",
            LetterGrade::D => "D",
            LetterGrade::DMinus => "D-",
            LetterGrade::F => "F",
        }
    }

    /// Representative score from the grading scale.
    pub fn score(&self) -> f64 {
        match self {
            LetterGrade::APlus => 100.0,
            LetterGrade::A => 95.0,
            LetterGrade::AMinus => 90.0,
            LetterGrade::BPlus => 87.0,
            LetterGrade::B => 83.0,
            LetterGrade::BMinus => 80.0,
            LetterGrade::CPlus => 77.0,
            LetterGrade::C => 73.0,
            LetterGrade::CMinus => 70.0,
            LetterGrade::DPlus => 67.0,
            LetterGrade::D => 65.0,
            LetterGrade::DMinus => 60.0,
            LetterGrade::F => 0.0,
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LetterGrade {
    type Err = String;

    /// Case-insensitive match against the grading scale, ignoring surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        LetterGrade::all()
            .find(|letter| letter.as_str() == normalized)
            .ok_or_else(|| format!("unknown letter grade '{}'", s.trim()))
    }
}

/// Map a numeric score to its letter. Total over all inputs: scores above the
/// scale map to `A+`, negative scores and NaN map to `F`.
pub fn letter_for(score: f64) -> LetterGrade {
    LETTER_BOUNDARIES
        .iter()
        .find(|(min, _)| score >= *min)
        .map(|(_, letter)| *letter)
        .unwrap_or(LetterGrade::F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_is_non_increasing() {
        for pair in GRADING_SCALE.windows(2) {
            assert!(pair[0].1 >= pair[1].1, "{} before {}", pair[0].0, pair[1].0);
        }
        assert_eq!(LetterGrade::F.score(), 0.0);
    }

    #[test]
    fn test_score_matches_scale_table() {
        for (letter, score) in GRADING_SCALE.iter() {
            assert_eq!(letter.score(), *score, "letter {}", letter);
        }
    }

    #[test]
    fn test_boundaries_strictly_descending() {
        for pair in LETTER_BOUNDARIES.windows(2) {
            assert!(pair[0].0 > pair[1].0);
        }
    }

    #[test]
    fn test_letter_for_band_edges() {
        assert_eq!(letter_for(97.0), LetterGrade::APlus);
        assert_eq!(letter_for(96.99), LetterGrade::A);
        assert_eq!(letter_for(95.0), LetterGrade::A);
        assert_eq!(letter_for(87.0), LetterGrade::BPlus);
        assert_eq!(letter_for(86.1), LetterGrade::B);
        assert_eq!(letter_for(83.0), LetterGrade::B);
        assert_eq!(letter_for(82.99), LetterGrade::BMinus);
        assert_eq!(letter_for(60.0), LetterGrade::DMinus);
        assert_eq!(letter_for(59.99), LetterGrade::F);
        assert_eq!(letter_for(0.0), LetterGrade::F);
    }

    #[test]
    fn test_letter_for_out_of_scale() {
        assert_eq!(letter_for(150.0), LetterGrade::APlus);
        assert_eq!(letter_for(-20.0), LetterGrade::F);
        assert_eq!(letter_for(f64::NAN), LetterGrade::F);
    }

    #[test]
    fn test_every_letter_round_trips_through_its_score() {
        for letter in LetterGrade::all() {
            assert_eq!(letter_for(letter.score()), letter, "letter {}", letter);
        }
    }

    #[test]
    fn test_from_str_case_insensitive() {
        assert_eq!("b+".parse::<LetterGrade>(), Ok(LetterGrade::BPlus));
        assert_eq!("  a- ".parse::<LetterGrade>(), Ok(LetterGrade::AMinus));
        assert_eq!("f".parse::<LetterGrade>(), Ok(LetterGrade::F));
        assert!("E".parse::<LetterGrade>().is_err());
        assert!("A++".parse::<LetterGrade>().is_err());
    }

    #[test]
    fn test_serializes_as_display_text() {
        let json = serde_json::to_string(&LetterGrade::BMinus).unwrap();
        assert_eq!(json, "\"B-\"");
        let parsed: LetterGrade = serde_json::from_str("\"A+\"").unwrap();
        assert_eq!(parsed, LetterGrade::APlus);
    }
}
