use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::DomainError;

/// Banded view of a rating score.
///
/// Always derived from the numeric score, never stored next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingLabel {
    Novice,
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl RatingLabel {
    pub const ALL: [RatingLabel; 5] = [
        RatingLabel::Novice,
        RatingLabel::Beginner,
        RatingLabel::Intermediate,
        RatingLabel::Advanced,
        RatingLabel::Expert,
    ];

    pub fn from_score(score: f64) -> Self {
        match score {
            s if s < 25.0 => RatingLabel::Novice,
            s if s < 50.0 => RatingLabel::Beginner,
            s if s < 75.0 => RatingLabel::Intermediate,
            s if s < 90.0 => RatingLabel::Advanced,
            _ => RatingLabel::Expert,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RatingLabel::Novice => "novice",
            RatingLabel::Beginner => "beginner",
            RatingLabel::Intermediate => "intermediate",
            RatingLabel::Advanced => "advanced",
            RatingLabel::Expert => "expert",
        }
    }
}

impl fmt::Display for RatingLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RatingLabel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RatingLabel::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::Validation(format!("Unknown rating label: {}", s)))
    }
}
