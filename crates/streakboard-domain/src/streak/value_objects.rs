use serde::{Deserialize, Serialize};

/// What one recorded activity did to the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakTransition {
    /// First qualifying activity of a fresh record
    Started,
    /// Next calendar day, streak incremented
    Continued,
    /// Gap of more than one calendar day, streak reset to zero
    Broken,
    /// Already counted today
    SameDay,
    /// Record is frozen; the day is protected, not counted
    Protected,
}

impl StreakTransition {
    /// Whether the activity advanced the streak count
    pub fn is_counted(&self) -> bool {
        matches!(self, StreakTransition::Started | StreakTransition::Continued)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StreakTransition::Started => "started",
            StreakTransition::Continued => "continued",
            StreakTransition::Broken => "broken",
            StreakTransition::SameDay => "same_day",
            StreakTransition::Protected => "protected",
        }
    }
}

impl std::fmt::Display for StreakTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivityOutcome {
    pub transition: StreakTransition,
    pub streak_count: u32,
    pub previous_rating: f64,
    pub current_rating: f64,
}

impl ActivityOutcome {
    pub fn rating_changed(&self) -> bool {
        self.previous_rating != self.current_rating
    }
}
