use serde::{Deserialize, Serialize};

use crate::shared::DomainError;

/// Process-wide freeze rules, read-only once the engine is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreezeConfig {
    /// Minimum streak before a freeze may be requested
    pub min_streak_count_to_freeze: u32,
    /// Freezes allowed inside one period
    pub max_freezes_per_period: u32,
    /// Longest single freeze, in days
    pub max_freeze_duration_days: u32,
    /// Length of the freeze allowance period in days; 0 never resets
    pub period_days: u32,
}

impl Default for FreezeConfig {
    fn default() -> Self {
        Self {
            min_streak_count_to_freeze: 7,
            max_freezes_per_period: 3,
            max_freeze_duration_days: 7,
            period_days: 30,
        }
    }
}

impl FreezeConfig {
    /// Upper bound accepted for a single freeze, about ten years
    pub const MAX_FREEZE_DURATION_DAYS: u32 = 3650;

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_freeze_duration_days == 0 {
            return Err(DomainError::Validation(
                "freeze.max_freeze_duration_days must be positive".to_string(),
            ));
        }
        if self.max_freeze_duration_days > Self::MAX_FREEZE_DURATION_DAYS {
            return Err(DomainError::Validation(format!(
                "freeze.max_freeze_duration_days must not exceed {}",
                Self::MAX_FREEZE_DURATION_DAYS
            )));
        }
        Ok(())
    }
}
