use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RatingLabel;
use crate::shared::{DomainError, StreakTierId};
use crate::streak::{StreakTier, UserStreakRecord};

pub const MAX_SCORE: f64 = 100.0;

/// Tuning values of the rating formula.
///
/// Defaults reproduce the legacy product behavior: a linear ramp that
/// saturates at a 30-day streak and a triangular-number penalty once more
/// than one day has passed without activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    pub base_points_per_day: f64,
    pub saturation_days: u32,
    pub streak_multiplier_per_day: f64,
    pub max_streak_multiplier: f64,
    pub penalty_points_per_day: f64,
    pub penalty_grace_days: u32,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            base_points_per_day: 3.33,
            saturation_days: 30,
            streak_multiplier_per_day: 0.033,
            max_streak_multiplier: 2.0,
            penalty_points_per_day: 2.0,
            penalty_grace_days: 1,
        }
    }
}

impl RatingConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        let non_negative = [
            ("base_points_per_day", self.base_points_per_day),
            ("streak_multiplier_per_day", self.streak_multiplier_per_day),
            ("penalty_points_per_day", self.penalty_points_per_day),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(DomainError::Validation(format!(
                    "rating.{} must be a non-negative number",
                    name
                )));
            }
        }
        if !self.max_streak_multiplier.is_finite() || self.max_streak_multiplier < 1.0 {
            return Err(DomainError::Validation(
                "rating.max_streak_multiplier must be at least 1.0".to_string(),
            ));
        }
        if self.saturation_days == 0 {
            return Err(DomainError::Validation(
                "rating.saturation_days must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Every intermediate value of one rating computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingBreakdown {
    pub base_score: f64,
    pub streak_multiplier: f64,
    pub tier_multiplier: f64,
    pub penalty_points: f64,
    pub final_score: f64,
    pub rating_label: RatingLabel,
    pub streak_count: u32,
    pub tier_id: Option<StreakTierId>,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub days_since_last_activity: i64,
    pub computed_at: DateTime<Utc>,
}

/// Pure rating formula; holds only its configuration.
#[derive(Debug, Clone, Default)]
pub struct RatingCalculator {
    config: RatingConfig,
}

impl RatingCalculator {
    pub fn new(config: RatingConfig) -> Result<Self, DomainError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RatingConfig {
        &self.config
    }

    pub fn base_score(&self, streak_count: u32) -> f64 {
        if streak_count == 0 {
            return 0.0;
        }
        if streak_count >= self.config.saturation_days {
            return MAX_SCORE;
        }
        bounded(streak_count as f64 * self.config.base_points_per_day)
    }

    pub fn streak_multiplier(&self, streak_count: u32) -> f64 {
        let max = self.config.max_streak_multiplier;
        if streak_count == 0 {
            return 1.0;
        }
        if streak_count >= self.config.saturation_days {
            return max;
        }
        (1.0 + streak_count as f64 * self.config.streak_multiplier_per_day).clamp(1.0, max)
    }

    /// Sum of `i * penalty_points_per_day` for `i` in `1..=days`, once past the grace period
    pub fn penalty(&self, days_since_last_activity: i64) -> f64 {
        if days_since_last_activity <= self.config.penalty_grace_days as i64 {
            return 0.0;
        }
        let days = days_since_last_activity as f64;
        self.config.penalty_points_per_day * days * (days + 1.0) / 2.0
    }

    pub fn compute(
        &self,
        record: &UserStreakRecord,
        tier: &StreakTier,
        now: DateTime<Utc>,
    ) -> RatingBreakdown {
        let streak_count = record.streak_count();
        let days_since_last_activity = record.days_since_activity(now);

        let base_score = self.base_score(streak_count);
        let streak_multiplier = self.streak_multiplier(streak_count);
        let tier_multiplier = tier.rating_multiplier();
        let penalty_points = self.penalty(days_since_last_activity);

        let final_score =
            bounded(base_score * streak_multiplier * tier_multiplier - penalty_points);

        RatingBreakdown {
            base_score,
            streak_multiplier,
            tier_multiplier,
            penalty_points,
            final_score,
            rating_label: RatingLabel::from_score(final_score),
            streak_count,
            tier_id: record.current_tier_id().cloned(),
            last_activity_at: record.last_activity_at(),
            days_since_last_activity,
            computed_at: now,
        }
    }
}

fn bounded(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, MAX_SCORE)
}
