use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use streakboard_domain::activity::ActivityType;
use streakboard_domain::freeze::FreezeGrant;
use streakboard_domain::rating::RatingLabel;
use streakboard_domain::streak::{StreakTransition, UserStreakRecord};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecordedDto {
    pub user_id: String,
    pub activity_type: ActivityType,
    pub recorded_at: DateTime<Utc>,
    pub transition: StreakTransition,
    pub counted: bool,
    pub streak_count: u32,
    pub previous_rating: f64,
    pub current_rating: f64,
    pub rating_label: RatingLabel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStreakInfoDto {
    pub user_id: String,
    pub streak_count: u32,
    pub tier_id: Option<String>,
    pub tier_name: Option<String>,
    pub current_rating: f64,
    pub max_rating: f64,
    pub rating_label: RatingLabel,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub is_frozen: bool,
    pub freeze_ends_at: Option<DateTime<Utc>>,
    pub active_freeze: Option<FreezeGrant>,
    pub freezes_used_in_period: u32,
    pub last_freeze_at: Option<DateTime<Utc>>,
}

impl UserStreakInfoDto {
    /// View of `record` at `now`; an expired freeze reads as not frozen
    pub fn from_record(
        record: &UserStreakRecord,
        tier_name: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let is_frozen = record.is_frozen_at(now);
        Self {
            user_id: record.user_id().to_string(),
            streak_count: record.streak_count(),
            tier_id: record.current_tier_id().map(|id| id.to_string()),
            tier_name,
            current_rating: record.current_rating(),
            max_rating: record.max_rating(),
            rating_label: RatingLabel::from_score(record.current_rating()),
            last_activity_at: record.last_activity_at(),
            is_frozen,
            freeze_ends_at: if is_frozen { record.freeze_ends_at() } else { None },
            active_freeze: if is_frozen {
                record.active_freeze().cloned()
            } else {
                None
            },
            freezes_used_in_period: record.freezes_used_in_period(),
            last_freeze_at: record.last_freeze_at(),
        }
    }
}
