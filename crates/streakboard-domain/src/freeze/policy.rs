use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::FreezeConfig;
use crate::clock::ReferenceTimezone;
use crate::shared::{DomainError, FreezeId, UserId};
use crate::streak::UserStreakRecord;

/// Which freeze rule a request violated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum FreezePrecondition {
    #[error("streak count {actual} is below the {required} days required to freeze")]
    InsufficientStreak { required: u32, actual: u32 },

    #[error("all {max} freezes of the current period are used ({used} used)")]
    FreezeLimitReached { used: u32, max: u32 },

    #[error("requested {requested} days exceeds the {max}-day freeze limit")]
    DurationTooLong { requested: u32, max: u32 },
}

/// One granted freeze period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreezeGrant {
    pub id: FreezeId,
    pub user_id: UserId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// Position of this freeze within its period (1-based)
    pub freeze_number: u32,
}

/// Freeze sub-state of one record as seen at a given instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreezeStatus {
    pub user_id: UserId,
    pub is_frozen: bool,
    pub freeze_ends_at: Option<DateTime<Utc>>,
    pub active_freeze: Option<FreezeGrant>,
    pub freezes_used_in_period: u32,
    pub freezes_remaining: u32,
    pub last_freeze_at: Option<DateTime<Utc>>,
    pub can_freeze: bool,
}

/// Stateless freeze rules evaluated against a record and the shared config.
pub struct FreezePolicy;

impl FreezePolicy {
    /// Validate a freeze request without touching the record.
    ///
    /// Rules are checked in a fixed order so each request reports exactly one
    /// violation: already frozen, zero duration, streak minimum, period
    /// allowance, duration ceiling. The streak minimum is measured against the
    /// streak as of `now`, so a lapsed streak counts as zero.
    pub fn check(
        record: &UserStreakRecord,
        config: &FreezeConfig,
        duration_days: u32,
        now: DateTime<Utc>,
        timezone: ReferenceTimezone,
    ) -> Result<(), DomainError> {
        if record.is_frozen_at(now) {
            return Err(DomainError::AlreadyInState(format!(
                "Streak for user {} is already frozen",
                record.user_id()
            )));
        }

        if duration_days == 0 {
            return Err(DomainError::Validation(
                "Freeze duration must be at least one day".to_string(),
            ));
        }

        let streak = record.effective_streak_count(now, timezone);
        if streak < config.min_streak_count_to_freeze {
            return Err(DomainError::PreconditionFailed(
                FreezePrecondition::InsufficientStreak {
                    required: config.min_streak_count_to_freeze,
                    actual: streak,
                },
            ));
        }

        let used = Self::freezes_used(record, config, now);
        if used >= config.max_freezes_per_period {
            return Err(DomainError::PreconditionFailed(
                FreezePrecondition::FreezeLimitReached {
                    used,
                    max: config.max_freezes_per_period,
                },
            ));
        }

        if duration_days > config.max_freeze_duration_days {
            return Err(DomainError::PreconditionFailed(
                FreezePrecondition::DurationTooLong {
                    requested: duration_days,
                    max: config.max_freeze_duration_days,
                },
            ));
        }

        Ok(())
    }

    /// Whether the allowance period that `record` counts against has run out
    pub fn period_elapsed(
        record: &UserStreakRecord,
        config: &FreezeConfig,
        now: DateTime<Utc>,
    ) -> bool {
        if config.period_days == 0 {
            return false;
        }
        match record.freeze_period_started_at() {
            None => true,
            Some(started) => now - started >= Duration::days(config.period_days as i64),
        }
    }

    /// Freezes counted against the period that is current at `now`
    pub fn freezes_used(
        record: &UserStreakRecord,
        config: &FreezeConfig,
        now: DateTime<Utc>,
    ) -> u32 {
        if Self::period_elapsed(record, config, now) {
            0
        } else {
            record.freezes_used_in_period()
        }
    }

    pub fn status(
        record: &UserStreakRecord,
        config: &FreezeConfig,
        now: DateTime<Utc>,
        timezone: ReferenceTimezone,
    ) -> FreezeStatus {
        let used = Self::freezes_used(record, config, now);
        let is_frozen = record.is_frozen_at(now);

        FreezeStatus {
            user_id: record.user_id().clone(),
            is_frozen,
            freeze_ends_at: if is_frozen { record.freeze_ends_at() } else { None },
            active_freeze: if is_frozen {
                record.active_freeze().cloned()
            } else {
                None
            },
            freezes_used_in_period: used,
            freezes_remaining: config.max_freezes_per_period.saturating_sub(used),
            last_freeze_at: record.last_freeze_at(),
            can_freeze: Self::check(record, config, 1, now, timezone).is_ok(),
        }
    }
}
