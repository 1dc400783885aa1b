use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{ActivityOutcome, StreakTransition, TierCatalog};
use crate::clock::ReferenceTimezone;
use crate::freeze::{FreezeConfig, FreezeGrant, FreezePolicy};
use crate::rating::{RatingBreakdown, RatingCalculator, MAX_SCORE};
use crate::shared::{DomainError, FreezeId, StreakTierId, UserId};

/// Per-user streak, rating and freeze state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStreakRecord {
    user_id: UserId,
    streak_count: u32,
    current_tier_id: Option<StreakTierId>,
    current_rating: f64,
    max_rating: f64,
    last_activity_at: Option<DateTime<Utc>>,
    is_frozen: bool,
    freeze_ends_at: Option<DateTime<Utc>>,
    active_freeze: Option<FreezeGrant>,
    freezes_used_in_period: u32,
    freeze_period_started_at: Option<DateTime<Utc>>,
    last_freeze_at: Option<DateTime<Utc>>,
    protected_through: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserStreakRecord {
    /// Fresh record: zero streak, no tier, not frozen
    pub fn new(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            streak_count: 0,
            current_tier_id: None,
            current_rating: 0.0,
            max_rating: 0.0,
            last_activity_at: None,
            is_frozen: false,
            freeze_ends_at: None,
            active_freeze: None,
            freezes_used_in_period: 0,
            freeze_period_started_at: None,
            last_freeze_at: None,
            protected_through: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder for restoring persisted state and for test fixtures
    pub fn builder(user_id: UserId) -> UserStreakRecordBuilder {
        UserStreakRecordBuilder {
            record: Self::new(user_id, Utc::now()),
        }
    }

    // Getters
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn streak_count(&self) -> u32 {
        self.streak_count
    }

    pub fn current_tier_id(&self) -> Option<&StreakTierId> {
        self.current_tier_id.as_ref()
    }

    pub fn current_rating(&self) -> f64 {
        self.current_rating
    }

    pub fn max_rating(&self) -> f64 {
        self.max_rating
    }

    pub fn last_activity_at(&self) -> Option<DateTime<Utc>> {
        self.last_activity_at
    }

    /// Raw frozen flag; see [`Self::is_frozen_at`] for the effective state
    pub fn is_frozen(&self) -> bool {
        self.is_frozen
    }

    pub fn freeze_ends_at(&self) -> Option<DateTime<Utc>> {
        self.freeze_ends_at
    }

    pub fn active_freeze(&self) -> Option<&FreezeGrant> {
        self.active_freeze.as_ref()
    }

    pub fn freezes_used_in_period(&self) -> u32 {
        self.freezes_used_in_period
    }

    pub fn freeze_period_started_at(&self) -> Option<DateTime<Utc>> {
        self.freeze_period_started_at
    }

    pub fn last_freeze_at(&self) -> Option<DateTime<Utc>> {
        self.last_freeze_at
    }

    pub fn protected_through(&self) -> Option<DateTime<Utc>> {
        self.protected_through
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Frozen and not yet past `freeze_ends_at`
    pub fn is_frozen_at(&self, now: DateTime<Utc>) -> bool {
        match (self.is_frozen, self.freeze_ends_at) {
            (true, Some(ends_at)) => now <= ends_at,
            _ => false,
        }
    }

    /// Latest instant the streak is known to be alive: the last activity or
    /// the end of the most recent freeze coverage, whichever is later.
    fn decay_anchor(&self) -> Option<DateTime<Utc>> {
        let expired_freeze_end = if self.is_frozen {
            self.freeze_ends_at
        } else {
            None
        };

        [self.coverage_anchor(), expired_freeze_end]
            .into_iter()
            .flatten()
            .max()
    }

    /// Decay anchor without the freeze currently on the record
    fn coverage_anchor(&self) -> Option<DateTime<Utc>> {
        [self.last_activity_at, self.protected_through]
            .into_iter()
            .flatten()
            .max()
    }

    /// More than one calendar day has passed since the streak was last alive
    /// and no running freeze covers `now`
    pub fn has_lapsed(&self, now: DateTime<Utc>, timezone: ReferenceTimezone) -> bool {
        if self.is_frozen_at(now) {
            return false;
        }
        self.decay_anchor()
            .map(|anchor| timezone.calendar_days_between(anchor, now) > 1)
            .unwrap_or(false)
    }

    /// Streak count as of `now`; a lapsed streak counts as zero
    pub fn effective_streak_count(&self, now: DateTime<Utc>, timezone: ReferenceTimezone) -> u32 {
        if self.has_lapsed(now, timezone) {
            0
        } else {
            self.streak_count
        }
    }

    /// Whole days elapsed since the decay anchor. A running freeze stops the
    /// count at the moment it started.
    pub fn days_since_activity(&self, now: DateTime<Utc>) -> i64 {
        let (anchor, until) = if self.is_frozen_at(now) {
            let started = self
                .active_freeze
                .as_ref()
                .map(|grant| grant.starts_at)
                .or(self.last_freeze_at);
            match started {
                Some(started) => (self.coverage_anchor(), started),
                None => return 0,
            }
        } else {
            (self.decay_anchor(), now)
        };

        match anchor {
            Some(anchor) => (until - anchor).num_days().max(0),
            None => 0,
        }
    }

    /// Reject records whose stored fields contradict each other
    pub fn check_integrity(&self) -> Result<(), DomainError> {
        let in_range = |value: f64| value.is_finite() && (0.0..=MAX_SCORE).contains(&value);

        if !in_range(self.current_rating) || !in_range(self.max_rating) {
            return Err(DomainError::InvalidState(format!(
                "Rating of user {} is outside [0, {}]",
                self.user_id, MAX_SCORE
            )));
        }
        if self.is_frozen && self.freeze_ends_at.is_none() {
            return Err(DomainError::InvalidState(format!(
                "User {} is frozen without a freeze end",
                self.user_id
            )));
        }
        if self.streak_count > 0 && self.last_activity_at.is_none() {
            return Err(DomainError::InvalidState(format!(
                "User {} has a streak but no recorded activity",
                self.user_id
            )));
        }
        Ok(())
    }

    /// Rating of this record as seen at `now`, never cached
    pub fn rating_breakdown(
        &self,
        catalog: &TierCatalog,
        calculator: &RatingCalculator,
        now: DateTime<Utc>,
    ) -> Result<RatingBreakdown, DomainError> {
        self.check_integrity()?;
        let tier = catalog.resolve(self.current_tier_id.as_ref())?;
        Ok(calculator.compute(self, tier, now))
    }

    /// Clear a freeze whose end has passed.
    ///
    /// The freeze end becomes protected coverage so the missed days it
    /// spanned neither break the streak nor count toward the penalty.
    pub fn expire_freeze_if_due(&mut self, now: DateTime<Utc>) -> bool {
        match (self.is_frozen, self.freeze_ends_at) {
            (true, Some(ends_at)) if now > ends_at => {
                self.extend_protection(ends_at);
                self.clear_freeze(now);
                true
            }
            (true, None) => {
                self.clear_freeze(now);
                true
            }
            _ => false,
        }
    }

    /// End an active freeze before its scheduled end
    pub fn unfreeze(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        ensure_valid_timestamp(now)?;

        if !self.is_frozen_at(now) {
            return Err(DomainError::AlreadyInState(format!(
                "Streak for user {} is not frozen",
                self.user_id
            )));
        }

        if let Some(ends_at) = self.freeze_ends_at {
            self.extend_protection(now.min(ends_at));
        }
        self.clear_freeze(now);
        Ok(())
    }

    /// Pause streak decay for `duration_days`.
    ///
    /// All rules are checked before anything is written, so a rejected request
    /// leaves the record untouched. Coverage starts at `now`: a streak that has
    /// already lapsed is reset rather than bridged.
    pub fn freeze(
        &mut self,
        config: &FreezeConfig,
        duration_days: u32,
        now: DateTime<Utc>,
        timezone: ReferenceTimezone,
    ) -> Result<FreezeGrant, DomainError> {
        ensure_valid_timestamp(now)?;
        FreezePolicy::check(self, config, duration_days, now, timezone)?;

        let ends_at = now
            .checked_add_signed(Duration::days(duration_days as i64))
            .ok_or_else(|| {
                DomainError::Validation(format!(
                    "Freeze of {} days from {} is out of range",
                    duration_days, now
                ))
            })?;

        self.expire_freeze_if_due(now);
        if self.has_lapsed(now, timezone) {
            self.reset_streak();
            self.current_rating = 0.0;
        }

        if FreezePolicy::period_elapsed(self, config, now) {
            self.freezes_used_in_period = 0;
            self.freeze_period_started_at = Some(now);
        }
        self.freezes_used_in_period += 1;

        let grant = FreezeGrant {
            id: FreezeId::new(),
            user_id: self.user_id.clone(),
            starts_at: now,
            ends_at,
            freeze_number: self.freezes_used_in_period,
        };

        self.is_frozen = true;
        self.freeze_ends_at = Some(grant.ends_at);
        self.active_freeze = Some(grant.clone());
        self.last_freeze_at = Some(now);
        self.updated_at = now;

        Ok(grant)
    }

    /// Advance the streak state machine for one activity at `now`.
    pub fn record_activity(
        &mut self,
        now: DateTime<Utc>,
        catalog: &TierCatalog,
        calculator: &RatingCalculator,
        timezone: ReferenceTimezone,
    ) -> Result<ActivityOutcome, DomainError> {
        ensure_valid_timestamp(now)?;
        self.check_integrity()?;

        if let Some(last) = self.last_activity_at {
            if now < last {
                return Err(DomainError::InvalidState(format!(
                    "Activity at {} precedes last activity at {} for user {}",
                    now, last, self.user_id
                )));
            }
        }

        self.expire_freeze_if_due(now);
        let previous_rating = self.current_rating;

        if self.is_frozen_at(now) {
            return Ok(self.outcome(StreakTransition::Protected, previous_rating));
        }

        if let Some(last) = self.last_activity_at {
            if timezone.is_same_day(last, now) {
                return Ok(self.outcome(StreakTransition::SameDay, previous_rating));
            }
        }

        let transition = if self.has_lapsed(now, timezone) {
            self.reset_streak();
            StreakTransition::Broken
        } else {
            self.streak_count = self.streak_count.saturating_add(1);
            self.current_tier_id = Some(catalog.classify(self.streak_count).id().clone());
            if self.decay_anchor().is_some() {
                StreakTransition::Continued
            } else {
                StreakTransition::Started
            }
        };

        self.last_activity_at = Some(now);
        self.protected_through = None;

        let breakdown = self.rating_breakdown(catalog, calculator, now)?;
        self.current_rating = breakdown.final_score;
        if breakdown.final_score > self.max_rating {
            self.max_rating = breakdown.final_score;
        }
        self.updated_at = now;

        Ok(self.outcome(transition, previous_rating))
    }

    fn outcome(&self, transition: StreakTransition, previous_rating: f64) -> ActivityOutcome {
        ActivityOutcome {
            transition,
            streak_count: self.streak_count,
            previous_rating,
            current_rating: self.current_rating,
        }
    }

    fn reset_streak(&mut self) {
        self.streak_count = 0;
        self.current_tier_id = None;
        self.protected_through = None;
    }

    fn extend_protection(&mut self, through: DateTime<Utc>) {
        self.protected_through = Some(match self.protected_through {
            Some(existing) => existing.max(through),
            None => through,
        });
    }

    fn clear_freeze(&mut self, now: DateTime<Utc>) {
        self.is_frozen = false;
        self.freeze_ends_at = None;
        self.active_freeze = None;
        self.updated_at = now;
    }
}

fn ensure_valid_timestamp(ts: DateTime<Utc>) -> Result<(), DomainError> {
    if ts.timestamp() <= 0 {
        return Err(DomainError::InvalidState(format!(
            "Timestamp {} is zero or before the epoch",
            ts
        )));
    }
    Ok(())
}

/// Builder for UserStreakRecord (used when restoring persisted state)
pub struct UserStreakRecordBuilder {
    record: UserStreakRecord,
}

impl UserStreakRecordBuilder {
    pub fn streak_count(mut self, streak_count: u32) -> Self {
        self.record.streak_count = streak_count;
        self
    }

    pub fn current_tier_id(mut self, tier_id: Option<StreakTierId>) -> Self {
        self.record.current_tier_id = tier_id;
        self
    }

    pub fn current_rating(mut self, rating: f64) -> Self {
        self.record.current_rating = rating;
        self
    }

    pub fn max_rating(mut self, rating: f64) -> Self {
        self.record.max_rating = rating;
        self
    }

    pub fn last_activity_at(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.record.last_activity_at = at;
        self
    }

    pub fn frozen_until(mut self, ends_at: Option<DateTime<Utc>>) -> Self {
        self.record.is_frozen = ends_at.is_some();
        self.record.freeze_ends_at = ends_at;
        self
    }

    pub fn active_freeze(mut self, grant: Option<FreezeGrant>) -> Self {
        self.record.active_freeze = grant;
        self
    }

    pub fn freezes_used_in_period(mut self, used: u32) -> Self {
        self.record.freezes_used_in_period = used;
        self
    }

    pub fn freeze_period_started_at(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.record.freeze_period_started_at = at;
        self
    }

    pub fn last_freeze_at(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.record.last_freeze_at = at;
        self
    }

    pub fn protected_through(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.record.protected_through = at;
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.record.created_at = at;
        self
    }

    pub fn updated_at(mut self, at: DateTime<Utc>) -> Self {
        self.record.updated_at = at;
        self
    }

    pub fn build(self) -> UserStreakRecord {
        self.record
    }
}
