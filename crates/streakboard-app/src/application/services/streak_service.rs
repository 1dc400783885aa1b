use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::application::dtos::{ActivityRecordedDto, UserStreakInfoDto};
use streakboard_domain::activity::{ActivityItem, ActivityLogRepository, ActivityType};
use streakboard_domain::rating::{RatingBreakdown, RatingCalculator, RatingLabel};
use streakboard_domain::reward::RewardNotifier;
use streakboard_domain::streak::{
    ActivityOutcome, StreakRecordRepository, TierCatalog, UserStreakRecord,
};
use streakboard_domain::{Clock, DomainError, ReferenceTimezone, UserId};

/// Records activities and answers per-user streak questions.
pub struct StreakService {
    records: Arc<dyn StreakRecordRepository>,
    activities: Arc<dyn ActivityLogRepository>,
    notifier: Arc<dyn RewardNotifier>,
    clock: Arc<dyn Clock>,
    catalog: Arc<TierCatalog>,
    calculator: Arc<RatingCalculator>,
    timezone: ReferenceTimezone,
    notify_timeout: Duration,
}

impl StreakService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        records: Arc<dyn StreakRecordRepository>,
        activities: Arc<dyn ActivityLogRepository>,
        notifier: Arc<dyn RewardNotifier>,
        clock: Arc<dyn Clock>,
        catalog: Arc<TierCatalog>,
        calculator: Arc<RatingCalculator>,
        timezone: ReferenceTimezone,
        notify_timeout: Duration,
    ) -> Self {
        Self {
            records,
            activities,
            notifier,
            clock,
            catalog,
            calculator,
            timezone,
            notify_timeout,
        }
    }

    /// Advance the user's streak for one activity, creating the record on
    /// first use.
    ///
    /// The clock is read inside the store's exclusive section so concurrent
    /// calls for one user apply in timestamp order.
    pub async fn record_activity(
        &self,
        user_id: &UserId,
        activity_type: ActivityType,
    ) -> Result<ActivityRecordedDto, DomainError> {
        let clock = self.clock.as_ref();
        let catalog = self.catalog.as_ref();
        let calculator = self.calculator.as_ref();
        let timezone = self.timezone;
        let mut applied: Option<(ActivityOutcome, DateTime<Utc>)> = None;

        self.records
            .modify(user_id, &mut |slot| {
                let now = clock.now();
                let record =
                    slot.get_or_insert_with(|| UserStreakRecord::new(user_id.clone(), now));
                let outcome = record.record_activity(now, catalog, calculator, timezone)?;
                applied = Some((outcome, now));
                Ok(())
            })
            .await?;

        let (outcome, recorded_at) = applied.ok_or_else(|| {
            DomainError::InvalidState(format!("Activity for user {} was not applied", user_id))
        })?;

        let counted = outcome.transition.is_counted();
        self.activities
            .append(ActivityItem::new(
                user_id.clone(),
                activity_type,
                recorded_at,
                counted,
            ))
            .await?;

        info!(
            "[streak] record_activity user_id={} type={} transition={} streak={} rating={:.2}",
            user_id,
            activity_type,
            outcome.transition,
            outcome.streak_count,
            outcome.current_rating
        );

        self.notify_if_band_changed(user_id, &outcome);

        Ok(ActivityRecordedDto {
            user_id: user_id.to_string(),
            activity_type,
            recorded_at,
            transition: outcome.transition,
            counted,
            streak_count: outcome.streak_count,
            previous_rating: outcome.previous_rating,
            current_rating: outcome.current_rating,
            rating_label: RatingLabel::from_score(outcome.current_rating),
        })
    }

    /// Tell the reward collaborator about a band change.
    ///
    /// Delivery runs on its own task so the caller never waits on it.
    /// Failures and timeouts are logged and dropped; the activity is already
    /// persisted.
    fn notify_if_band_changed(&self, user_id: &UserId, outcome: &ActivityOutcome) {
        let old_label = RatingLabel::from_score(outcome.previous_rating);
        let new_label = RatingLabel::from_score(outcome.current_rating);
        if old_label == new_label {
            return;
        }

        let notifier = self.notifier.clone();
        let timeout = self.notify_timeout;
        let user_id = user_id.clone();
        let (old_score, new_score) = (outcome.previous_rating, outcome.current_rating);

        tokio::spawn(async move {
            let notify = notifier.notify_rating_changed(&user_id, old_score, new_score);
            match tokio::time::timeout(timeout, notify).await {
                Ok(Ok(())) => debug!(
                    "[reward] notified user_id={} band={}->{}",
                    user_id, old_label, new_label
                ),
                Ok(Err(e)) => warn!(
                    "[reward] notification failed user_id={} error={}",
                    user_id,
                    e.format_with_code()
                ),
                Err(_) => warn!(
                    "[reward] notification timed out user_id={} timeout_ms={}",
                    user_id,
                    timeout.as_millis()
                ),
            }
        });
    }

    async fn require_record(&self, user_id: &UserId) -> Result<UserStreakRecord, DomainError> {
        self.records
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Streak record for user {}", user_id)))
    }

    pub async fn get_user_streak_info(
        &self,
        user_id: &UserId,
    ) -> Result<UserStreakInfoDto, DomainError> {
        let record = self.require_record(user_id).await?;
        let tier_name = record
            .current_tier_id()
            .and_then(|id| self.catalog.get(id))
            .map(|tier| tier.name().to_string());

        Ok(UserStreakInfoDto::from_record(
            &record,
            tier_name,
            self.clock.now(),
        ))
    }

    /// Rating of the user's record as of now, computed fresh on every call
    pub async fn get_rating_breakdown(
        &self,
        user_id: &UserId,
    ) -> Result<RatingBreakdown, DomainError> {
        let record = self.require_record(user_id).await?;
        record.rating_breakdown(&self.catalog, &self.calculator, self.clock.now())
    }

    pub async fn list_activities(&self, user_id: &UserId) -> Result<Vec<ActivityItem>, DomainError> {
        self.activities.list_by_user(user_id).await
    }
}
