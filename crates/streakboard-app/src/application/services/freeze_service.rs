use log::{info, warn};
use std::sync::Arc;

use streakboard_domain::freeze::{FreezeConfig, FreezeGrant, FreezePolicy, FreezeStatus};
use streakboard_domain::streak::{StreakRecordRepository, UserStreakRecord};
use streakboard_domain::{Clock, DomainError, ReferenceTimezone, UserId};

fn missing(user_id: &UserId) -> DomainError {
    DomainError::NotFound(format!("Streak record for user {}", user_id))
}

/// Freeze and unfreeze requests plus the periodic expiry sweep.
pub struct FreezeService {
    records: Arc<dyn StreakRecordRepository>,
    clock: Arc<dyn Clock>,
    config: FreezeConfig,
    timezone: ReferenceTimezone,
}

impl FreezeService {
    pub fn new(
        records: Arc<dyn StreakRecordRepository>,
        clock: Arc<dyn Clock>,
        config: FreezeConfig,
        timezone: ReferenceTimezone,
    ) -> Self {
        Self {
            records,
            clock,
            config,
            timezone,
        }
    }

    pub fn config(&self) -> &FreezeConfig {
        &self.config
    }

    pub async fn freeze_streak(
        &self,
        user_id: &UserId,
        duration_days: u32,
    ) -> Result<FreezeGrant, DomainError> {
        let clock = self.clock.as_ref();
        let config = &self.config;
        let timezone = self.timezone;
        let mut granted: Option<FreezeGrant> = None;

        let result = self
            .records
            .modify(user_id, &mut |slot| {
                let record = slot.as_mut().ok_or_else(|| missing(user_id))?;
                granted = Some(record.freeze(config, duration_days, clock.now(), timezone)?);
                Ok(())
            })
            .await;

        if let Err(e) = result {
            warn!(
                "[freeze] freeze rejected user_id={} days={} error={}",
                user_id,
                duration_days,
                e.format_with_code()
            );
            return Err(e);
        }

        let grant = granted.ok_or_else(|| missing(user_id))?;
        info!(
            "[freeze] frozen user_id={} days={} ends_at={} freeze_number={}",
            user_id, duration_days, grant.ends_at, grant.freeze_number
        );
        Ok(grant)
    }

    pub async fn unfreeze_streak(&self, user_id: &UserId) -> Result<FreezeStatus, DomainError> {
        let clock = self.clock.as_ref();
        let config = &self.config;
        let timezone = self.timezone;
        let mut status: Option<FreezeStatus> = None;

        self.records
            .modify(user_id, &mut |slot| {
                let record = slot.as_mut().ok_or_else(|| missing(user_id))?;
                let now = clock.now();
                record.unfreeze(now)?;
                status = Some(FreezePolicy::status(record, config, now, timezone));
                Ok(())
            })
            .await?;

        info!("[freeze] unfrozen user_id={}", user_id);
        status.ok_or_else(|| missing(user_id))
    }

    /// Current freeze state; an observed expired freeze is cleared and saved
    pub async fn get_freeze_status(&self, user_id: &UserId) -> Result<FreezeStatus, DomainError> {
        let record = self
            .records
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| missing(user_id))?;

        let now = self.clock.now();
        if !Self::is_expired(&record, now) {
            return Ok(FreezePolicy::status(&record, &self.config, now, self.timezone));
        }

        let record = self.expire(user_id).await?.ok_or_else(|| missing(user_id))?;
        Ok(FreezePolicy::status(&record, &self.config, self.clock.now(), self.timezone))
    }

    /// Clear every freeze whose end has passed; returns how many were cleared
    pub async fn auto_unfreeze_expired(&self) -> Result<usize, DomainError> {
        let now = self.clock.now();
        let frozen = self.records.list_frozen().await?;
        let mut cleared = 0;

        for record in frozen.iter().filter(|r| Self::is_expired(r, now)) {
            match self.expire(record.user_id()).await {
                Ok(_) => cleared += 1,
                Err(e) => warn!(
                    "[freeze] auto-unfreeze failed user_id={} error={}",
                    record.user_id(),
                    e.format_with_code()
                ),
            }
        }

        if cleared > 0 {
            info!("[freeze] auto-unfreeze cleared={}", cleared);
        }
        Ok(cleared)
    }

    fn is_expired(record: &UserStreakRecord, now: chrono::DateTime<chrono::Utc>) -> bool {
        record.is_frozen() && !record.is_frozen_at(now)
    }

    async fn expire(&self, user_id: &UserId) -> Result<Option<UserStreakRecord>, DomainError> {
        let clock = self.clock.as_ref();
        self.records
            .modify(user_id, &mut |slot| {
                if let Some(record) = slot.as_mut() {
                    record.expire_freeze_if_due(clock.now());
                }
                Ok(())
            })
            .await
    }
}
