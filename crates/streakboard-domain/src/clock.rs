use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::DomainError;

/// Source of "now" for every temporal rule in the domain.
///
/// Injected everywhere instead of calling `Utc::now()` directly so that
/// streak and freeze transitions can be driven deterministically in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Fixed timezone used to decide which calendar day a timestamp falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReferenceTimezone {
    offset_minutes: i32,
}

impl ReferenceTimezone {
    const MAX_OFFSET_MINUTES: u32 = 24 * 60;

    pub fn utc() -> Self {
        Self { offset_minutes: 0 }
    }

    pub fn from_offset_minutes(offset_minutes: i32) -> Result<Self, DomainError> {
        if offset_minutes.unsigned_abs() >= Self::MAX_OFFSET_MINUTES {
            return Err(DomainError::Validation(format!(
                "Timezone offset must be within ±24h, got {} minutes",
                offset_minutes
            )));
        }
        Ok(Self { offset_minutes })
    }

    pub fn offset_minutes(&self) -> i32 {
        self.offset_minutes
    }

    fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    /// Calendar date of `ts` in this timezone
    pub fn date_of(&self, ts: DateTime<Utc>) -> NaiveDate {
        ts.with_timezone(&self.offset()).date_naive()
    }

    pub fn is_same_day(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        self.date_of(a) == self.date_of(b)
    }

    /// Whole calendar days from `earlier` to `later` (negative if reversed)
    pub fn calendar_days_between(&self, earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
        (self.date_of(later) - self.date_of(earlier)).num_days()
    }
}
