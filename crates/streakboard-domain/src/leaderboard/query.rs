use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rating::RatingLabel;
use crate::shared::{BatchId, DomainError, UserId};

/// Population a leaderboard is computed over.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "batch_id", rename_all = "snake_case")]
pub enum LeaderboardScope {
    Global,
    Batch(BatchId),
}

impl std::fmt::Display for LeaderboardScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeaderboardScope::Global => write!(f, "global"),
            LeaderboardScope::Batch(batch_id) => write!(f, "batch:{}", batch_id),
        }
    }
}

/// Optional restrictions applied after rating, before ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaderboardFilter {
    pub rating_label: Option<RatingLabel>,
    /// Inclusive lower bound on last activity
    pub active_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on last activity
    pub active_until: Option<DateTime<Utc>>,
}

impl LeaderboardFilter {
    pub fn validate(&self) -> Result<(), DomainError> {
        if let (Some(from), Some(until)) = (self.active_from, self.active_until) {
            if from > until {
                return Err(DomainError::Validation(format!(
                    "Activity window starts ({}) after it ends ({})",
                    from, until
                )));
            }
        }
        Ok(())
    }

    pub fn has_activity_window(&self) -> bool {
        self.active_from.is_some() || self.active_until.is_some()
    }

    pub fn matches(&self, label: RatingLabel, last_activity_at: Option<DateTime<Utc>>) -> bool {
        if let Some(wanted) = self.rating_label {
            if wanted != label {
                return false;
            }
        }

        if !self.has_activity_window() {
            return true;
        }

        let Some(at) = last_activity_at else {
            return false;
        };
        self.active_from.map_or(true, |from| at >= from)
            && self.active_until.map_or(true, |until| at <= until)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: usize,
    pub offset: usize,
}

impl Pagination {
    pub const DEFAULT_LIMIT: usize = 10;

    pub fn new(limit: usize, offset: usize) -> Result<Self, DomainError> {
        if limit == 0 {
            return Err(DomainError::Validation(
                "Page limit must be at least 1".to_string(),
            ));
        }
        Ok(Self { limit, offset })
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Full parameter tuple of one leaderboard request; also the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaderboardQuery {
    pub scope: LeaderboardScope,
    pub filter: LeaderboardFilter,
    pub pagination: Pagination,
}

impl LeaderboardQuery {
    pub fn new(scope: LeaderboardScope, filter: LeaderboardFilter, pagination: Pagination) -> Self {
        Self {
            scope,
            filter,
            pagination,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: UserId,
    pub display_name: String,
    pub score: f64,
    pub rating_label: RatingLabel,
    pub streak_count: u32,
    pub batch_id: Option<BatchId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardPage {
    pub entries: Vec<LeaderboardEntry>,
    /// Filtered count before pagination
    pub total_matched: usize,
    pub computed_at: DateTime<Utc>,
}
