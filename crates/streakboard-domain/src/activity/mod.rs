use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::shared::{ActivityId, DomainError, UserId};

/// Kind of learning activity a student performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Video,
    FlashCard,
    Question,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Video => "video",
            ActivityType::FlashCard => "flash_card",
            ActivityType::Question => "question",
        }
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "video" => Ok(ActivityType::Video),
            "flash_card" | "flashcard" => Ok(ActivityType::FlashCard),
            "question" => Ok(ActivityType::Question),
            _ => Err(DomainError::Validation(format!(
                "Unknown activity type: {}",
                s
            ))),
        }
    }
}

/// One accepted activity call, counted toward the streak or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityItem {
    pub id: ActivityId,
    pub user_id: UserId,
    pub activity_type: ActivityType,
    pub recorded_at: DateTime<Utc>,
    pub counted: bool,
}

impl ActivityItem {
    pub fn new(
        user_id: UserId,
        activity_type: ActivityType,
        recorded_at: DateTime<Utc>,
        counted: bool,
    ) -> Self {
        Self {
            id: ActivityId::new(),
            user_id,
            activity_type,
            recorded_at,
            counted,
        }
    }
}

#[async_trait]
pub trait ActivityLogRepository: Send + Sync {
    async fn append(&self, item: ActivityItem) -> Result<(), DomainError>;

    /// Items for one user, oldest first
    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<ActivityItem>, DomainError>;
}
