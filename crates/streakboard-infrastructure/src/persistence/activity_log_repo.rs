use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use streakboard_domain::activity::{ActivityItem, ActivityLogRepository};
use streakboard_domain::{DomainError, UserId};

/// Append-only activity log keyed by user.
#[derive(Default)]
pub struct InMemoryActivityLogRepository {
    items: RwLock<HashMap<UserId, Vec<ActivityItem>>>,
}

impl InMemoryActivityLogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActivityLogRepository for InMemoryActivityLogRepository {
    async fn append(&self, item: ActivityItem) -> Result<(), DomainError> {
        let mut guard = self.items.write().await;
        guard.entry(item.user_id.clone()).or_default().push(item);
        Ok(())
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<ActivityItem>, DomainError> {
        let guard = self.items.read().await;
        let mut items = guard.get(user_id).cloned().unwrap_or_default();
        items.sort_by_key(|item| item.recorded_at);
        Ok(items)
    }
}
