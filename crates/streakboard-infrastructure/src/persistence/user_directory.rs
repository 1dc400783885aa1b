use async_trait::async_trait;
use tokio::sync::RwLock;

use streakboard_domain::directory::{UserDirectory, UserProfile};
use streakboard_domain::leaderboard::LeaderboardScope;
use streakboard_domain::{DomainError, UserId};

/// User directory held in registration order.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<Vec<UserProfile>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<UserProfile>) -> Self {
        Self {
            users: RwLock::new(users),
        }
    }

    /// Add a user, or replace the profile of a known one in place
    pub async fn register(&self, profile: UserProfile) {
        let mut guard = self.users.write().await;
        match guard.iter_mut().find(|u| u.user_id == profile.user_id) {
            Some(existing) => *existing = profile,
            None => guard.push(profile),
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn list_users(&self, scope: &LeaderboardScope) -> Result<Vec<UserProfile>, DomainError> {
        let guard = self.users.read().await;
        Ok(guard
            .iter()
            .filter(|profile| match scope {
                LeaderboardScope::Global => true,
                LeaderboardScope::Batch(batch_id) => profile.batch_id.as_ref() == Some(batch_id),
            })
            .cloned()
            .collect())
    }

    async fn find_user(&self, user_id: &UserId) -> Result<Option<UserProfile>, DomainError> {
        let guard = self.users.read().await;
        Ok(guard.iter().find(|u| &u.user_id == user_id).cloned())
    }
}
