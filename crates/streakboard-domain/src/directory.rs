use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::leaderboard::LeaderboardScope;
use crate::shared::{BatchId, DomainError, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub display_name: String,
    pub batch_id: Option<BatchId>,
}

/// Read-only view of the student population.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Users in `scope`, in a stable enumeration order
    async fn list_users(&self, scope: &LeaderboardScope) -> Result<Vec<UserProfile>, DomainError>;

    async fn find_user(&self, user_id: &UserId) -> Result<Option<UserProfile>, DomainError>;
}
