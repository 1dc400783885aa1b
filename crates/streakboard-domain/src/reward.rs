use async_trait::async_trait;

use crate::shared::{DomainError, UserId};

/// External reward collaborator, told when a user's rating changes band.
///
/// Delivery is best-effort: callers log and drop any error.
#[async_trait]
pub trait RewardNotifier: Send + Sync {
    async fn notify_rating_changed(
        &self,
        user_id: &UserId,
        old_score: f64,
        new_score: f64,
    ) -> Result<(), DomainError>;
}
