use async_trait::async_trait;
use log::info;

use streakboard_domain::reward::RewardNotifier;
use streakboard_domain::{DomainError, UserId};

/// Reward collaborator that only writes the change to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingRewardNotifier;

#[async_trait]
impl RewardNotifier for LoggingRewardNotifier {
    async fn notify_rating_changed(
        &self,
        user_id: &UserId,
        old_score: f64,
        new_score: f64,
    ) -> Result<(), DomainError> {
        info!(
            "[reward] rating changed user_id={} old={:.2} new={:.2}",
            user_id, old_score, new_score
        );
        Ok(())
    }
}
