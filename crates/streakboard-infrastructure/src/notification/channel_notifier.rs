use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use streakboard_domain::reward::RewardNotifier;
use streakboard_domain::{DomainError, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingChange {
    pub user_id: UserId,
    pub old_score: f64,
    pub new_score: f64,
}

/// Forwards rating changes to a bounded channel for a downstream consumer.
///
/// `try_send` keeps the caller from waiting on a slow consumer; a full or
/// closed channel is reported as an infrastructure error.
#[derive(Debug, Clone)]
pub struct ChannelRewardNotifier {
    sender: mpsc::Sender<RatingChange>,
}

impl ChannelRewardNotifier {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<RatingChange>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl RewardNotifier for ChannelRewardNotifier {
    async fn notify_rating_changed(
        &self,
        user_id: &UserId,
        old_score: f64,
        new_score: f64,
    ) -> Result<(), DomainError> {
        self.sender
            .try_send(RatingChange {
                user_id: user_id.clone(),
                old_score,
                new_score,
            })
            .map_err(|e| DomainError::Infrastructure(format!("Reward channel rejected change: {}", e)))
    }
}
