mod channel_notifier;
mod logging_notifier;

pub use channel_notifier::{ChannelRewardNotifier, RatingChange};
pub use logging_notifier::LoggingRewardNotifier;
