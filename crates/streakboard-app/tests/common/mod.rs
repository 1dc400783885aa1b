#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;

use streakboard_domain::directory::UserProfile;
use streakboard_domain::reward::RewardNotifier;
use streakboard_domain::{BatchId, UserId};
use streakboard_infrastructure::clock::ManualClock;
use streakboard_infrastructure::notification::LoggingRewardNotifier;
use streakboard_infrastructure::persistence::InMemoryUserDirectory;
use streakboard_lib::application::config::EngineConfig;
use streakboard_lib::presentation::bootstrap::build_app_state;
use streakboard_lib::presentation::state::AppState;

pub fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap() + Duration::days(n - 1)
}

pub fn user(id: &str) -> UserId {
    UserId::from_string(id)
}

pub fn profile(id: &str, batch: Option<&str>) -> UserProfile {
    UserProfile {
        user_id: user(id),
        display_name: format!("Student {}", id),
        batch_id: batch.map(BatchId::from_string),
    }
}

pub struct Harness {
    pub state: AppState,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new(users: Vec<UserProfile>) -> Self {
        Self::with(EngineConfig::default(), users, Arc::new(LoggingRewardNotifier))
    }

    pub fn with(
        config: EngineConfig,
        users: Vec<UserProfile>,
        notifier: Arc<dyn RewardNotifier>,
    ) -> Self {
        let clock = Arc::new(ManualClock::new(day(1)));
        let directory = Arc::new(InMemoryUserDirectory::with_users(users));
        let state = build_app_state(&config, clock.clone(), notifier, directory).unwrap();
        Self { state, clock }
    }

    /// One activity per day for `days` days starting at `first`
    pub async fn daily_activity(&self, user_id: &str, first: i64, days: i64) {
        for n in first..first + days {
            self.clock.set(day(n));
            self.state
                .services
                .streak
                .record_activity(&user(user_id), streakboard_domain::activity::ActivityType::Video)
                .await
                .unwrap();
        }
    }
}
