use std::sync::Arc;

use crate::application::config::EngineConfig;
use crate::application::queries::LeaderboardQueries;
use crate::application::services::{FreezeService, MaintenanceScheduler, StreakService};
use streakboard_domain::activity::ActivityLogRepository;
use streakboard_domain::directory::UserDirectory;
use streakboard_domain::streak::StreakRecordRepository;
use streakboard_domain::Clock;

pub struct Repositories {
    pub streak_records: Arc<dyn StreakRecordRepository>,
    pub activities: Arc<dyn ActivityLogRepository>,
    pub directory: Arc<dyn UserDirectory>,
}

pub struct Services {
    pub streak: Arc<StreakService>,
    pub freeze: Arc<FreezeService>,
    pub maintenance: Arc<MaintenanceScheduler>,
}

pub struct Queries {
    pub leaderboard: Arc<LeaderboardQueries>,
}

pub struct AppState {
    pub config: EngineConfig,
    pub clock: Arc<dyn Clock>,
    pub repositories: Repositories,
    pub services: Services,
    pub queries: Queries,
}

