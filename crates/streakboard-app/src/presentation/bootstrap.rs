use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::application::config::EngineConfig;
use crate::application::queries::LeaderboardQueries;
use crate::application::services::{FreezeService, MaintenanceScheduler, StreakService};
use crate::presentation::state::{AppState, Queries, Repositories, Services};
use streakboard_domain::activity::ActivityLogRepository;
use streakboard_domain::directory::UserDirectory;
use streakboard_domain::reward::RewardNotifier;
use streakboard_domain::streak::StreakRecordRepository;
use streakboard_domain::{Clock, DomainError};
use streakboard_infrastructure::cache::LeaderboardCache;
use streakboard_infrastructure::persistence::{
    InMemoryActivityLogRepository, InMemoryStreakRecordRepository,
};

/// Wire repositories, services and queries around the given collaborators.
///
/// The configuration is validated first; nothing is built from an invalid one.
pub fn build_app_state(
    config: &EngineConfig,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn RewardNotifier>,
    directory: Arc<dyn UserDirectory>,
) -> Result<AppState, DomainError> {
    let started_at = Instant::now();
    config.validate()?;

    let catalog = Arc::new(config.tier_catalog()?);
    let calculator = Arc::new(config.rating_calculator()?);
    let timezone = config.reference_timezone()?;

    let streak_records =
        Arc::new(InMemoryStreakRecordRepository::new()) as Arc<dyn StreakRecordRepository>;
    let activities =
        Arc::new(InMemoryActivityLogRepository::new()) as Arc<dyn ActivityLogRepository>;

    let cache = Arc::new(LeaderboardCache::new(
        clock.clone(),
        config.leaderboard.cache_ttl(),
        config.leaderboard.max_cache_entries,
    ));

    let streak = Arc::new(StreakService::new(
        streak_records.clone(),
        activities.clone(),
        notifier,
        clock.clone(),
        catalog.clone(),
        calculator.clone(),
        timezone,
        config.reward_notify_timeout(),
    ));
    let freeze = Arc::new(FreezeService::new(
        streak_records.clone(),
        clock.clone(),
        config.freeze.clone(),
        timezone,
    ));
    let leaderboard = Arc::new(LeaderboardQueries::new(
        streak_records.clone(),
        directory.clone(),
        cache,
        clock.clone(),
        catalog.clone(),
        calculator,
        config.leaderboard.clone(),
    ));
    let maintenance = Arc::new(MaintenanceScheduler::new(
        freeze.clone(),
        leaderboard.clone(),
        config.maintenance_interval(),
    ));

    info!(
        "[bootstrap] app state ready tiers={} cache_ttl_secs={} timezone_offset_minutes={} ({}ms)",
        catalog.tiers().len(),
        config.leaderboard.cache_ttl_secs,
        timezone.offset_minutes(),
        started_at.elapsed().as_millis()
    );

    Ok(AppState {
        config: config.clone(),
        clock,
        repositories: Repositories {
            streak_records,
            activities,
            directory,
        },
        services: Services {
            streak,
            freeze,
            maintenance,
        },
        queries: Queries { leaderboard },
    })
}

