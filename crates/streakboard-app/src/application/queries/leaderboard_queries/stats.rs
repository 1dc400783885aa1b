use log::info;

use super::{helpers, LeaderboardQueries};
use streakboard_domain::leaderboard::{
    LeaderboardScope, LeaderboardStats, RatingDistribution, StreakDistribution,
};
use streakboard_domain::DomainError;

pub(super) async fn leaderboard_stats(
    queries: &LeaderboardQueries,
    scope: LeaderboardScope,
) -> Result<LeaderboardStats, DomainError> {
    let population = helpers::rate_scope(queries, &scope).await?;
    let stats = LeaderboardStats::compute(scope, &population, queries.clock.now())?;

    info!(
        "[leaderboard] stats scope={} counted={} avg_score={:.2} max_streak={}",
        stats.scope, stats.counted_users, stats.average_score, stats.highest_streak
    );
    Ok(stats)
}

pub(super) async fn rating_distribution(
    queries: &LeaderboardQueries,
    scope: LeaderboardScope,
) -> Result<RatingDistribution, DomainError> {
    let population = helpers::rate_scope(queries, &scope).await?;
    RatingDistribution::compute(scope, &population, queries.clock.now())
}

pub(super) async fn streak_distribution(
    queries: &LeaderboardQueries,
    scope: LeaderboardScope,
) -> Result<StreakDistribution, DomainError> {
    let population = helpers::rate_scope(queries, &scope).await?;
    StreakDistribution::compute(scope, &population, queries.clock.now())
}
