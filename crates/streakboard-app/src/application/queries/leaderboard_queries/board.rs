use log::info;

use super::{helpers, LeaderboardQueries};
use streakboard_domain::leaderboard::{build_leaderboard, LeaderboardPage, LeaderboardQuery};
use streakboard_domain::DomainError;

fn validate(queries: &LeaderboardQueries, query: &LeaderboardQuery) -> Result<(), DomainError> {
    query.filter.validate()?;
    let pagination = query.pagination;
    helpers::pagination(&queries.config, Some(pagination.limit), Some(pagination.offset))?;
    Ok(())
}

pub(super) async fn get_cached(
    queries: &LeaderboardQueries,
    query: LeaderboardQuery,
) -> Result<LeaderboardPage, DomainError> {
    validate(queries, &query)?;

    let key = query.clone();
    queries
        .cache
        .get_or_compute(key, || build(queries, &query))
        .await
}

pub(super) async fn build(
    queries: &LeaderboardQueries,
    query: &LeaderboardQuery,
) -> Result<LeaderboardPage, DomainError> {
    validate(queries, query)?;

    let population = helpers::rate_scope(queries, &query.scope).await?;
    let page = build_leaderboard(
        &population.rated,
        &query.filter,
        query.pagination,
        queries.clock.now(),
    );

    info!(
        "[leaderboard] built scope={} matched={} returned={} excluded={}",
        query.scope,
        page.total_matched,
        page.entries.len(),
        population.excluded.len()
    );

    Ok(page)
}
