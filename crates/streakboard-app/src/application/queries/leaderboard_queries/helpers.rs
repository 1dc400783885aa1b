use log::warn;

use super::LeaderboardQueries;
use crate::application::config::LeaderboardConfig;
use streakboard_domain::leaderboard::{rate_population, LeaderboardScope, Pagination, RatedPopulation};
use streakboard_domain::{DomainError, UserId};

pub(super) fn pagination(
    config: &LeaderboardConfig,
    limit: Option<usize>,
    offset: Option<usize>,
) -> Result<Pagination, DomainError> {
    let limit = limit.unwrap_or(config.default_limit);
    if limit > config.max_limit {
        return Err(DomainError::Validation(format!(
            "Page limit {} exceeds maximum {}",
            limit, config.max_limit
        )));
    }
    Pagination::new(limit, offset.unwrap_or(0))
}

/// Rate every user of `scope` against one consistent snapshot of the store
pub(super) async fn rate_scope(
    queries: &LeaderboardQueries,
    scope: &LeaderboardScope,
) -> Result<RatedPopulation, DomainError> {
    let profiles = queries.directory.list_users(scope).await?;
    let user_ids: Vec<UserId> = profiles.iter().map(|p| p.user_id.clone()).collect();
    let snapshot = queries.records.snapshot(&user_ids).await?;

    let population = rate_population(
        profiles,
        &snapshot,
        &queries.catalog,
        &queries.calculator,
        queries.clock.now(),
    );

    for (user_id, error) in &population.excluded {
        if let Some(error) = error {
            warn!(
                "[leaderboard] excluded user_id={} scope={} error={}",
                user_id,
                scope,
                error.format_with_code()
            );
        }
    }

    Ok(population)
}
