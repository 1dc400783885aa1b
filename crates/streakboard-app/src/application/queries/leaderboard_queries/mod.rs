use chrono::Duration;
use std::sync::Arc;

use crate::application::config::LeaderboardConfig;
use streakboard_domain::directory::UserDirectory;
use streakboard_domain::leaderboard::{
    LeaderboardFilter, LeaderboardPage, LeaderboardQuery, LeaderboardScope, LeaderboardStats,
    Pagination, RatingDistribution, StreakDistribution,
};
use streakboard_domain::rating::RatingCalculator;
use streakboard_domain::streak::{StreakRecordRepository, TierCatalog};
use streakboard_domain::{Clock, DomainError};
use streakboard_infrastructure::cache::{CacheStats, LeaderboardCache};

mod board;
mod helpers;
mod stats;

/// Ranked views and population statistics over streak records.
pub struct LeaderboardQueries {
    records: Arc<dyn StreakRecordRepository>,
    directory: Arc<dyn UserDirectory>,
    cache: Arc<LeaderboardCache>,
    clock: Arc<dyn Clock>,
    catalog: Arc<TierCatalog>,
    calculator: Arc<RatingCalculator>,
    config: LeaderboardConfig,
}

impl LeaderboardQueries {
    pub fn new(
        records: Arc<dyn StreakRecordRepository>,
        directory: Arc<dyn UserDirectory>,
        cache: Arc<LeaderboardCache>,
        clock: Arc<dyn Clock>,
        catalog: Arc<TierCatalog>,
        calculator: Arc<RatingCalculator>,
        config: LeaderboardConfig,
    ) -> Self {
        Self {
            records,
            directory,
            cache,
            clock,
            catalog,
            calculator,
            config,
        }
    }

    /// Pagination from optional caller input, bounded by `max_limit`
    pub fn pagination(
        &self,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Pagination, DomainError> {
        helpers::pagination(&self.config, limit, offset)
    }

    /// Cached leaderboard page for a scope
    pub async fn get_batch_leaderboard(
        &self,
        scope: LeaderboardScope,
        filter: LeaderboardFilter,
        pagination: Pagination,
    ) -> Result<LeaderboardPage, DomainError> {
        let query = LeaderboardQuery::new(scope, filter, pagination);
        board::get_cached(self, query).await
    }

    /// Cached global leaderboard
    pub async fn get_top_performers(
        &self,
        filter: LeaderboardFilter,
        pagination: Pagination,
    ) -> Result<LeaderboardPage, DomainError> {
        self.get_batch_leaderboard(LeaderboardScope::Global, filter, pagination)
            .await
    }

    /// Uncached computation of one leaderboard page
    pub async fn build_leaderboard(
        &self,
        query: &LeaderboardQuery,
    ) -> Result<LeaderboardPage, DomainError> {
        board::build(self, query).await
    }

    pub async fn get_leaderboard_stats(
        &self,
        scope: LeaderboardScope,
    ) -> Result<LeaderboardStats, DomainError> {
        stats::leaderboard_stats(self, scope).await
    }

    pub async fn get_rating_distribution(
        &self,
        scope: LeaderboardScope,
    ) -> Result<RatingDistribution, DomainError> {
        stats::rating_distribution(self, scope).await
    }

    pub async fn get_streak_distribution(
        &self,
        scope: LeaderboardScope,
    ) -> Result<StreakDistribution, DomainError> {
        stats::streak_distribution(self, scope).await
    }

    /// Drop every cached page; returns how many were dropped
    pub async fn invalidate_cache(&self) -> usize {
        self.cache.invalidate_all().await
    }

    /// Drop pages older than `stale_after_ttls` TTLs
    pub async fn sweep_cache(&self) -> usize {
        let max_age = Duration::from_std(self.config.stale_after())
            .unwrap_or_else(|_| Duration::weeks(52));
        self.cache.sweep_older_than(max_age).await
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }
}
