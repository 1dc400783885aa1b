mod builder;
mod query;
mod stats;

#[cfg(test)]
mod builder_test;

pub use builder::{build_leaderboard, rate_population, RatedPopulation, RatedUser};
pub use query::{
    LeaderboardEntry, LeaderboardFilter, LeaderboardPage, LeaderboardQuery, LeaderboardScope,
    Pagination,
};
pub use stats::{
    percentile, DistributionBucket, LeaderboardStats, Percentiles, RatingDistribution,
    StreakDistribution, STREAK_BUCKETS,
};
