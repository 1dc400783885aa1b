mod ttl_cache;

pub use ttl_cache::{CacheStats, TtlCache};

use streakboard_domain::leaderboard::{LeaderboardPage, LeaderboardQuery};

/// Process-wide cache of computed leaderboard pages keyed by the full query
pub type LeaderboardCache = TtlCache<LeaderboardQuery, LeaderboardPage>;
