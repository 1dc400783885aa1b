use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::services::LogLevel;
use streakboard_domain::freeze::FreezeConfig;
use streakboard_domain::rating::{RatingCalculator, RatingConfig};
use streakboard_domain::streak::{StreakTier, TierCatalog};
use streakboard_domain::{DomainError, ReferenceTimezone};

/// Leaderboard paging and cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    /// How long a computed page stays fresh (default: 5 minutes)
    pub cache_ttl_secs: u64,

    /// Slot cap before the oldest slot is evicted (default: 1024)
    pub max_cache_entries: usize,

    /// Slots older than this many TTLs are swept (default: 3)
    pub stale_after_ttls: u32,

    /// Page size when the caller gives none (default: 10)
    pub default_limit: usize,

    /// Largest page a caller may request (default: 100)
    pub max_limit: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 300,
            max_cache_entries: 1024,
            stale_after_ttls: 3,
            default_limit: 10,
            max_limit: 100,
        }
    }
}

impl LeaderboardConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Age past which a cache slot is swept
    pub fn stale_after(&self) -> Duration {
        self.cache_ttl() * self.stale_after_ttls.max(1)
    }
}

/// Engine-wide configuration, fixed once the application state is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub freeze: FreezeConfig,
    pub rating: RatingConfig,
    pub tiers: Vec<StreakTier>,
    pub leaderboard: LeaderboardConfig,

    /// Offset of the reference timezone used for calendar days (default: UTC)
    pub timezone_offset_minutes: i32,

    /// Upper bound on one reward notification (default: 2 seconds)
    pub reward_notify_timeout_ms: u64,

    /// Period of the maintenance sweep (default: 60 seconds)
    pub maintenance_interval_secs: u64,

    pub log_level: LogLevel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            freeze: FreezeConfig::default(),
            rating: RatingConfig::default(),
            tiers: TierCatalog::standard_tiers(),
            leaderboard: LeaderboardConfig::default(),
            timezone_offset_minutes: 0,
            reward_notify_timeout_ms: 2_000,
            maintenance_interval_secs: 60,
            log_level: LogLevel::Info,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.freeze.validate()?;
        self.rating.validate()?;
        self.tier_catalog()?;
        self.reference_timezone()?;

        let board = &self.leaderboard;
        if board.cache_ttl_secs == 0 {
            return Err(DomainError::Validation(
                "leaderboard.cache_ttl_secs must be positive".to_string(),
            ));
        }
        if board.max_limit == 0 || board.default_limit == 0 || board.default_limit > board.max_limit
        {
            return Err(DomainError::Validation(format!(
                "leaderboard.default_limit ({}) must be within 1..={}",
                board.default_limit, board.max_limit
            )));
        }
        if self.maintenance_interval_secs == 0 {
            return Err(DomainError::Validation(
                "maintenance_interval_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Tier catalog with every tier re-validated
    pub fn tier_catalog(&self) -> Result<TierCatalog, DomainError> {
        let tiers = self
            .tiers
            .iter()
            .map(|tier| {
                StreakTier::new(
                    tier.id().as_str(),
                    tier.name(),
                    tier.min_streak_count(),
                    tier.rating_multiplier(),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        TierCatalog::new(tiers)
    }

    pub fn rating_calculator(&self) -> Result<RatingCalculator, DomainError> {
        RatingCalculator::new(self.rating.clone())
    }

    pub fn reference_timezone(&self) -> Result<ReferenceTimezone, DomainError> {
        ReferenceTimezone::from_offset_minutes(self.timezone_offset_minutes)
    }

    pub fn reward_notify_timeout(&self) -> Duration {
        Duration::from_millis(self.reward_notify_timeout_ms)
    }

    pub fn maintenance_interval(&self) -> Duration {
        Duration::from_secs(self.maintenance_interval_secs)
    }

    /// Builder pattern: set freeze rules
    pub fn with_freeze(mut self, freeze: FreezeConfig) -> Self {
        self.freeze = freeze;
        self
    }

    /// Builder pattern: set rating tuning
    pub fn with_rating(mut self, rating: RatingConfig) -> Self {
        self.rating = rating;
        self
    }

    /// Builder pattern: set tier catalog
    pub fn with_tiers(mut self, tiers: Vec<StreakTier>) -> Self {
        self.tiers = tiers;
        self
    }

    /// Builder pattern: set leaderboard cache TTL
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.leaderboard.cache_ttl_secs = ttl.as_secs();
        self
    }

    /// Builder pattern: set reference timezone offset
    pub fn with_timezone_offset_minutes(mut self, minutes: i32) -> Self {
        self.timezone_offset_minutes = minutes;
        self
    }

    /// Builder pattern: set reward notification timeout
    pub fn with_reward_notify_timeout(mut self, timeout: Duration) -> Self {
        self.reward_notify_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Builder pattern: set maintenance interval
    pub fn with_maintenance_interval(mut self, interval: Duration) -> Self {
        self.maintenance_interval_secs = interval.as_secs();
        self
    }

    /// Builder pattern: set log level
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.freeze.min_streak_count_to_freeze, 7);
        assert_eq!(config.leaderboard.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.leaderboard.stale_after(), Duration::from_secs(900));
        assert_eq!(config.tier_catalog().unwrap().tiers().len(), 3);
    }

    #[test]
    fn test_builder_overrides() {
        let config = EngineConfig::new()
            .with_cache_ttl(Duration::from_secs(30))
            .with_timezone_offset_minutes(-300)
            .with_reward_notify_timeout(Duration::from_millis(250));

        assert_eq!(config.leaderboard.cache_ttl_secs, 30);
        assert_eq!(config.reference_timezone().unwrap().offset_minutes(), -300);
        assert_eq!(config.reward_notify_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(EngineConfig::new()
            .with_cache_ttl(Duration::ZERO)
            .validate()
            .is_err());
        assert!(EngineConfig::new()
            .with_timezone_offset_minutes(24 * 60)
            .validate()
            .is_err());
        assert!(EngineConfig::new().with_tiers(Vec::new()).validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"freeze": {"max_freezes_per_period": 5}}"#).unwrap();

        assert_eq!(config.freeze.max_freezes_per_period, 5);
        assert_eq!(config.freeze.min_streak_count_to_freeze, 7);
        assert_eq!(config.rating.saturation_days, 30);
        assert_eq!(config.leaderboard.max_limit, 100);
    }
}
