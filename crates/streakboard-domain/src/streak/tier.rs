use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::shared::{DomainError, StreakTierId};

/// A streak classification level carrying a rating multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakTier {
    id: StreakTierId,
    name: String,
    min_streak_count: u32,
    rating_multiplier: f64,
}

impl StreakTier {
    pub fn new(
        id: &str,
        name: impl Into<String>,
        min_streak_count: u32,
        rating_multiplier: f64,
    ) -> Result<Self, DomainError> {
        if id.trim().is_empty() {
            return Err(DomainError::Validation(
                "Tier id cannot be empty".to_string(),
            ));
        }
        if !rating_multiplier.is_finite() || rating_multiplier <= 0.0 {
            return Err(DomainError::Validation(format!(
                "Tier '{}' multiplier must be a positive number",
                id
            )));
        }

        Ok(Self {
            id: StreakTierId::from_string(id),
            name: name.into(),
            min_streak_count,
            rating_multiplier,
        })
    }

    pub fn id(&self) -> &StreakTierId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min_streak_count(&self) -> u32 {
        self.min_streak_count
    }

    pub fn rating_multiplier(&self) -> f64 {
        self.rating_multiplier
    }
}

/// Immutable tier reference data, ordered by threshold.
#[derive(Debug, Clone)]
pub struct TierCatalog {
    tiers: Vec<StreakTier>,
}

impl TierCatalog {
    pub const BEGINNER: &'static str = "beginner";
    pub const INTERMEDIATE: &'static str = "intermediate";
    pub const ADVANCED: &'static str = "advanced";

    /// Build a catalog, sorting tiers by threshold.
    ///
    /// The lowest tier must start at a streak count of zero so that every
    /// record classifies somewhere.
    pub fn new(mut tiers: Vec<StreakTier>) -> Result<Self, DomainError> {
        if tiers.is_empty() {
            return Err(DomainError::Validation(
                "Tier catalog cannot be empty".to_string(),
            ));
        }

        let mut ids = HashSet::new();
        let mut thresholds = HashSet::new();
        for tier in &tiers {
            if !ids.insert(tier.id.clone()) {
                return Err(DomainError::Validation(format!(
                    "Duplicate tier id: {}",
                    tier.id
                )));
            }
            if !thresholds.insert(tier.min_streak_count) {
                return Err(DomainError::Validation(format!(
                    "Duplicate tier threshold: {}",
                    tier.min_streak_count
                )));
            }
        }

        tiers.sort_by_key(|tier| tier.min_streak_count);

        if tiers[0].min_streak_count != 0 {
            return Err(DomainError::Validation(
                "Lowest tier must start at streak count 0".to_string(),
            ));
        }

        Ok(Self { tiers })
    }

    /// Beginner / Intermediate / Advanced at 0 / 15 / 30 days
    pub fn standard() -> Self {
        Self {
            tiers: Self::standard_tiers(),
        }
    }

    pub fn standard_tiers() -> Vec<StreakTier> {
        vec![
            StreakTier {
                id: StreakTierId::from_string(Self::BEGINNER),
                name: "Beginner".to_string(),
                min_streak_count: 0,
                rating_multiplier: 1.0,
            },
            StreakTier {
                id: StreakTierId::from_string(Self::INTERMEDIATE),
                name: "Intermediate".to_string(),
                min_streak_count: 15,
                rating_multiplier: 1.2,
            },
            StreakTier {
                id: StreakTierId::from_string(Self::ADVANCED),
                name: "Advanced".to_string(),
                min_streak_count: 30,
                rating_multiplier: 1.5,
            },
        ]
    }

    pub fn tiers(&self) -> &[StreakTier] {
        &self.tiers
    }

    pub fn base_tier(&self) -> &StreakTier {
        &self.tiers[0]
    }

    pub fn get(&self, id: &StreakTierId) -> Option<&StreakTier> {
        self.tiers.iter().find(|tier| &tier.id == id)
    }

    /// Highest tier whose threshold the streak count has reached
    pub fn classify(&self, streak_count: u32) -> &StreakTier {
        self.tiers
            .iter()
            .rev()
            .find(|tier| tier.min_streak_count <= streak_count)
            .unwrap_or(&self.tiers[0])
    }

    /// Tier a record is rated under; a cleared tier rates as the base tier.
    pub fn resolve(&self, id: Option<&StreakTierId>) -> Result<&StreakTier, DomainError> {
        match id {
            None => Ok(self.base_tier()),
            Some(id) => self
                .get(id)
                .ok_or_else(|| DomainError::NotFound(format!("Streak tier {}", id))),
        }
    }
}

impl Default for TierCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
