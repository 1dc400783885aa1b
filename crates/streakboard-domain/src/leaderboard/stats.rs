use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{LeaderboardScope, RatedPopulation};
use crate::rating::RatingLabel;
use crate::shared::DomainError;

/// Streak buckets as `(label, lower, upper)`, both bounds inclusive
pub const STREAK_BUCKETS: [(&str, u32, u32); 4] = [
    ("0-5", 0, 5),
    ("6-10", 6, 10),
    ("11-20", 11, 20),
    ("21+", 21, u32::MAX),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardStats {
    pub scope: LeaderboardScope,
    pub total_users: usize,
    pub counted_users: usize,
    pub average_score: f64,
    pub highest_score: f64,
    pub lowest_score: f64,
    pub average_streak: f64,
    pub highest_streak: u32,
    pub lowest_streak: u32,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionBucket {
    pub label: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

impl Percentiles {
    /// `sorted` must be ascending
    pub fn of_sorted(sorted: &[f64]) -> Self {
        Self {
            p25: percentile(sorted, 25),
            p50: percentile(sorted, 50),
            p75: percentile(sorted, 75),
            p90: percentile(sorted, 90),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingDistribution {
    pub scope: LeaderboardScope,
    pub counted_users: usize,
    pub buckets: Vec<DistributionBucket>,
    pub percentiles: Percentiles,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakDistribution {
    pub scope: LeaderboardScope,
    pub counted_users: usize,
    pub buckets: Vec<DistributionBucket>,
    pub percentiles: Percentiles,
    pub computed_at: DateTime<Utc>,
}

/// Nearest-rank percentile at index `p * (n - 1) / 100` of an ascending slice
pub fn percentile(sorted: &[f64], p: usize) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let index = (p.min(100) * (sorted.len() - 1)) / 100;
    sorted[index]
}

fn ensure_counted(scope: &LeaderboardScope, population: &RatedPopulation) -> Result<(), DomainError> {
    if population.rated.is_empty() {
        return Err(DomainError::NotFound(format!(
            "No rated users in scope {}",
            scope
        )));
    }
    Ok(())
}

fn bucket(label: impl Into<String>, count: usize, total: usize) -> DistributionBucket {
    DistributionBucket {
        label: label.into(),
        count,
        percentage: count as f64 * 100.0 / total as f64,
    }
}

impl LeaderboardStats {
    pub fn compute(
        scope: LeaderboardScope,
        population: &RatedPopulation,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        ensure_counted(&scope, population)?;

        let counted = population.rated.len();
        let mut total_score = 0.0;
        let mut total_streak: u64 = 0;
        let mut highest_score = f64::MIN;
        let mut lowest_score = f64::MAX;
        let mut highest_streak = 0;
        let mut lowest_streak = u32::MAX;

        for user in &population.rated {
            let score = user.breakdown.final_score;
            let streak = user.breakdown.streak_count;

            total_score += score;
            total_streak += streak as u64;
            highest_score = highest_score.max(score);
            lowest_score = lowest_score.min(score);
            highest_streak = highest_streak.max(streak);
            lowest_streak = lowest_streak.min(streak);
        }

        Ok(Self {
            scope,
            total_users: population.scope_size(),
            counted_users: counted,
            average_score: total_score / counted as f64,
            highest_score,
            lowest_score,
            average_streak: total_streak as f64 / counted as f64,
            highest_streak,
            lowest_streak,
            computed_at: now,
        })
    }
}

impl RatingDistribution {
    pub fn compute(
        scope: LeaderboardScope,
        population: &RatedPopulation,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        ensure_counted(&scope, population)?;

        let total = population.rated.len();
        let buckets = RatingLabel::ALL
            .iter()
            .map(|label| {
                let count = population
                    .rated
                    .iter()
                    .filter(|user| user.breakdown.rating_label == *label)
                    .count();
                bucket(label.as_str(), count, total)
            })
            .collect();

        let mut scores: Vec<f64> = population
            .rated
            .iter()
            .map(|user| user.breakdown.final_score)
            .collect();
        scores.sort_by(f64::total_cmp);

        Ok(Self {
            scope,
            counted_users: total,
            buckets,
            percentiles: Percentiles::of_sorted(&scores),
            computed_at: now,
        })
    }
}

impl StreakDistribution {
    pub fn compute(
        scope: LeaderboardScope,
        population: &RatedPopulation,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        ensure_counted(&scope, population)?;

        let total = population.rated.len();
        let buckets = STREAK_BUCKETS
            .iter()
            .map(|(label, lower, upper)| {
                let count = population
                    .rated
                    .iter()
                    .filter(|user| (*lower..=*upper).contains(&user.breakdown.streak_count))
                    .count();
                bucket(*label, count, total)
            })
            .collect();

        let mut streaks: Vec<f64> = population
            .rated
            .iter()
            .map(|user| user.breakdown.streak_count as f64)
            .collect();
        streaks.sort_by(f64::total_cmp);

        Ok(Self {
            scope,
            counted_users: total,
            buckets,
            percentiles: Percentiles::of_sorted(&streaks),
            computed_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_nearest_rank_index() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];

        // (25 * 9) / 100 = 2
        assert_eq!(percentile(&values, 25), 3.0);
        // (50 * 9) / 100 = 4
        assert_eq!(percentile(&values, 50), 5.0);
        // (90 * 9) / 100 = 8
        assert_eq!(percentile(&values, 90), 9.0);
        assert_eq!(percentile(&values, 100), 10.0);
    }

    #[test]
    fn test_percentile_of_empty_and_single() {
        assert_eq!(percentile(&[], 50), 0.0);
        assert_eq!(percentile(&[42.0], 90), 42.0);
    }

    #[test]
    fn test_empty_population_not_found() {
        let population = RatedPopulation::default();
        let result = LeaderboardStats::compute(LeaderboardScope::Global, &population, Utc::now());
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }
}
