use chrono::{DateTime, Utc};
use std::collections::HashMap;

use super::{LeaderboardEntry, LeaderboardFilter, LeaderboardPage, Pagination};
use crate::directory::UserProfile;
use crate::rating::{RatingBreakdown, RatingCalculator};
use crate::shared::{DomainError, UserId};
use crate::streak::{TierCatalog, UserStreakRecord};

/// A user of the scope whose rating could be computed.
#[derive(Debug, Clone, PartialEq)]
pub struct RatedUser {
    pub profile: UserProfile,
    pub breakdown: RatingBreakdown,
}

#[derive(Debug, Default)]
pub struct RatedPopulation {
    /// In directory enumeration order
    pub rated: Vec<RatedUser>,
    /// Users with no record or a record that failed to rate
    pub excluded: Vec<(UserId, Option<DomainError>)>,
}

impl RatedPopulation {
    pub fn scope_size(&self) -> usize {
        self.rated.len() + self.excluded.len()
    }
}

/// Rate every profile against its record as of `now`.
///
/// A missing or unratable record excludes that user instead of failing the
/// whole population.
pub fn rate_population(
    profiles: Vec<UserProfile>,
    records: &HashMap<UserId, UserStreakRecord>,
    catalog: &TierCatalog,
    calculator: &RatingCalculator,
    now: DateTime<Utc>,
) -> RatedPopulation {
    let mut population = RatedPopulation::default();

    for profile in profiles {
        let Some(record) = records.get(&profile.user_id) else {
            population.excluded.push((profile.user_id, None));
            continue;
        };

        match record.rating_breakdown(catalog, calculator, now) {
            Ok(breakdown) => population.rated.push(RatedUser { profile, breakdown }),
            Err(e) => population.excluded.push((profile.user_id, Some(e))),
        }
    }

    population
}

/// Filter, rank and paginate a rated population.
///
/// Ranking is by score descending; the sort is stable so ties keep their
/// enumeration order. Ranks are dense and 1-based over the filtered set.
pub fn build_leaderboard(
    rated: &[RatedUser],
    filter: &LeaderboardFilter,
    pagination: Pagination,
    now: DateTime<Utc>,
) -> LeaderboardPage {
    let mut matched: Vec<&RatedUser> = rated
        .iter()
        .filter(|user| {
            filter.matches(
                user.breakdown.rating_label,
                user.breakdown.last_activity_at,
            )
        })
        .collect();

    matched.sort_by(|a, b| b.breakdown.final_score.total_cmp(&a.breakdown.final_score));

    let total_matched = matched.len();
    let start = pagination.offset.min(total_matched);
    let end = pagination.offset.saturating_add(pagination.limit).min(total_matched);

    let entries = matched[start..end]
        .iter()
        .enumerate()
        .map(|(i, user)| LeaderboardEntry {
            rank: start + i + 1,
            user_id: user.profile.user_id.clone(),
            display_name: user.profile.display_name.clone(),
            score: user.breakdown.final_score,
            rating_label: user.breakdown.rating_label,
            streak_count: user.breakdown.streak_count,
            batch_id: user.profile.batch_id.clone(),
        })
        .collect();

    LeaderboardPage {
        entries,
        total_matched,
        computed_at: now,
    }
}
