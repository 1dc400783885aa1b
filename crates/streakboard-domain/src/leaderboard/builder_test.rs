#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::directory::UserProfile;
    use crate::rating::{RatingCalculator, RatingLabel};
    use crate::shared::{BatchId, DomainError, UserId};
    use crate::streak::{TierCatalog, UserStreakRecord};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::collections::HashMap;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap()
    }

    fn profile(id: &str) -> UserProfile {
        UserProfile {
            user_id: UserId::from_string(id),
            display_name: format!("Student {}", id),
            batch_id: Some(BatchId::from_string("batch-a")),
        }
    }

    fn record(id: &str, streak: u32, last_activity: DateTime<Utc>) -> UserStreakRecord {
        UserStreakRecord::builder(UserId::from_string(id))
            .streak_count(streak)
            .current_tier_id(Some(TierCatalog::standard().classify(streak).id().clone()))
            .last_activity_at(Some(last_activity))
            .build()
    }

    /// u1..u5 with streaks 5, 20, 10, 25, 12, all active now
    fn population() -> RatedPopulation {
        let streaks = [("u1", 5), ("u2", 20), ("u3", 10), ("u4", 25), ("u5", 12)];
        let profiles = streaks.iter().map(|(id, _)| profile(id)).collect();
        let records: HashMap<UserId, UserStreakRecord> = streaks
            .iter()
            .map(|(id, streak)| (UserId::from_string(id), record(id, *streak, now())))
            .collect();

        rate_population(
            profiles,
            &records,
            &TierCatalog::standard(),
            &RatingCalculator::default(),
            now(),
        )
    }

    fn ids(page: &LeaderboardPage) -> Vec<&str> {
        page.entries.iter().map(|e| e.user_id.as_str()).collect()
    }

    #[test]
    fn test_sorted_by_score_with_stable_ties() {
        let population = population();
        let page = build_leaderboard(
            &population.rated,
            &LeaderboardFilter::default(),
            Pagination::default(),
            now(),
        );

        // u2 and u4 both saturate at 100 and keep enumeration order
        assert_eq!(ids(&page), vec!["u2", "u4", "u5", "u3", "u1"]);
        assert_eq!(page.total_matched, 5);
        let ranks: Vec<usize> = page.entries.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
        assert_eq!(page.entries[0].score, 100.0);
        assert_eq!(page.entries[0].rating_label, RatingLabel::Expert);
    }

    #[test]
    fn test_page_equals_slice_of_full_board() {
        let population = population();
        let full = build_leaderboard(
            &population.rated,
            &LeaderboardFilter::default(),
            Pagination::new(100, 0).unwrap(),
            now(),
        );
        let page = build_leaderboard(
            &population.rated,
            &LeaderboardFilter::default(),
            Pagination::new(2, 1).unwrap(),
            now(),
        );

        assert_eq!(page.entries, full.entries[1..3].to_vec());
        assert_eq!(page.entries[0].rank, 2);
        assert_eq!(page.entries[1].rank, 3);
        assert_eq!(page.total_matched, 5);
    }

    #[test]
    fn test_offset_past_end_is_empty_page() {
        let population = population();
        let page = build_leaderboard(
            &population.rated,
            &LeaderboardFilter::default(),
            Pagination::new(10, 50).unwrap(),
            now(),
        );

        assert!(page.entries.is_empty());
        assert_eq!(page.total_matched, 5);
    }

    #[test]
    fn test_filter_by_label() {
        let population = population();
        let filter = LeaderboardFilter {
            rating_label: Some(RatingLabel::Expert),
            ..LeaderboardFilter::default()
        };

        let page = build_leaderboard(&population.rated, &filter, Pagination::default(), now());

        assert_eq!(ids(&page), vec!["u2", "u4"]);
        assert_eq!(page.total_matched, 2);
    }

    #[test]
    fn test_filter_by_activity_window_is_inclusive() {
        let profiles = vec![profile("old"), profile("edge"), profile("new"), profile("none")];
        let mut records = HashMap::new();
        records.insert(
            UserId::from_string("old"),
            record("old", 3, now() - Duration::days(10)),
        );
        records.insert(
            UserId::from_string("edge"),
            record("edge", 3, now() - Duration::days(2)),
        );
        records.insert(UserId::from_string("new"), record("new", 3, now()));
        records.insert(
            UserId::from_string("none"),
            UserStreakRecord::new(UserId::from_string("none"), now()),
        );
        let population = rate_population(
            profiles,
            &records,
            &TierCatalog::standard(),
            &RatingCalculator::default(),
            now(),
        );
        let filter = LeaderboardFilter {
            rating_label: None,
            active_from: Some(now() - Duration::days(2)),
            active_until: Some(now()),
        };

        let page = build_leaderboard(&population.rated, &filter, Pagination::default(), now());

        let mut matched = ids(&page);
        matched.sort();
        assert_eq!(matched, vec!["edge", "new"]);
    }

    #[test]
    fn test_inverted_window_rejected() {
        let filter = LeaderboardFilter {
            rating_label: None,
            active_from: Some(now()),
            active_until: Some(now() - Duration::days(1)),
        };
        assert!(matches!(filter.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_missing_and_corrupt_records_are_excluded() {
        let profiles = vec![profile("ok"), profile("missing"), profile("corrupt")];
        let mut records = HashMap::new();
        records.insert(UserId::from_string("ok"), record("ok", 4, now()));
        records.insert(
            UserId::from_string("corrupt"),
            UserStreakRecord::builder(UserId::from_string("corrupt"))
                .current_rating(-5.0)
                .build(),
        );

        let population = rate_population(
            profiles,
            &records,
            &TierCatalog::standard(),
            &RatingCalculator::default(),
            now(),
        );

        assert_eq!(population.rated.len(), 1);
        assert_eq!(population.excluded.len(), 2);
        assert_eq!(population.scope_size(), 3);
        assert!(population.excluded[0].1.is_none());
        assert!(matches!(
            population.excluded[1].1,
            Some(DomainError::InvalidState(_))
        ));
    }

    #[test]
    fn test_stats_over_counted_users() {
        let population = population();
        let stats = LeaderboardStats::compute(LeaderboardScope::Global, &population, now()).unwrap();

        assert_eq!(stats.total_users, 5);
        assert_eq!(stats.counted_users, 5);
        assert_eq!(stats.highest_score, 100.0);
        assert_eq!(stats.highest_streak, 25);
        assert_eq!(stats.lowest_streak, 5);
        assert!((stats.average_streak - 14.4).abs() < 1e-9);
        assert!(stats.lowest_score < 25.0);
    }

    #[test]
    fn test_rating_and_streak_distributions() {
        let population = population();

        let ratings =
            RatingDistribution::compute(LeaderboardScope::Global, &population, now()).unwrap();
        let counts: Vec<(&str, usize)> = ratings
            .buckets
            .iter()
            .map(|b| (b.label.as_str(), b.count))
            .collect();
        assert_eq!(
            counts,
            vec![
                ("novice", 1),
                ("beginner", 1),
                ("intermediate", 1),
                ("advanced", 0),
                ("expert", 2),
            ]
        );
        assert_eq!(ratings.percentiles.p90, 100.0);

        let streaks =
            StreakDistribution::compute(LeaderboardScope::Global, &population, now()).unwrap();
        let counts: Vec<usize> = streaks.buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 2, 1]);
        assert_eq!(streaks.buckets[2].percentage, 40.0);
        // sorted streaks [5, 10, 12, 20, 25]
        assert_eq!(streaks.percentiles.p25, 10.0);
        assert_eq!(streaks.percentiles.p50, 12.0);
        assert_eq!(streaks.percentiles.p75, 20.0);
    }
}
