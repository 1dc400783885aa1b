mod common;

use chrono::Duration;
use common::{day, profile, user, Harness};

use streakboard_domain::activity::ActivityType;
use streakboard_domain::freeze::FreezePrecondition;
use streakboard_domain::rating::RatingLabel;
use streakboard_domain::streak::StreakTransition;
use streakboard_domain::DomainError;

#[tokio::test]
async fn consecutive_days_build_a_streak() {
    let harness = Harness::new(vec![profile("ada", None)]);
    harness.daily_activity("ada", 1, 5).await;

    let info = harness
        .state
        .services
        .streak
        .get_user_streak_info(&user("ada"))
        .await
        .unwrap();

    assert_eq!(info.streak_count, 5);
    assert_eq!(info.tier_name.as_deref(), Some("Beginner"));
    assert_eq!(info.last_activity_at, Some(day(5)));
    assert!(info.current_rating > 0.0);
    assert_eq!(info.max_rating, info.current_rating);
}

#[tokio::test]
async fn same_day_activity_is_logged_but_not_counted() {
    let harness = Harness::new(vec![profile("ada", None)]);
    let streak = &harness.state.services.streak;

    let first = streak
        .record_activity(&user("ada"), ActivityType::Video)
        .await
        .unwrap();
    harness.clock.advance(Duration::hours(3));
    let second = streak
        .record_activity(&user("ada"), ActivityType::Question)
        .await
        .unwrap();

    assert_eq!(first.transition, StreakTransition::Started);
    assert!(first.counted);
    assert_eq!(second.transition, StreakTransition::SameDay);
    assert!(!second.counted);
    assert_eq!(second.streak_count, 1);

    let log = streak.list_activities(&user("ada")).await.unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[1].activity_type, ActivityType::Question);
}

#[tokio::test]
async fn missed_day_breaks_the_streak() {
    let harness = Harness::new(vec![profile("ada", None)]);
    harness.daily_activity("ada", 1, 4).await;
    let peak = harness
        .state
        .services
        .streak
        .get_user_streak_info(&user("ada"))
        .await
        .unwrap()
        .max_rating;

    harness.clock.set(day(7));
    let outcome = harness
        .state
        .services
        .streak
        .record_activity(&user("ada"), ActivityType::FlashCard)
        .await
        .unwrap();

    assert_eq!(outcome.transition, StreakTransition::Broken);
    assert_eq!(outcome.streak_count, 0);

    let info = harness
        .state
        .services
        .streak
        .get_user_streak_info(&user("ada"))
        .await
        .unwrap();
    assert_eq!(info.max_rating, peak);
    assert_eq!(info.rating_label, RatingLabel::Novice);
}

#[tokio::test]
async fn rating_decays_while_idle() {
    let harness = Harness::new(vec![profile("ada", None)]);
    harness.daily_activity("ada", 1, 10).await;
    let streak = &harness.state.services.streak;

    let fresh = streak.get_rating_breakdown(&user("ada")).await.unwrap();
    harness.clock.set(day(14));
    let idle = streak.get_rating_breakdown(&user("ada")).await.unwrap();

    assert_eq!(fresh.penalty_points, 0.0);
    assert_eq!(idle.days_since_last_activity, 4);
    assert!(idle.penalty_points > 0.0);
    assert!(idle.final_score < fresh.final_score);
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let harness = Harness::new(vec![]);
    let services = &harness.state.services;

    assert!(matches!(
        services.streak.get_user_streak_info(&user("ghost")).await,
        Err(DomainError::NotFound(_))
    ));
    assert!(matches!(
        services.streak.get_rating_breakdown(&user("ghost")).await,
        Err(DomainError::NotFound(_))
    ));
    assert!(matches!(
        services.freeze.get_freeze_status(&user("ghost")).await,
        Err(DomainError::NotFound(_))
    ));
    assert!(matches!(
        services.freeze.freeze_streak(&user("ghost"), 2).await,
        Err(DomainError::NotFound(_))
    ));
    assert!(harness
        .state
        .repositories
        .streak_records
        .find_by_user_id(&user("ghost"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn freeze_bridges_the_gap_after_auto_unfreeze() {
    let harness = Harness::new(vec![profile("ada", None)]);
    harness.daily_activity("ada", 1, 8).await;
    let services = &harness.state.services;

    let grant = services.freeze.freeze_streak(&user("ada"), 3).await.unwrap();
    assert_eq!(grant.ends_at, day(11));
    assert_eq!(grant.freeze_number, 1);

    harness.clock.set(day(10));
    let status = services.freeze.get_freeze_status(&user("ada")).await.unwrap();
    assert!(status.is_frozen);
    assert_eq!(status.freezes_remaining, 2);
    let frozen_rating = services.streak.get_rating_breakdown(&user("ada")).await.unwrap();
    assert_eq!(frozen_rating.penalty_points, 0.0);

    harness.clock.set(day(12) - Duration::hours(1));
    let report = services.maintenance.run_once().await.unwrap();
    assert_eq!(report.unfrozen, 1);

    let status = services.freeze.get_freeze_status(&user("ada")).await.unwrap();
    assert!(!status.is_frozen);

    let outcome = services
        .streak
        .record_activity(&user("ada"), ActivityType::Video)
        .await
        .unwrap();
    assert_eq!(outcome.transition, StreakTransition::Continued);
    assert_eq!(outcome.streak_count, 9);
}

#[tokio::test]
async fn freeze_rules_are_enforced() {
    let harness = Harness::new(vec![profile("ada", None)]);
    harness.daily_activity("ada", 1, 3).await;
    let freeze = &harness.state.services.freeze;

    let err = freeze.freeze_streak(&user("ada"), 2).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::PreconditionFailed(FreezePrecondition::InsufficientStreak {
            required: 7,
            actual: 3
        })
    ));

    harness.daily_activity("ada", 4, 5).await;
    let err = freeze.freeze_streak(&user("ada"), 30).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::PreconditionFailed(FreezePrecondition::DurationTooLong { .. })
    ));

    freeze.freeze_streak(&user("ada"), 2).await.unwrap();
    assert!(matches!(
        freeze.freeze_streak(&user("ada"), 2).await,
        Err(DomainError::AlreadyInState(_))
    ));

    let status = freeze.unfreeze_streak(&user("ada")).await.unwrap();
    assert!(!status.is_frozen);
    assert_eq!(status.freezes_used_in_period, 1);
    assert!(matches!(
        freeze.unfreeze_streak(&user("ada")).await,
        Err(DomainError::AlreadyInState(_))
    ));
}

#[tokio::test]
async fn freeze_after_missed_days_does_not_save_the_streak() {
    let harness = Harness::new(vec![profile("ada", None)]);
    harness.daily_activity("ada", 1, 8).await;
    let services = &harness.state.services;

    // days 9 to 11 were missed
    harness.clock.set(day(12));
    let status = services.freeze.get_freeze_status(&user("ada")).await.unwrap();
    assert!(!status.can_freeze);

    let err = services.freeze.freeze_streak(&user("ada"), 3).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::PreconditionFailed(FreezePrecondition::InsufficientStreak {
            required: 7,
            actual: 0
        })
    ));

    let outcome = services
        .streak
        .record_activity(&user("ada"), ActivityType::Video)
        .await
        .unwrap();
    assert_eq!(outcome.transition, StreakTransition::Broken);
    assert_eq!(outcome.streak_count, 0);
}

#[tokio::test]
async fn background_maintenance_clears_expired_freezes() {
    use std::time::Duration as StdDuration;
    use streakboard_lib::application::services::MaintenanceScheduler;

    let harness = Harness::new(vec![profile("ada", None)]);
    harness.daily_activity("ada", 1, 7).await;
    let state = &harness.state;
    state.services.freeze.freeze_streak(&user("ada"), 1).await.unwrap();

    let scheduler = MaintenanceScheduler::new(
        state.services.freeze.clone(),
        state.queries.leaderboard.clone(),
        StdDuration::from_millis(20),
    );
    scheduler.start().await;
    assert!(scheduler.is_running().await);

    harness.clock.set(day(9));
    let mut cleared = false;
    for _ in 0..100 {
        tokio::time::sleep(StdDuration::from_millis(20)).await;
        let record = state
            .repositories
            .streak_records
            .find_by_user_id(&user("ada"))
            .await
            .unwrap()
            .unwrap();
        if !record.is_frozen() {
            cleared = true;
            break;
        }
    }
    scheduler.stop().await;

    assert!(cleared);
    assert!(!scheduler.is_running().await);
}
