mod common;

use futures::future::join_all;
use std::sync::Arc;

use common::{profile, user, Harness};
use streakboard_domain::activity::ActivityType;
use streakboard_domain::streak::StreakTransition;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn same_user_concurrent_activity_counts_once() {
    let harness = Arc::new(Harness::new(vec![profile("ada", None)]));

    let tasks = (0..16).map(|i| {
        let harness = harness.clone();
        tokio::spawn(async move {
            let activity = if i % 2 == 0 {
                ActivityType::Video
            } else {
                ActivityType::FlashCard
            };
            harness
                .state
                .services
                .streak
                .record_activity(&user("ada"), activity)
                .await
        })
    });
    let outcomes: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    let started = outcomes
        .iter()
        .filter(|o| o.transition == StreakTransition::Started)
        .count();
    assert_eq!(started, 1);
    assert!(outcomes.iter().all(|o| o.streak_count == 1));

    let log = harness
        .state
        .services
        .streak
        .list_activities(&user("ada"))
        .await
        .unwrap();
    assert_eq!(log.len(), 16);
    assert_eq!(log.iter().filter(|item| item.counted).count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn different_users_progress_independently() {
    let names: Vec<String> = (0..20).map(|i| format!("u{}", i)).collect();
    let harness = Arc::new(Harness::new(
        names.iter().map(|n| profile(n, Some("b"))).collect(),
    ));

    let tasks = names.iter().cloned().map(|name| {
        let harness = harness.clone();
        tokio::spawn(async move {
            harness
                .state
                .services
                .streak
                .record_activity(&user(&name), ActivityType::Question)
                .await
        })
    });
    for joined in join_all(tasks).await {
        assert_eq!(joined.unwrap().unwrap().streak_count, 1);
    }

    let records = harness
        .state
        .repositories
        .streak_records
        .list_all()
        .await
        .unwrap();
    assert_eq!(records.len(), 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_freezes_grant_exactly_one() {
    let harness = Arc::new(Harness::new(vec![profile("ada", None)]));
    harness.daily_activity("ada", 1, 9).await;

    let tasks = (0..12).map(|_| {
        let harness = harness.clone();
        tokio::spawn(async move {
            harness
                .state
                .services
                .freeze
                .freeze_streak(&user("ada"), 2)
                .await
        })
    });
    let granted = join_all(tasks)
        .await
        .into_iter()
        .filter(|joined| matches!(joined, Ok(Ok(_))))
        .count();

    assert_eq!(granted, 1);
    let status = harness
        .state
        .services
        .freeze
        .get_freeze_status(&user("ada"))
        .await
        .unwrap();
    assert_eq!(status.freezes_used_in_period, 1);
}
