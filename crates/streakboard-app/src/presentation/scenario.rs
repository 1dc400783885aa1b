//! Replays a scripted sequence of engine calls against a manual clock.
//!
//! A scenario is a JSON document:
//!
//! ```json
//! {
//!   "users": [{"user_id": "u1", "display_name": "Ada", "batch_id": "b1"}],
//!   "start": "2024-03-01T09:00:00Z",
//!   "steps": [
//!     {"at": "2024-03-01T09:00:00Z", "action": "activity", "user_id": "u1", "activity_type": "video"},
//!     {"action": "leaderboard", "scope": {"kind": "global"}, "limit": 5}
//!   ]
//! }
//! ```
//!
//! Each step may move the clock forward with `at`; the report holds one
//! outcome per step, either a JSON result or a `CommandError`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::application::config::EngineConfig;
use crate::application::ResultExt;
use crate::presentation::bootstrap::build_app_state;
use crate::presentation::error::CommandError;
use crate::presentation::state::AppState;
use streakboard_domain::activity::ActivityType;
use streakboard_domain::directory::UserProfile;
use streakboard_domain::leaderboard::{LeaderboardFilter, LeaderboardScope};
use streakboard_domain::reward::RewardNotifier;
use streakboard_domain::UserId;
use streakboard_infrastructure::clock::ManualClock;
use streakboard_infrastructure::notification::LoggingRewardNotifier;
use streakboard_infrastructure::persistence::InMemoryUserDirectory;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub users: Vec<UserProfile>,
    pub start: DateTime<Utc>,
    pub steps: Vec<ScenarioStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioStep {
    /// Clock value for this step; the clock is left alone when absent
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub action: ScenarioAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioAction {
    Activity {
        user_id: String,
        activity_type: ActivityType,
    },
    Freeze {
        user_id: String,
        days: u32,
    },
    Unfreeze {
        user_id: String,
    },
    FreezeStatus {
        user_id: String,
    },
    StreakInfo {
        user_id: String,
    },
    Rating {
        user_id: String,
    },
    Leaderboard {
        #[serde(default = "global_scope")]
        scope: LeaderboardScope,
        #[serde(default)]
        filter: LeaderboardFilter,
        #[serde(default)]
        limit: Option<usize>,
        #[serde(default)]
        offset: Option<usize>,
    },
    Stats {
        #[serde(default = "global_scope")]
        scope: LeaderboardScope,
    },
    RatingDistribution {
        #[serde(default = "global_scope")]
        scope: LeaderboardScope,
    },
    StreakDistribution {
        #[serde(default = "global_scope")]
        scope: LeaderboardScope,
    },
    InvalidateCache,
    Maintenance,
}

fn global_scope() -> LeaderboardScope {
    LeaderboardScope::Global
}

fn to_json<T: Serialize>(value: T) -> Result<Value, CommandError> {
    Ok(serde_json::to_value(value).to_infra_err()?)
}

impl ScenarioAction {
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioAction::Activity { .. } => "activity",
            ScenarioAction::Freeze { .. } => "freeze",
            ScenarioAction::Unfreeze { .. } => "unfreeze",
            ScenarioAction::FreezeStatus { .. } => "freeze_status",
            ScenarioAction::StreakInfo { .. } => "streak_info",
            ScenarioAction::Rating { .. } => "rating",
            ScenarioAction::Leaderboard { .. } => "leaderboard",
            ScenarioAction::Stats { .. } => "stats",
            ScenarioAction::RatingDistribution { .. } => "rating_distribution",
            ScenarioAction::StreakDistribution { .. } => "streak_distribution",
            ScenarioAction::InvalidateCache => "invalidate_cache",
            ScenarioAction::Maintenance => "maintenance",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    pub index: usize,
    pub action: String,
    pub at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl StepOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub steps: Vec<StepOutcome>,
    pub failed_steps: usize,
}

/// Holds the state a scenario runs against
pub struct ScenarioRunner {
    state: AppState,
    clock: Arc<ManualClock>,
}

impl ScenarioRunner {
    pub fn new(
        config: &EngineConfig,
        users: Vec<UserProfile>,
        start: DateTime<Utc>,
    ) -> Result<Self, CommandError> {
        Self::with_notifier(config, users, start, Arc::new(LoggingRewardNotifier))
    }

    pub fn with_notifier(
        config: &EngineConfig,
        users: Vec<UserProfile>,
        start: DateTime<Utc>,
        notifier: Arc<dyn RewardNotifier>,
    ) -> Result<Self, CommandError> {
        let clock = Arc::new(ManualClock::new(start));
        let directory = Arc::new(InMemoryUserDirectory::with_users(users));
        let state = build_app_state(config, clock.clone(), notifier, directory)?;
        Ok(Self { state, clock })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    pub async fn run(&self, steps: &[ScenarioStep]) -> ScenarioReport {
        let mut outcomes = Vec::with_capacity(steps.len());

        for (index, step) in steps.iter().enumerate() {
            if let Some(at) = step.at {
                self.clock.set(at);
            }
            let at = self.state.clock.now();

            let (result, error) = match self.execute(&step.action).await {
                Ok(value) => (Some(value), None),
                Err(e) => {
                    debug!(
                        "[scenario] step {} {} failed: {}",
                        index,
                        step.action.name(),
                        e
                    );
                    (None, Some(e))
                }
            };

            outcomes.push(StepOutcome {
                index,
                action: step.action.name().to_string(),
                at,
                result,
                error,
            });
        }

        let failed_steps = outcomes.iter().filter(|o| !o.is_ok()).count();
        info!(
            "[scenario] replay finished steps={} failed={}",
            outcomes.len(),
            failed_steps
        );

        ScenarioReport {
            steps: outcomes,
            failed_steps,
        }
    }

    pub async fn execute(&self, action: &ScenarioAction) -> Result<Value, CommandError> {
        let services = &self.state.services;
        let leaderboard = &self.state.queries.leaderboard;

        let value = match action {
            ScenarioAction::Activity {
                user_id,
                activity_type,
            } => {
                let user_id = UserId::from_string(user_id);
                to_json(
                    services
                        .streak
                        .record_activity(&user_id, *activity_type)
                        .await?,
                )?
            }
            ScenarioAction::Freeze { user_id, days } => {
                let user_id = UserId::from_string(user_id);
                to_json(services.freeze.freeze_streak(&user_id, *days).await?)?
            }
            ScenarioAction::Unfreeze { user_id } => {
                let user_id = UserId::from_string(user_id);
                to_json(services.freeze.unfreeze_streak(&user_id).await?)?
            }
            ScenarioAction::FreezeStatus { user_id } => {
                let user_id = UserId::from_string(user_id);
                to_json(services.freeze.get_freeze_status(&user_id).await?)?
            }
            ScenarioAction::StreakInfo { user_id } => {
                let user_id = UserId::from_string(user_id);
                to_json(services.streak.get_user_streak_info(&user_id).await?)?
            }
            ScenarioAction::Rating { user_id } => {
                let user_id = UserId::from_string(user_id);
                to_json(services.streak.get_rating_breakdown(&user_id).await?)?
            }
            ScenarioAction::Leaderboard {
                scope,
                filter,
                limit,
                offset,
            } => {
                let pagination = leaderboard.pagination(*limit, *offset)?;
                to_json(
                    leaderboard
                        .get_batch_leaderboard(scope.clone(), filter.clone(), pagination)
                        .await?,
                )?
            }
            ScenarioAction::Stats { scope } => {
                to_json(leaderboard.get_leaderboard_stats(scope.clone()).await?)?
            }
            ScenarioAction::RatingDistribution { scope } => {
                to_json(leaderboard.get_rating_distribution(scope.clone()).await?)?
            }
            ScenarioAction::StreakDistribution { scope } => {
                to_json(leaderboard.get_streak_distribution(scope.clone()).await?)?
            }
            ScenarioAction::InvalidateCache => {
                serde_json::json!({ "invalidated": leaderboard.invalidate_cache().await })
            }
            ScenarioAction::Maintenance => {
                to_json(services.maintenance.run_once().await?)?
            }
        };

        Ok(value)
    }
}

/// Build fresh state for `scenario` and replay every step
pub async fn replay(
    config: &EngineConfig,
    scenario: &Scenario,
) -> Result<ScenarioReport, CommandError> {
    let runner = ScenarioRunner::new(config, scenario.users.clone(), scenario.start)?;
    Ok(runner.run(&scenario.steps).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_steps() {
        let raw = r#"{
            "users": [{"user_id": "u1", "display_name": "Ada", "batch_id": "b1"}],
            "start": "2024-03-01T09:00:00Z",
            "steps": [
                {"at": "2024-03-01T09:00:00Z", "action": "activity", "user_id": "u1", "activity_type": "flash_card"},
                {"action": "freeze", "user_id": "u1", "days": 2},
                {"action": "leaderboard", "scope": {"kind": "batch", "batch_id": "b1"}, "limit": 5},
                {"action": "stats"},
                {"action": "maintenance"}
            ]
        }"#;

        let scenario: Scenario = serde_json::from_str(raw).unwrap();

        assert_eq!(scenario.users.len(), 1);
        assert_eq!(scenario.steps.len(), 5);
        assert!(matches!(
            scenario.steps[0].action,
            ScenarioAction::Activity {
                activity_type: ActivityType::FlashCard,
                ..
            }
        ));
        assert!(scenario.steps[1].at.is_none());
        match &scenario.steps[2].action {
            ScenarioAction::Leaderboard { scope, limit, .. } => {
                assert_eq!(
                    scope,
                    &LeaderboardScope::Batch(streakboard_domain::BatchId::from_string("b1"))
                );
                assert_eq!(*limit, Some(5));
            }
            other => panic!("unexpected action {:?}", other),
        }
        assert!(matches!(
            &scenario.steps[3].action,
            ScenarioAction::Stats {
                scope: LeaderboardScope::Global
            }
        ));
    }

    #[tokio::test]
    async fn test_replay_reports_each_step() {
        let start: DateTime<Utc> = "2024-03-01T09:00:00Z".parse().unwrap();
        let scenario = Scenario {
            users: vec![UserProfile {
                user_id: UserId::from_string("u1"),
                display_name: "Ada".to_string(),
                batch_id: None,
            }],
            start,
            steps: vec![
                ScenarioStep {
                    at: None,
                    action: ScenarioAction::Activity {
                        user_id: "u1".to_string(),
                        activity_type: ActivityType::Video,
                    },
                },
                ScenarioStep {
                    at: Some(start + chrono::Duration::days(1)),
                    action: ScenarioAction::Activity {
                        user_id: "u1".to_string(),
                        activity_type: ActivityType::Question,
                    },
                },
                ScenarioStep {
                    at: None,
                    action: ScenarioAction::Freeze {
                        user_id: "u1".to_string(),
                        days: 2,
                    },
                },
                ScenarioStep {
                    at: None,
                    action: ScenarioAction::Leaderboard {
                        scope: LeaderboardScope::Global,
                        filter: LeaderboardFilter::default(),
                        limit: None,
                        offset: None,
                    },
                },
            ],
        };

        let report = replay(&EngineConfig::default(), &scenario).await.unwrap();

        assert_eq!(report.steps.len(), 4);
        assert_eq!(report.failed_steps, 1);
        assert_eq!(
            report.steps[1].result.as_ref().unwrap()["streak_count"],
            2
        );
        // streak of 2 is below the freeze minimum
        let error = report.steps[2].error.as_ref().unwrap();
        assert_eq!(error.code, 3001);
        let board = report.steps[3].result.as_ref().unwrap();
        assert_eq!(board["entries"][0]["user_id"], "u1");
        assert_eq!(board["total_matched"], 1);
    }
}
