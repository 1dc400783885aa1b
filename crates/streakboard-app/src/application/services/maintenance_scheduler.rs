use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::FreezeService;
use crate::application::queries::LeaderboardQueries;
use streakboard_domain::DomainError;

/// What one maintenance pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MaintenanceReport {
    pub unfrozen: usize,
    pub swept: usize,
}

/// Periodic background pass: clears expired freezes and sweeps stale
/// leaderboard cache slots.
pub struct MaintenanceScheduler {
    freezes: Arc<FreezeService>,
    leaderboards: Arc<LeaderboardQueries>,
    interval: Duration,
    handle: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl MaintenanceScheduler {
    pub fn new(
        freezes: Arc<FreezeService>,
        leaderboards: Arc<LeaderboardQueries>,
        interval: Duration,
    ) -> Self {
        Self {
            freezes,
            leaderboards,
            interval,
            handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Run a single pass now
    pub async fn run_once(&self) -> Result<MaintenanceReport, DomainError> {
        run_pass(&self.freezes, &self.leaderboards).await
    }

    /// Spawn the background loop. A second call replaces the running loop.
    pub async fn start(&self) {
        let freezes = Arc::clone(&self.freezes);
        let leaderboards = Arc::clone(&self.leaderboards);
        let period = self.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if let Err(e) = run_pass(&freezes, &leaderboards).await {
                    warn!("[maintenance] pass failed: {}", e.format_with_code());
                }
            }
        });

        let mut slot = self.handle.lock().await;
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }

        info!(
            "[maintenance] scheduler started interval_secs={}",
            period.as_secs()
        );
    }

    pub async fn stop(&self) {
        if let Some(handle) = self.handle.lock().await.take() {
            handle.abort();
            info!("[maintenance] scheduler stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.handle
            .lock()
            .await
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}

async fn run_pass(
    freezes: &FreezeService,
    leaderboards: &LeaderboardQueries,
) -> Result<MaintenanceReport, DomainError> {
    let unfrozen = freezes.auto_unfreeze_expired().await?;
    let swept = leaderboards.sweep_cache().await;

    let report = MaintenanceReport { unfrozen, swept };
    debug!(
        "[maintenance] pass complete unfrozen={} swept={}",
        report.unfrozen, report.swept
    );
    Ok(report)
}
