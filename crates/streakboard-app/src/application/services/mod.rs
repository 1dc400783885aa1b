mod config_service;
mod freeze_service;
mod maintenance_scheduler;
mod streak_service;

pub use config_service::{ConfigService, LogLevel};
pub use freeze_service::FreezeService;
pub use maintenance_scheduler::{MaintenanceReport, MaintenanceScheduler};
pub use streak_service::StreakService;
