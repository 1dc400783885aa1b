mod activity_log_repo;
mod streak_record_repo;
mod user_directory;

pub use activity_log_repo::InMemoryActivityLogRepository;
pub use streak_record_repo::InMemoryStreakRecordRepository;
pub use user_directory::InMemoryUserDirectory;
