// Domain layer - streak, freeze, rating and leaderboard rules
// No dependencies on infrastructure or application layers

pub mod activity;
pub mod clock;
pub mod directory;
pub mod freeze;
pub mod leaderboard;
pub mod rating;
pub mod reward;
pub mod shared;
pub mod streak;

// Re-exports for convenience
pub use clock::{Clock, ReferenceTimezone};
pub use shared::{BatchId, DomainError, UserId};
