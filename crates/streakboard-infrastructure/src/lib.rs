// Infrastructure layer - Technical implementations
// Depends on domain layer, implements its interfaces

pub mod cache;
pub mod clock;
pub mod logging;
pub mod notification;
pub mod persistence;
