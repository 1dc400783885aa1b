// Application layer - services, queries and configuration
// Presentation layer - state wiring, error mapping and scenario replay

pub mod application;
pub mod presentation;
