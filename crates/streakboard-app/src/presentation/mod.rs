pub mod bootstrap;
pub mod error;
pub mod scenario;
pub mod state;
