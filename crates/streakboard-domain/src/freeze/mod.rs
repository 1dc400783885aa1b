mod config;
mod policy;

pub use config::FreezeConfig;
pub use policy::{FreezeGrant, FreezePolicy, FreezePrecondition, FreezeStatus};
