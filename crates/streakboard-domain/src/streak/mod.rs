mod aggregate;
mod repository;
mod tier;
mod value_objects;


pub use aggregate::{UserStreakRecord, UserStreakRecordBuilder};
pub use repository::{RecordMutation, StreakRecordRepository};
pub use tier::{StreakTier, TierCatalog};
pub use value_objects::{ActivityOutcome, StreakTransition};
