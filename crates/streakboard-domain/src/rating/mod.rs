mod calculator;
mod label;


pub use calculator::{RatingBreakdown, RatingCalculator, RatingConfig, MAX_SCORE};
pub use label::RatingLabel;
