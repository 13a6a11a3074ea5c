pub mod adjustment;
pub mod coach_parser;
pub mod coach_prompt;
pub mod metcon;
pub mod plates;
pub mod readiness;
pub mod records;
pub mod session;
pub mod streaks;
pub mod summary;
pub mod units;
pub mod weights;
