pub mod lift;
pub mod log;
