use chrono::NaiveDate;
use thiserror::Error;

/// Input failures raised by the training engines and the session layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("exertion must be an integer between 1 and 10, got {0}")]
    InvalidExertion(u8),

    #[error("{field} must be between 1 and 5, got {value}")]
    InvalidSubScore { field: &'static str, value: u8 },

    #[error("readiness score must be between 1 and 10, got {0}")]
    InvalidReadinessScore(u8),

    #[error("recovery percentage must be between 0 and 100, got {0}")]
    InvalidRecoveryPercent(f64),

    #[error("target band [{low}, {high}] is not a valid 1-10 range")]
    InvalidTargetBand { low: u8, high: u8 },

    #[error("base max must be a non-negative number of kilograms, got {0}")]
    InvalidBaseMax(f64),

    #[error("unknown lift: {0}")]
    UnknownLift(String),

    #[error("no program day for week {week}, day {day}")]
    UnknownProgramDay { week: u32, day: u32 },

    #[error("week {week}, day {day} is a rest day")]
    RestDay { week: u32, day: u32 },

    #[error("{0} falls outside the program")]
    DateOutsideProgram(NaiveDate),

    #[error("{date} is week {expected_week}, day {expected_day}, not week {week}, day {day}")]
    ProgramDayMismatch {
        date: NaiveDate,
        week: u32,
        day: u32,
        expected_week: u32,
        expected_day: u32,
    },

    #[error("set weight must be a non-negative number of kilograms, got {0}")]
    InvalidSetWeight(f64),

    #[error("a workout is already logged for {0}")]
    DuplicateWorkoutLog(NaiveDate),

    #[error("program start date is not set")]
    StartDateNotSet,

    #[error("invalid backup: {0}")]
    InvalidBackup(String),
}
