use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::lift::Lift;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoggedSet {
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub reps: u32,
}

impl LoggedSet {
    pub fn new(weight: f64, reps: u32) -> Self {
        Self { weight, reps }
    }

    /// Sets with no load or no reps are placeholders and never count.
    pub fn is_counted(&self) -> bool {
        self.weight > 0.0 && self.reps > 0
    }

    pub fn volume(&self) -> f64 {
        self.weight * f64::from(self.reps)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetconFormat {
    ForTime,
    Amrap,
    Intervals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetconVariant {
    Rx,
    Scaled,
}

/// What was recorded for one section of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionLog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lift_key: Option<Lift>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sets: Vec<LoggedSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<MetconFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<MetconVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutLog {
    pub date: NaiveDate,
    pub week_number: u32,
    pub day_index: u32,
    pub completed_at: DateTime<Utc>,
    /// Keyed by section id.
    #[serde(default)]
    pub sections: BTreeMap<String, SectionLog>,
}

pub type WorkoutLogs = BTreeMap<NaiveDate, WorkoutLog>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentHistoryEntry {
    pub date: NaiveDate,
    pub lift_key: Lift,
    pub rpe: u8,
    pub delta: f64,
    pub week_number: u32,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessSource {
    Manual,
    #[serde(rename = "whoop")]
    Wearable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessEntry {
    pub score: u8,
    #[serde(default)]
    pub sleep: Option<u8>,
    #[serde(default)]
    pub soreness: Option<u8>,
    #[serde(default)]
    pub mood: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_percent: Option<f64>,
    pub source: ReadinessSource,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalRecord {
    pub weight: f64,
    pub reps: u32,
    pub date: NaiveDate,
    pub week_number: u32,
}

/// Heaviest weight per lift at each exact rep count.
pub type RecordTable = BTreeMap<Lift, BTreeMap<u32, PersonalRecord>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetconScoreEntry {
    pub date: NaiveDate,
    pub score: String,
    pub variant: MetconVariant,
    pub format: MetconFormat,
}
