//! Daily readiness: turns a check-in into one of four training modes and
//! reshapes the day's prescription accordingly.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::log::MetconVariant;
use crate::program::{SectionKind, SetScheme};

const SLEEP_WEIGHT: f64 = 0.40;
const SORENESS_WEIGHT: f64 = 0.35;
const MOOD_WEIGHT: f64 = 0.25;

/// Lowest percentage a readiness-adjusted set may drop to.
pub const MIN_ADJUSTED_PCT: f64 = 0.30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TrainingMode {
    FullSend,
    Normal,
    LightDay,
    ActiveRecovery,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutModifications {
    pub mode: TrainingMode,
    pub volume_multiplier: f64,
    pub intensity_pct: u32,
    /// Percentage points added to every strength set.
    pub intensity_delta: i32,
    pub metcon_scale: MetconVariant,
    pub skip_accessory: bool,
    pub active_recovery_only: bool,
    pub label: &'static str,
    pub emoji: &'static str,
    pub color: &'static str,
    pub description: &'static str,
}

const FULL_SEND: WorkoutModifications = WorkoutModifications {
    mode: TrainingMode::FullSend,
    volume_multiplier: 1.0,
    intensity_pct: 100,
    intensity_delta: 0,
    metcon_scale: MetconVariant::Rx,
    skip_accessory: false,
    active_recovery_only: false,
    label: "Full Send",
    emoji: "\u{1F7E2}",
    color: "#22c55e",
    description: "You're recovered and ready. Hit it hard today.",
};

const NORMAL: WorkoutModifications = WorkoutModifications {
    mode: TrainingMode::Normal,
    volume_multiplier: 1.0,
    intensity_pct: 100,
    intensity_delta: 0,
    metcon_scale: MetconVariant::Rx,
    skip_accessory: false,
    active_recovery_only: false,
    label: "Normal",
    emoji: "\u{1F7E1}",
    color: "#f59e0b",
    description: "Feeling okay. Follow the program as written.",
};

const LIGHT_DAY: WorkoutModifications = WorkoutModifications {
    mode: TrainingMode::LightDay,
    volume_multiplier: 0.75,
    intensity_pct: 80,
    intensity_delta: -5,
    metcon_scale: MetconVariant::Scaled,
    skip_accessory: true,
    active_recovery_only: false,
    label: "Light Day",
    emoji: "\u{1F7E0}",
    color: "#f97316",
    description: "Reducing to 80% intensity. Accessory work optional.",
};

const ACTIVE_RECOVERY: WorkoutModifications = WorkoutModifications {
    mode: TrainingMode::ActiveRecovery,
    volume_multiplier: 0.5,
    intensity_pct: 60,
    intensity_delta: -10,
    metcon_scale: MetconVariant::Scaled,
    skip_accessory: true,
    active_recovery_only: true,
    label: "Active Recovery",
    emoji: "\u{1F534}",
    color: "#ef4444",
    description: "Warmup + rehab only. Skip strength & metcon today.",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CheckIn {
    pub sleep: u8,
    pub soreness: u8,
    pub mood: u8,
}

fn validate_sub_score(field: &'static str, value: u8) -> Result<f64, EngineError> {
    if (1..=5).contains(&value) {
        Ok(f64::from(value))
    } else {
        Err(EngineError::InvalidSubScore { field, value })
    }
}

/// Weighted 1-10 score from three 1-5 sub-scores. Soreness counts inverted.
pub fn composite_score(check_in: CheckIn) -> Result<u8, EngineError> {
    let sleep = (validate_sub_score("sleep", check_in.sleep)? - 1.0) / 4.0;
    let soreness = (5.0 - validate_sub_score("soreness", check_in.soreness)?) / 4.0;
    let mood = (validate_sub_score("mood", check_in.mood)? - 1.0) / 4.0;

    let composite = sleep * SLEEP_WEIGHT + soreness * SORENESS_WEIGHT + mood * MOOD_WEIGHT;
    Ok((composite * 9.0).round() as u8 + 1)
}

/// Maps a wearable recovery percentage onto the same 1-10 scale.
pub fn external_score(recovery_percent: f64) -> Result<u8, EngineError> {
    if !recovery_percent.is_finite() || !(0.0..=100.0).contains(&recovery_percent) {
        return Err(EngineError::InvalidRecoveryPercent(recovery_percent));
    }
    Ok((recovery_percent / 10.0).round().clamp(1.0, 10.0) as u8)
}

pub fn classify(score: u8) -> Result<WorkoutModifications, EngineError> {
    match score {
        8..=10 => Ok(FULL_SEND),
        5..=7 => Ok(NORMAL),
        3..=4 => Ok(LIGHT_DAY),
        1..=2 => Ok(ACTIVE_RECOVERY),
        _ => Err(EngineError::InvalidReadinessScore(score)),
    }
}

impl WorkoutModifications {
    /// Mode used when no check-in exists for the day.
    pub fn unscaled() -> Self {
        NORMAL
    }

    /// Shifts every percentage by the intensity delta and trims the tail of
    /// the list down to `ceil(n * volume_multiplier)` sets, keeping at least one.
    pub fn apply_to_sets(&self, sets: &[SetScheme]) -> Vec<SetScheme> {
        let keep = if self.volume_multiplier < 1.0 && !sets.is_empty() {
            ((sets.len() as f64 * self.volume_multiplier).ceil() as usize).max(1)
        } else {
            sets.len()
        };

        // TODO: confirm with product whether trimming should drop the
        // lightest sets instead of the heaviest top sets.
        sets.iter()
            .take(keep)
            .map(|scheme| {
                let pct = if self.intensity_delta == 0 {
                    scheme.pct
                } else {
                    (scheme.pct + f64::from(self.intensity_delta) / 100.0).max(MIN_ADJUSTED_PCT)
                };
                SetScheme { pct, ..*scheme }
            })
            .collect()
    }

    /// Whether a section survives today's mode at all.
    pub fn keeps_section(&self, kind: SectionKind) -> bool {
        if !self.active_recovery_only {
            return true;
        }
        matches!(
            kind,
            SectionKind::Warmup | SectionKind::Cooldown | SectionKind::Rehab
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_in(sleep: u8, soreness: u8, mood: u8) -> CheckIn {
        CheckIn {
            sleep,
            soreness,
            mood,
        }
    }

    fn scheme(pct: f64, set: u32) -> SetScheme {
        SetScheme { pct, reps: 5, set }
    }

    #[test]
    fn test_composite_score_light_day() {
        let score = composite_score(check_in(2, 4, 2)).unwrap();
        assert_eq!(score, 3);

        let mods = classify(score).unwrap();
        assert_eq!(mods.mode, TrainingMode::LightDay);
        assert_eq!(mods.volume_multiplier, 0.75);
        assert_eq!(mods.intensity_delta, -5);
    }

    #[test]
    fn test_composite_score_extremes() {
        assert_eq!(composite_score(check_in(5, 1, 5)).unwrap(), 10);
        assert_eq!(composite_score(check_in(1, 5, 1)).unwrap(), 1);
    }

    #[test]
    fn test_composite_rejects_out_of_range_sub_scores() {
        assert_eq!(
            composite_score(check_in(0, 3, 3)),
            Err(EngineError::InvalidSubScore {
                field: "sleep",
                value: 0
            })
        );
        assert_eq!(
            composite_score(check_in(3, 6, 3)),
            Err(EngineError::InvalidSubScore {
                field: "soreness",
                value: 6
            })
        );
    }

    #[test]
    fn test_external_score_mapping() {
        assert_eq!(external_score(45.0).unwrap(), 5);
        assert_eq!(classify(5).unwrap().mode, TrainingMode::Normal);
        assert_eq!(external_score(0.0).unwrap(), 1);
        assert_eq!(external_score(3.0).unwrap(), 1);
        assert_eq!(external_score(100.0).unwrap(), 10);
        assert!(external_score(101.0).is_err());
        assert!(external_score(f64::NAN).is_err());
    }

    #[test]
    fn test_classify_is_total_and_monotonic() {
        let mut previous: Option<WorkoutModifications> = None;
        for score in (1..=10).rev() {
            let mods = classify(score).unwrap();
            if let Some(prev) = previous {
                assert!(mods.volume_multiplier <= prev.volume_multiplier);
                assert!(mods.intensity_pct <= prev.intensity_pct);
                assert!(mods.intensity_delta <= prev.intensity_delta);
            }
            previous = Some(mods);
        }
        assert!(classify(0).is_err());
        assert!(classify(11).is_err());
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(classify(8).unwrap().mode, TrainingMode::FullSend);
        assert_eq!(classify(7).unwrap().mode, TrainingMode::Normal);
        assert_eq!(classify(4).unwrap().mode, TrainingMode::LightDay);
        assert_eq!(classify(2).unwrap().mode, TrainingMode::ActiveRecovery);
    }

    #[test]
    fn test_light_day_trims_tail_and_lowers_intensity() {
        let sets: Vec<_> = (1..=6).map(|i| scheme(0.5 + 0.05 * f64::from(i), i)).collect();
        let adjusted = classify(3).unwrap().apply_to_sets(&sets);

        // ceil(6 * 0.75) = 5
        assert_eq!(adjusted.len(), 5);
        assert_eq!(adjusted.last().unwrap().set, 5);
        assert!((adjusted[0].pct - 0.50).abs() < 1e-9);
    }

    #[test]
    fn test_active_recovery_keeps_at_least_one_set() {
        let adjusted = classify(1).unwrap().apply_to_sets(&[scheme(0.35, 1)]);
        assert_eq!(adjusted.len(), 1);
        assert_eq!(adjusted[0].pct, MIN_ADJUSTED_PCT);
    }

    #[test]
    fn test_normal_day_leaves_sets_alone() {
        let sets = vec![scheme(0.6, 1), scheme(0.7, 2)];
        assert_eq!(classify(6).unwrap().apply_to_sets(&sets), sets);
    }

    #[test]
    fn test_active_recovery_section_filter() {
        let mods = classify(2).unwrap();
        assert!(mods.keeps_section(SectionKind::Warmup));
        assert!(mods.keeps_section(SectionKind::Rehab));
        assert!(!mods.keeps_section(SectionKind::Strength));
        assert!(!mods.keeps_section(SectionKind::Metcon));
        assert!(classify(3).unwrap().keeps_section(SectionKind::Accessory));
    }
}
