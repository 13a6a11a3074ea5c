//! The session layer: plans a day from the program and the lifter's state,
//! and applies a finished session to the record as one replacement.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::lift::Lift;
use crate::models::log::{
    AdjustmentHistoryEntry, MetconFormat, MetconScoreEntry, MetconVariant, ReadinessEntry,
    ReadinessSource, SectionLog, WorkoutLog,
};
use crate::program::calendar::{day_name, program_day_for_date};
use crate::program::phases::{Phase, phase_for_week};
use crate::program::{Program, SectionKind};
use crate::services::adjustment::{apply_delta, calculate_delta, validate_exertion};
use crate::services::coach_parser::CoachAction;
use crate::services::readiness::{self, CheckIn, WorkoutModifications};
use crate::services::records::{NewRecord, check_for_new_records, commit_records};
use crate::services::weights::{PrescribedSet, effective_max, prescribe_sets};
use crate::store::AppData;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedSection {
    pub id: String,
    pub kind: SectionKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lift: Option<Lift>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sets: Vec<PrescribedSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metcon_format: Option<MetconFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metcon_variant: Option<MetconVariant>,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedSession {
    pub week_number: u32,
    pub day_index: u32,
    pub day_name: &'static str,
    pub label: String,
    pub phase: Phase,
    pub readiness_score: Option<u8>,
    pub modifications: WorkoutModifications,
    pub sections: Vec<PlannedSection>,
    /// Sections left after the readiness filter; what completion is tracked against.
    pub total_sections: usize,
}

/// Builds the day's prescription, scaled by the day's readiness check-in.
pub fn plan_session(
    program: &Program,
    data: &AppData,
    week_number: u32,
    day_index: u32,
    readiness: Option<&ReadinessEntry>,
) -> Result<PlannedSession, EngineError> {
    let day = program
        .day(week_number, day_index)
        .ok_or(EngineError::UnknownProgramDay {
            week: week_number,
            day: day_index,
        })?;
    if day.is_rest_day {
        return Err(EngineError::RestDay {
            week: week_number,
            day: day_index,
        });
    }

    let modifications = match readiness {
        Some(entry) => readiness::classify(entry.score)?,
        None => WorkoutModifications::unscaled(),
    };

    let sections: Vec<PlannedSection> = day
        .sections
        .iter()
        .filter(|section| modifications.keeps_section(section.kind))
        .map(|section| {
            let max = section
                .lift
                .map(|lift| effective_max(lift, &data.base_maxes, &data.adjustments));
            let sets = match (section.kind, max) {
                (SectionKind::Strength, Some(max)) => {
                    prescribe_sets(max, &modifications.apply_to_sets(&section.sets))
                }
                _ => Vec::new(),
            };

            PlannedSection {
                id: section.id.clone(),
                kind: section.kind,
                title: section.title.clone(),
                lift: section.lift,
                effective_max: max,
                scheme: section.scheme.clone(),
                sets,
                metcon_format: section.metcon_format,
                metcon_variant: (section.kind == SectionKind::Metcon)
                    .then_some(modifications.metcon_scale),
                optional: section.kind == SectionKind::Accessory && modifications.skip_accessory,
            }
        })
        .collect();

    Ok(PlannedSession {
        week_number,
        day_index,
        day_name: day_name(day_index),
        label: day.label.clone(),
        phase: phase_for_week(week_number),
        readiness_score: readiness.map(|entry| entry.score),
        modifications,
        total_sections: sections.len(),
        sections,
    })
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSubmission {
    pub date: NaiveDate,
    pub week_number: u32,
    pub day_index: u32,
    /// Keyed by section id.
    #[serde(default)]
    pub sections: BTreeMap<String, SectionLog>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedAdjustment {
    pub lift: Lift,
    pub delta: f64,
    pub new_adjustment: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOutcome {
    pub adjustments: Vec<AppliedAdjustment>,
    pub new_records: Vec<NewRecord>,
}

/// Applies a finished session: exertion-driven adjustments with their history,
/// new personal records, metcon scores and the log itself.
///
/// The submitted week and day must be the ones the calendar assigns to `date`.
pub fn complete_workout(
    program: &Program,
    data: &AppData,
    submission: WorkoutSubmission,
    now: DateTime<Utc>,
) -> Result<(AppData, CompletionOutcome), EngineError> {
    let WorkoutSubmission {
        date,
        week_number,
        day_index,
        sections,
    } = submission;

    if data.workout_logs.contains_key(&date) {
        return Err(EngineError::DuplicateWorkoutLog(date));
    }
    let start = data.start_date.ok_or(EngineError::StartDateNotSet)?;
    let (expected_week, expected_day) =
        program_day_for_date(start, date).ok_or(EngineError::DateOutsideProgram(date))?;
    if (week_number, day_index) != (expected_week, expected_day) {
        return Err(EngineError::ProgramDayMismatch {
            date,
            week: week_number,
            day: day_index,
            expected_week,
            expected_day,
        });
    }
    let day = program
        .day(week_number, day_index)
        .ok_or(EngineError::UnknownProgramDay {
            week: week_number,
            day: day_index,
        })?;
    if day.is_rest_day {
        return Err(EngineError::RestDay {
            week: week_number,
            day: day_index,
        });
    }
    for rpe in sections.values().filter_map(|section| section.rpe) {
        validate_exertion(rpe)?;
    }
    if let Some(set) = sections
        .values()
        .flat_map(|section| section.sets.iter())
        .find(|set| !set.weight.is_finite() || set.weight < 0.0)
    {
        return Err(EngineError::InvalidSetWeight(set.weight));
    }

    let target = phase_for_week(week_number).target_rpe;
    let mut next = data.clone();
    let mut outcome = CompletionOutcome::default();

    for section in sections.values() {
        if let (Some(lift), Some(rpe)) = (section.lift_key, section.rpe) {
            let adjustment = calculate_delta(rpe, target)?;
            if let Some(reason) = adjustment.reason
                && adjustment.delta != 0.0
            {
                next.adjustments = apply_delta(&next.adjustments, lift, adjustment.delta);
                next.adjustment_history.push(AdjustmentHistoryEntry {
                    date,
                    lift_key: lift,
                    rpe,
                    delta: adjustment.delta,
                    week_number,
                    reason: reason.clone(),
                });
                outcome.adjustments.push(AppliedAdjustment {
                    lift,
                    delta: adjustment.delta,
                    new_adjustment: next.adjustments.get(&lift).copied().unwrap_or(0.0),
                    reason,
                });
            }
        }

        if section.lift_key.is_some() {
            let new_records = check_for_new_records(&next.personal_records, section);
            commit_records(&mut next.personal_records, &new_records, date, week_number);
            outcome.new_records.extend(new_records);
        }

        if let (Some(name), Some(score), Some(format)) =
            (&section.name, &section.score, section.format)
            && !score.trim().is_empty()
        {
            next.metcon_scores
                .entry(name.clone())
                .or_default()
                .push(MetconScoreEntry {
                    date,
                    score: score.trim().to_string(),
                    variant: section.variant.unwrap_or(MetconVariant::Rx),
                    format,
                });
        }
    }

    next.workout_logs.insert(
        date,
        WorkoutLog {
            date,
            week_number,
            day_index,
            completed_at: now,
            sections,
        },
    );

    Ok((next, outcome))
}

/// Sets a new base max. The lift's learned adjustment starts over from zero.
pub fn update_base_max(data: &AppData, lift: Lift, kg: f64) -> Result<AppData, EngineError> {
    if !kg.is_finite() || kg < 0.0 {
        return Err(EngineError::InvalidBaseMax(kg));
    }
    let mut next = data.clone();
    next.base_maxes.insert(lift, kg);
    next.adjustments.insert(lift, 0.0);
    Ok(next)
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum ReadinessInput {
    Manual(CheckIn),
    External {
        #[serde(rename = "recoveryPercent")]
        recovery_percent: f64,
    },
}

/// Stores the check-in for `date`, replacing any earlier one that day.
pub fn record_readiness(
    data: &AppData,
    date: NaiveDate,
    input: ReadinessInput,
    now: DateTime<Utc>,
) -> Result<(AppData, ReadinessEntry), EngineError> {
    let entry = match input {
        ReadinessInput::Manual(check_in) => ReadinessEntry {
            score: readiness::composite_score(check_in)?,
            sleep: Some(check_in.sleep),
            soreness: Some(check_in.soreness),
            mood: Some(check_in.mood),
            recovery_percent: None,
            source: ReadinessSource::Manual,
            timestamp: now,
        },
        ReadinessInput::External { recovery_percent } => ReadinessEntry {
            score: readiness::external_score(recovery_percent)?,
            sleep: None,
            soreness: None,
            mood: None,
            recovery_percent: Some(recovery_percent),
            source: ReadinessSource::Wearable,
            timestamp: now,
        },
    };

    let mut next = data.clone();
    next.readiness.insert(date, entry.clone());
    Ok((next, entry))
}

/// Applies confirmed coach actions. Max changes go through the same clamp
/// as exertion adjustments and leave no history entry.
pub fn apply_coach_actions(data: &AppData, actions: &[CoachAction]) -> AppData {
    let mut next = data.clone();
    for action in actions {
        match action {
            CoachAction::AdjustMax { lift, delta_kg } => {
                next.adjustments = apply_delta(&next.adjustments, *lift, *delta_kg);
            }
            CoachAction::AddNote { date, text } => {
                let note = next.workout_notes.entry(*date).or_default();
                if !note.is_empty() {
                    note.push('\n');
                }
                note.push_str(text.trim());
            }
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::log::LoggedSet;
    use crate::program::PROGRAM;
    use crate::services::readiness::TrainingMode;
    use chrono::TimeZone;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 6, 18, 0, 0).unwrap()
    }

    fn squat_section(rpe: u8, sets: &[(f64, u32)]) -> SectionLog {
        SectionLog {
            lift_key: Some(Lift::BackSquat),
            rpe: Some(rpe),
            sets: sets.iter().map(|&(w, r)| LoggedSet::new(w, r)).collect(),
            ..SectionLog::default()
        }
    }

    fn submission(day: &str, sections: Vec<(&str, SectionLog)>) -> WorkoutSubmission {
        WorkoutSubmission {
            date: date(day),
            week_number: 1,
            day_index: 0,
            sections: sections
                .into_iter()
                .map(|(id, section)| (id.to_string(), section))
                .collect(),
        }
    }

    fn started() -> AppData {
        AppData {
            start_date: Some(date("2025-01-06")),
            ..AppData::default()
        }
    }

    fn readiness_entry(score: u8) -> ReadinessEntry {
        ReadinessEntry {
            score,
            sleep: None,
            soreness: None,
            mood: None,
            recovery_percent: None,
            source: ReadinessSource::Manual,
            timestamp: now(),
        }
    }

    #[test]
    fn test_plan_prescribes_from_effective_max() {
        let mut data = AppData::default();
        data.adjustments.insert(Lift::BackSquat, 10.0);

        let session = plan_session(&PROGRAM, &data, 1, 0, None).unwrap();
        assert_eq!(session.modifications.mode, TrainingMode::Normal);
        assert_eq!(session.total_sections, 6);

        let strength = &session.sections[1];
        assert_eq!(strength.effective_max, Some(130.0));
        let weights: Vec<f64> = strength.sets.iter().map(|s| s.target_weight).collect();
        // 130 * [0.45, 0.55, 0.55, 0.60, 0.60, 0.65]
        assert_eq!(weights, vec![57.5, 72.5, 72.5, 77.5, 77.5, 85.0]);
        assert_eq!(session.sections[3].metcon_variant, Some(MetconVariant::Rx));
    }

    #[test]
    fn test_light_day_plan() {
        let data = AppData::default();
        let entry = readiness_entry(3);
        let session = plan_session(&PROGRAM, &data, 1, 0, Some(&entry)).unwrap();

        let strength = &session.sections[1];
        // ceil(6 * 0.75) = 5 sets, each 5 points lighter
        assert_eq!(strength.sets.len(), 5);
        assert_eq!(strength.sets[0].target_weight, 47.5);
        assert!(session.sections[2].optional);
        assert_eq!(session.sections[3].metcon_variant, Some(MetconVariant::Scaled));
        assert_eq!(session.total_sections, 6);
    }

    #[test]
    fn test_active_recovery_plan_keeps_only_recovery_work() {
        let data = AppData::default();
        let entry = readiness_entry(2);
        let session = plan_session(&PROGRAM, &data, 1, 0, Some(&entry)).unwrap();

        let kinds: Vec<_> = session.sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![SectionKind::Warmup, SectionKind::Cooldown, SectionKind::Rehab]
        );
        assert_eq!(session.total_sections, 3);
    }

    #[test]
    fn test_plan_rejects_rest_and_unknown_days() {
        let data = AppData::default();
        assert_eq!(
            plan_session(&PROGRAM, &data, 1, 2, None),
            Err(EngineError::RestDay { week: 1, day: 2 })
        );
        assert_eq!(
            plan_session(&PROGRAM, &data, 13, 0, None),
            Err(EngineError::UnknownProgramDay { week: 13, day: 0 })
        );
    }

    #[test]
    fn test_hard_session_lowers_adjustment() {
        let data = started();
        let (next, outcome) = complete_workout(
            &PROGRAM,
            &data,
            submission(
                "2025-01-06",
                vec![("w1d0-strength1", squat_section(9, &[(60.0, 6), (77.5, 6)]))],
            ),
            now(),
        )
        .unwrap();

        assert_eq!(next.adjustments[&Lift::BackSquat], -2.5);
        assert_eq!(next.adjustment_history.len(), 1);
        let entry = &next.adjustment_history[0];
        assert_eq!(entry.delta, -2.5);
        assert_eq!(entry.rpe, 9);
        assert_eq!(entry.week_number, 1);
        assert_eq!(outcome.adjustments[0].new_adjustment, -2.5);
        assert!(next.workout_logs.contains_key(&date("2025-01-06")));
    }

    #[test]
    fn test_on_target_session_writes_no_history() {
        let data = started();
        let (next, outcome) = complete_workout(
            &PROGRAM,
            &data,
            submission(
                "2025-01-06",
                vec![("w1d0-strength1", squat_section(7, &[(60.0, 6)]))],
            ),
            now(),
        )
        .unwrap();

        assert_eq!(next.adjustments[&Lift::BackSquat], 0.0);
        assert!(next.adjustment_history.is_empty());
        assert!(outcome.adjustments.is_empty());
    }

    #[test]
    fn test_records_are_detected_and_committed() {
        let data = started();
        let (next, outcome) = complete_workout(
            &PROGRAM,
            &data,
            submission(
                "2025-01-06",
                vec![(
                    "w1d0-strength1",
                    squat_section(7, &[(60.0, 6), (77.5, 6), (80.0, 3), (0.0, 5)]),
                )],
            ),
            now(),
        )
        .unwrap();

        let squat = &next.personal_records[&Lift::BackSquat];
        assert_eq!(squat[&6].weight, 77.5);
        assert_eq!(squat[&3].weight, 80.0);
        assert!(!squat.contains_key(&5));
        assert_eq!(outcome.new_records.len(), 3);

        let mut later = submission(
            "2025-01-13",
            vec![("w2d0-strength1", squat_section(7, &[(70.0, 6), (82.5, 3)]))],
        );
        later.week_number = 2;
        let (after, outcome) = complete_workout(&PROGRAM, &next, later, now()).unwrap();
        let squat = &after.personal_records[&Lift::BackSquat];
        assert_eq!(squat[&6].weight, 77.5);
        assert_eq!(squat[&3].weight, 82.5);
        assert_eq!(squat[&3].week_number, 2);
        assert_eq!(outcome.new_records.len(), 1);
    }

    #[test]
    fn test_metcon_scores_are_appended() {
        let data = started();
        let metcon = SectionLog {
            name: Some("Anger".to_string()),
            format: Some(MetconFormat::Intervals),
            variant: Some(MetconVariant::Scaled),
            score: Some(" 112 cals ".to_string()),
            ..SectionLog::default()
        };
        let (next, _) = complete_workout(
            &PROGRAM,
            &data,
            submission("2025-01-06", vec![("w1d0-metcon3", metcon)]),
            now(),
        )
        .unwrap();

        let scores = &next.metcon_scores["Anger"];
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].score, "112 cals");
        assert_eq!(scores[0].variant, MetconVariant::Scaled);
    }

    #[test]
    fn test_completion_rejections() {
        let data = started();
        let bad_rpe = submission(
            "2025-01-06",
            vec![("w1d0-strength1", squat_section(11, &[(60.0, 6)]))],
        );
        assert_eq!(
            complete_workout(&PROGRAM, &data, bad_rpe, now()),
            Err(EngineError::InvalidExertion(11))
        );

        let (logged, _) = complete_workout(
            &PROGRAM,
            &data,
            submission("2025-01-06", Vec::new()),
            now(),
        )
        .unwrap();
        assert_eq!(
            complete_workout(&PROGRAM, &logged, submission("2025-01-06", Vec::new()), now()),
            Err(EngineError::DuplicateWorkoutLog(date("2025-01-06")))
        );

        let mut rest = submission("2025-01-08", Vec::new());
        rest.day_index = 2;
        assert_eq!(
            complete_workout(&PROGRAM, &data, rest, now()),
            Err(EngineError::RestDay { week: 1, day: 2 })
        );
    }

    #[test]
    fn test_completion_must_match_the_calendar() {
        assert_eq!(
            complete_workout(
                &PROGRAM,
                &AppData::default(),
                submission("2025-01-06", Vec::new()),
                now()
            ),
            Err(EngineError::StartDateNotSet)
        );

        let mut wrong_week = submission(
            "2025-01-08",
            vec![("w9d0-strength1", squat_section(9, &[(100.0, 3)]))],
        );
        wrong_week.week_number = 9;
        assert_eq!(
            complete_workout(&PROGRAM, &started(), wrong_week, now()),
            Err(EngineError::ProgramDayMismatch {
                date: date("2025-01-08"),
                week: 9,
                day: 0,
                expected_week: 1,
                expected_day: 2,
            })
        );

        assert_eq!(
            complete_workout(&PROGRAM, &started(), submission("2025-01-05", Vec::new()), now()),
            Err(EngineError::DateOutsideProgram(date("2025-01-05")))
        );
    }

    #[test]
    fn test_negative_set_weight_is_rejected() {
        let section = squat_section(7, &[(60.0, 6), (-20.0, 6)]);
        assert_eq!(
            complete_workout(
                &PROGRAM,
                &started(),
                submission("2025-01-06", vec![("w1d0-strength1", section)]),
                now()
            ),
            Err(EngineError::InvalidSetWeight(-20.0))
        );
    }

    #[test]
    fn test_base_max_edit_resets_adjustment() {
        let mut data = AppData::default();
        data.adjustments.insert(Lift::Deadlift, 7.5);

        let next = update_base_max(&data, Lift::Deadlift, 140.0).unwrap();
        assert_eq!(next.base_maxes[&Lift::Deadlift], 140.0);
        assert_eq!(next.adjustments[&Lift::Deadlift], 0.0);
        assert_eq!(
            effective_max(Lift::Deadlift, &next.base_maxes, &next.adjustments),
            140.0
        );

        assert_eq!(
            update_base_max(&data, Lift::Deadlift, -1.0),
            Err(EngineError::InvalidBaseMax(-1.0))
        );
        assert!(update_base_max(&data, Lift::Deadlift, f64::INFINITY).is_err());
    }

    #[test]
    fn test_manual_check_in_is_stored() {
        let data = AppData::default();
        let input = ReadinessInput::Manual(CheckIn {
            sleep: 2,
            soreness: 4,
            mood: 2,
        });
        let (next, entry) = record_readiness(&data, date("2025-01-06"), input, now()).unwrap();

        assert_eq!(entry.score, 3);
        assert_eq!(entry.source, ReadinessSource::Manual);
        assert_eq!(next.readiness[&date("2025-01-06")], entry);
        assert_eq!(readiness::classify(entry.score).unwrap().mode, TrainingMode::LightDay);
    }

    #[test]
    fn test_external_check_in_replaces_earlier_entry() {
        let data = AppData::default();
        let manual = ReadinessInput::Manual(CheckIn {
            sleep: 5,
            soreness: 1,
            mood: 5,
        });
        let (data, _) = record_readiness(&data, date("2025-01-06"), manual, now()).unwrap();

        let external = ReadinessInput::External {
            recovery_percent: 45.0,
        };
        let (next, entry) = record_readiness(&data, date("2025-01-06"), external, now()).unwrap();

        assert_eq!(entry.score, 5);
        assert_eq!(next.readiness.len(), 1);
        assert_eq!(next.readiness[&date("2025-01-06")].source, ReadinessSource::Wearable);
        assert_eq!(readiness::classify(entry.score).unwrap().mode, TrainingMode::Normal);
    }

    #[test]
    fn test_readiness_input_wire_format() {
        let manual: ReadinessInput =
            serde_json::from_str(r#"{"source":"manual","sleep":3,"soreness":2,"mood":4}"#).unwrap();
        assert_eq!(
            manual,
            ReadinessInput::Manual(CheckIn {
                sleep: 3,
                soreness: 2,
                mood: 4
            })
        );
        let external: ReadinessInput =
            serde_json::from_str(r#"{"source":"external","recoveryPercent":62}"#).unwrap();
        assert_eq!(
            external,
            ReadinessInput::External {
                recovery_percent: 62.0
            }
        );
    }

    #[test]
    fn test_coach_actions_clamp_and_append() {
        let mut data = AppData::default();
        data.adjustments.insert(Lift::Bench, 12.5);
        data.workout_notes
            .insert(date("2025-01-09"), "Tight hips".to_string());

        let next = apply_coach_actions(
            &data,
            &[
                CoachAction::AdjustMax {
                    lift: Lift::Bench,
                    delta_kg: 5.0,
                },
                CoachAction::AdjustMax {
                    lift: Lift::Deadlift,
                    delta_kg: -5.0,
                },
                CoachAction::AddNote {
                    date: date("2025-01-09"),
                    text: "Extra warm-up set".to_string(),
                },
                CoachAction::AddNote {
                    date: date("2025-01-10"),
                    text: "Deload pulls".to_string(),
                },
            ],
        );

        assert_eq!(next.adjustments[&Lift::Bench], 15.0);
        assert_eq!(next.adjustments[&Lift::Deadlift], -5.0);
        assert_eq!(
            next.workout_notes[&date("2025-01-09")],
            "Tight hips\nExtra warm-up set"
        );
        assert_eq!(next.workout_notes[&date("2025-01-10")], "Deload pulls");
        assert!(next.adjustment_history.is_empty());
    }
}
