use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::log::{ReadinessEntry, WorkoutLogs};
use crate::program::calendar::{ProgramPosition, date_for_program_day, program_position};
use crate::program::phases::{Phase, phase_for_week};
use crate::program::{Program, SectionKind};
use crate::services::readiness::{self, TrainingMode};
use crate::services::streaks::percent;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayProgress {
    pub day_index: u32,
    pub date: NaiveDate,
    pub is_rest: bool,
    pub is_scheduled: bool,
    pub is_completed: bool,
    pub is_past: bool,
    pub is_today: bool,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekProgress {
    pub week_number: u32,
    pub scheduled: u32,
    pub completed: u32,
    pub percent: u32,
    pub days: Vec<DayProgress>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    pub week_number: u32,
    pub completed_count: u32,
    pub scheduled_count: u32,
    pub percent: u32,
    pub total_volume: f64,
    pub metcons_completed: u32,
    pub avg_readiness: Option<f64>,
    pub readiness_mode: Option<TrainingMode>,
    pub phase: Phase,
    pub is_current: bool,
}

fn active_week(start: NaiveDate, today: NaiveDate) -> Option<(u32, u32)> {
    match program_position(start, today) {
        ProgramPosition::Active {
            week_number,
            day_index,
        } => Some((week_number, day_index)),
        _ => None,
    }
}

/// Day-by-day status of the week containing `today`.
pub fn current_week_progress(
    program: &Program,
    logs: &WorkoutLogs,
    start: NaiveDate,
    today: NaiveDate,
) -> Option<WeekProgress> {
    let (week_number, _) = active_week(start, today)?;
    let week = program.week(week_number)?;

    let days: Vec<DayProgress> = week
        .days
        .iter()
        .map(|day| {
            let date = date_for_program_day(start, week_number, day.day_index);
            DayProgress {
                day_index: day.day_index,
                date,
                is_rest: day.is_rest_day,
                is_scheduled: !day.is_rest_day,
                is_completed: logs.contains_key(&date),
                is_past: date <= today,
                is_today: date == today,
                label: day.label.clone(),
            }
        })
        .collect();

    let scheduled = days.iter().filter(|d| d.is_scheduled).count() as u32;
    let completed = days
        .iter()
        .filter(|d| d.is_scheduled && d.is_completed)
        .count() as u32;

    Some(WeekProgress {
        week_number,
        scheduled,
        completed,
        percent: percent(completed, scheduled),
        days,
    })
}

/// Recap of last week, or of the current week on its first day.
pub fn weekly_summary(
    program: &Program,
    logs: &WorkoutLogs,
    readiness: &BTreeMap<NaiveDate, ReadinessEntry>,
    start: NaiveDate,
    today: NaiveDate,
) -> Option<WeeklySummary> {
    let (current_week, day_index) = active_week(start, today)?;
    let target_week = if day_index >= 1 && current_week > 1 {
        current_week - 1
    } else {
        current_week
    };
    let week = program.week(target_week)?;

    let mut completed_count = 0;
    let mut scheduled_count = 0;
    let mut total_volume = 0.0;
    let mut metcons_completed = 0;
    let mut scores = Vec::new();

    for day in &week.days {
        let date = date_for_program_day(start, target_week, day.day_index);

        if !day.is_rest_day {
            scheduled_count += 1;
            if let Some(log) = logs.get(&date) {
                completed_count += 1;
                if day.sections.iter().any(|s| s.kind == SectionKind::Metcon) {
                    metcons_completed += 1;
                }
                total_volume += log
                    .sections
                    .values()
                    .flat_map(|section| section.sets.iter())
                    .filter(|set| set.is_counted())
                    .map(|set| set.volume())
                    .sum::<f64>();
            }
        }

        if let Some(entry) = readiness.get(&date) {
            scores.push(f64::from(entry.score));
        }
    }

    let avg_readiness = if scores.is_empty() {
        None
    } else {
        let avg = scores.iter().sum::<f64>() / scores.len() as f64;
        Some((avg * 10.0).round() / 10.0)
    };
    let readiness_mode = avg_readiness
        .and_then(|avg| readiness::classify(avg.floor() as u8).ok())
        .map(|mods| mods.mode);

    Some(WeeklySummary {
        week_number: target_week,
        completed_count,
        scheduled_count,
        percent: percent(completed_count, scheduled_count),
        total_volume,
        metcons_completed,
        avg_readiness,
        readiness_mode,
        phase: phase_for_week(target_week),
        is_current: target_week == current_week,
    })
}
