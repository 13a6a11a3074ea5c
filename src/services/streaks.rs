use chrono::NaiveDate;
use serde::Serialize;

use crate::models::log::WorkoutLogs;
use crate::program::Program;
use crate::program::calendar::date_for_program_day;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Streaks {
    pub current: u32,
    pub longest: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekConsistency {
    pub week_number: u32,
    pub completed: u32,
    pub scheduled: u32,
    pub percent: u32,
}

/// Every non-rest training date of the program, in order.
pub fn scheduled_dates(program: &Program, start: NaiveDate) -> Vec<NaiveDate> {
    program
        .weeks
        .iter()
        .flat_map(|week| {
            week.days
                .iter()
                .filter(|day| !day.is_rest_day)
                .map(move |day| date_for_program_day(start, week.week_number, day.day_index))
        })
        .collect()
}

pub fn calculate_streaks(
    program: &Program,
    logs: &WorkoutLogs,
    start: NaiveDate,
    today: NaiveDate,
) -> Streaks {
    let total = logs.len() as u32;
    let past: Vec<NaiveDate> = scheduled_dates(program, start)
        .into_iter()
        .filter(|date| *date <= today)
        .collect();

    let mut longest = 0;
    let mut run = 0;
    for date in &past {
        if logs.contains_key(date) {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }

    let mut current = 0;
    for date in past.iter().rev() {
        let logged = logs.contains_key(date);
        // Today can still be trained, so an open today does not break the streak.
        if *date == today && !logged {
            continue;
        }
        if !logged {
            break;
        }
        current += 1;
    }

    Streaks {
        current,
        longest,
        total,
    }
}

pub fn percent(completed: u32, scheduled: u32) -> u32 {
    if scheduled == 0 {
        return 0;
    }
    (f64::from(completed) / f64::from(scheduled) * 100.0).round() as u32
}

/// Completion per program week, counting only scheduled dates up to today.
pub fn weekly_consistency(
    program: &Program,
    logs: &WorkoutLogs,
    start: NaiveDate,
    today: NaiveDate,
) -> Vec<WeekConsistency> {
    program
        .weeks
        .iter()
        .filter_map(|week| {
            let dates: Vec<NaiveDate> = week
                .days
                .iter()
                .filter(|day| !day.is_rest_day)
                .map(|day| date_for_program_day(start, week.week_number, day.day_index))
                .filter(|date| *date <= today)
                .collect();
            if dates.is_empty() {
                return None;
            }

            let scheduled = dates.len() as u32;
            let completed = dates.iter().filter(|d| logs.contains_key(*d)).count() as u32;
            Some(WeekConsistency {
                week_number: week.week_number,
                completed,
                scheduled,
                percent: percent(completed, scheduled),
            })
        })
        .collect()
}
