use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

pub const PROGRAM_WEEKS: u32 = 12;

/// Monday of the week containing `date`. Week 1 of the program starts here.
pub fn monday_of_week(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

/// Calendar date of a program day. `day_index` is 0 for Monday through 6 for Sunday.
pub fn date_for_program_day(start: NaiveDate, week_number: u32, day_index: u32) -> NaiveDate {
    let offset = u64::from(week_number.saturating_sub(1)) * 7 + u64::from(day_index);
    monday_of_week(start) + Days::new(offset)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ProgramPosition {
    #[serde(rename_all = "camelCase")]
    NotStarted { days_until_start: i64 },
    #[serde(rename_all = "camelCase")]
    Active { week_number: u32, day_index: u32 },
    #[serde(rename_all = "camelCase")]
    Finished { week_number: u32, day_index: u32 },
}

pub fn program_position(start: NaiveDate, today: NaiveDate) -> ProgramPosition {
    if today < start {
        return ProgramPosition::NotStarted {
            days_until_start: (start - today).num_days(),
        };
    }

    let day_index = today.weekday().num_days_from_monday();
    let elapsed = (today - monday_of_week(start)).num_days();
    let week_number = (elapsed / 7) as u32 + 1;

    if week_number > PROGRAM_WEEKS {
        ProgramPosition::Finished {
            week_number,
            day_index,
        }
    } else {
        ProgramPosition::Active {
            week_number,
            day_index,
        }
    }
}

/// `(week_number, day_index)` for a date inside the program, `None` otherwise.
pub fn program_day_for_date(start: NaiveDate, date: NaiveDate) -> Option<(u32, u32)> {
    match program_position(start, date) {
        ProgramPosition::Active {
            week_number,
            day_index,
        } => Some((week_number, day_index)),
        _ => None,
    }
}

pub fn day_name(day_index: u32) -> &'static str {
    match day_index {
        0 => "Monday",
        1 => "Tuesday",
        2 => "Wednesday",
        3 => "Thursday",
        4 => "Friday",
        5 => "Saturday",
        6 => "Sunday",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_week_one_anchors_to_monday() {
        // 2025-01-08 is a Wednesday.
        let start = date("2025-01-08");
        assert_eq!(date_for_program_day(start, 1, 0), date("2025-01-06"));
        assert_eq!(date_for_program_day(start, 2, 3), date("2025-01-16"));
        assert_eq!(date_for_program_day(start, 12, 6), date("2025-03-30"));
    }

    #[test]
    fn test_program_position() {
        let start = date("2025-01-06");
        assert_eq!(
            program_position(start, date("2025-01-01")),
            ProgramPosition::NotStarted {
                days_until_start: 5
            }
        );
        assert_eq!(
            program_position(start, date("2025-01-15")),
            ProgramPosition::Active {
                week_number: 2,
                day_index: 2
            }
        );
        assert_eq!(
            program_position(start, date("2025-03-31")),
            ProgramPosition::Finished {
                week_number: 13,
                day_index: 0
            }
        );
    }

    #[test]
    fn test_program_day_for_date_outside_program() {
        let start = date("2025-01-06");
        assert_eq!(program_day_for_date(start, date("2025-01-05")), None);
        assert_eq!(program_day_for_date(start, date("2025-01-06")), Some((1, 0)));
        assert_eq!(program_day_for_date(start, date("2025-04-01")), None);
    }
}
