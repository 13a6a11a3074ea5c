use chrono::NaiveDate;
use serde::Serialize;

use crate::models::lift::Lift;
use crate::program::Program;
use crate::program::calendar::{day_name, program_day_for_date};
use crate::services::units::{WeightUnit, format_weight};
use crate::services::weights::effective_max;
use crate::store::AppData;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachContext {
    pub today: NaiveDate,
    pub week_number: u32,
    pub day_name: &'static str,
    pub day_label: String,
    pub readiness: String,
    pub lifts: Vec<String>,
    pub workout: Vec<String>,
}

/// Snapshot of where the lifter is today, as the coach will see it.
/// Outside the program it falls back to week 1, Monday.
pub fn build_coach_context(program: &Program, data: &AppData, today: NaiveDate) -> CoachContext {
    let (week_number, day_index) = data
        .start_date
        .and_then(|start| program_day_for_date(start, today))
        .unwrap_or((1, 0));
    let day = program.day(week_number, day_index);

    let readiness = data
        .readiness
        .get(&today)
        .map(|entry| format!("{}/10", entry.score))
        .unwrap_or_else(|| "Not set".to_string());

    let lifts = Lift::ALL
        .iter()
        .map(|&lift| {
            let max = effective_max(lift, &data.base_maxes, &data.adjustments);
            format!(
                "{}: {} ({})",
                lift.name(),
                format_weight(max, WeightUnit::Kg),
                format_weight(max, data.settings.unit)
            )
        })
        .collect();

    let workout = match day {
        Some(day) if !day.is_rest_day => day
            .sections
            .iter()
            .map(|section| format!("{} ({})", section.title, section.kind.as_str()))
            .collect(),
        _ => vec!["Rest day".to_string()],
    };

    CoachContext {
        today,
        week_number,
        day_name: day_name(day_index),
        day_label: day
            .map(|day| day.label.clone())
            .unwrap_or_else(|| "Rest Day".to_string()),
        readiness,
        lifts,
        workout,
    }
}

fn format_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("  - {}\n", item))
        .collect::<Vec<_>>()
        .join("")
}

pub fn build_coach_prompt(context: &CoachContext, message: &str) -> String {
    format!(
        r#"You are a strength and conditioning coach for a hybrid athlete running a 12-week program while returning from a 5th metatarsal fracture.

CURRENT CONTEXT:
Date: {}
Week {} - {} ({})
Readiness: {}

EFFECTIVE 1RMs:
{}
TODAY'S WORKOUT:
{}
RULES:
- Keep answers short and practical.
- Respect the injury restrictions of the current phase.
- Only suggest 1RM changes in steps of 2.5kg, never more than 10kg at once.
- Lift keys are: backSquat, deadlift, bench, pushPress, hipThrust, powerClean, snatch.
- Dates are ISO 8601 (YYYY-MM-DD).

OUTPUT FORMAT:
Return ONLY a JSON object with this exact structure:
{{
    "response": "Your reply to the athlete",
    "actions": [
        {{ "type": "adjust_1rm", "lift": "deadlift", "delta_kg": -5 }},
        {{ "type": "add_note", "date": "{}", "text": "Short note" }}
    ]
}}
Use an empty "actions" array when nothing should change.

ATHLETE MESSAGE:
{}"#,
        context.today,
        context.week_number,
        context.day_name,
        context.day_label,
        context.readiness,
        format_list(&context.lifts),
        format_list(&context.workout),
        context.today,
        message.trim()
    )
}
