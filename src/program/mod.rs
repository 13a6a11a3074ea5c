//! The fixed 12-week program. Read-only; nothing in the crate mutates it.

pub mod calendar;
pub mod phases;

use std::sync::LazyLock;

use serde::Serialize;

use crate::models::lift::Lift;
use crate::models::log::MetconFormat;
use crate::program::calendar::PROGRAM_WEEKS;

pub static PROGRAM: LazyLock<Program> = LazyLock::new(Program::standard);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Warmup,
    Strength,
    Accessory,
    Metcon,
    Cooldown,
    Rehab,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Warmup => "warmup",
            SectionKind::Strength => "strength",
            SectionKind::Accessory => "accessory",
            SectionKind::Metcon => "metcon",
            SectionKind::Cooldown => "cooldown",
            SectionKind::Rehab => "rehab",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SetScheme {
    /// Fraction of the effective max, e.g. 0.65.
    pub pct: f64,
    pub reps: u32,
    /// 1-based ordinal within the section.
    pub set: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub kind: SectionKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lift: Option<Lift>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sets: Vec<SetScheme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metcon_format: Option<MetconFormat>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramDay {
    pub day_index: u32,
    pub is_rest_day: bool,
    pub label: String,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramWeek {
    pub week_number: u32,
    pub phase: u8,
    pub days: Vec<ProgramDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub name: String,
    pub weeks: Vec<ProgramWeek>,
}

impl Program {
    pub fn standard() -> Self {
        Self {
            name: "12-Week Recovery Program".to_string(),
            weeks: (1..=PROGRAM_WEEKS).map(build_week).collect(),
        }
    }

    pub fn week(&self, week_number: u32) -> Option<&ProgramWeek> {
        let index = week_number.checked_sub(1)?;
        self.weeks.get(index as usize)
    }

    pub fn day(&self, week_number: u32, day_index: u32) -> Option<&ProgramDay> {
        self.week(week_number)?.days.get(day_index as usize)
    }
}

struct MetconDef {
    name: &'static str,
    format: MetconFormat,
}

const fn metcon(name: &'static str, format: MetconFormat) -> MetconDef {
    MetconDef { name, format }
}

const ANGER: MetconDef = metcon("Anger", MetconFormat::Intervals);
const PITA: MetconDef = metcon("Pita", MetconFormat::ForTime);
const SADNESS: MetconDef = metcon("Sadness", MetconFormat::Amrap);
const WONDER_BREAD: MetconDef = metcon("Wonder Bread", MetconFormat::ForTime);
const JOY: MetconDef = metcon("Joy", MetconFormat::Amrap);
const CIABATTA: MetconDef = metcon("Ciabatta", MetconFormat::ForTime);
const ANNIE: MetconDef = metcon("Annie", MetconFormat::ForTime);
const DISGUST: MetconDef = metcon("Disgust", MetconFormat::Amrap);
const DT: MetconDef = metcon("DT", MetconFormat::ForTime);
const AUSTIN_POWERS: MetconDef = metcon("Austin Powers", MetconFormat::ForTime);
const MERRY_LIFTMAS: MetconDef = metcon("Merry Liftmas", MetconFormat::ForTime);
const SOURDOUGH: MetconDef = metcon("Sourdough", MetconFormat::Amrap);
const CHIPS_AND_SALSA: MetconDef = metcon("Chips & Salsa", MetconFormat::Intervals);
const FEAR_FACTOR: MetconDef = metcon("Fear Factor", MetconFormat::ForTime);
const SURVIVOR: MetconDef = metcon("Survivor", MetconFormat::Amrap);
const OUCH: MetconDef = metcon("Ouch", MetconFormat::ForTime);
const SANDSTORM: MetconDef = metcon("Sandstorm", MetconFormat::Amrap);
const BARBELL_BANGER: MetconDef = metcon("Barbell Banger", MetconFormat::ForTime);
const FISH_AND_CHIPS: MetconDef = metcon("Fish & Chips", MetconFormat::Amrap);

const MONDAY_METCONS: [&MetconDef; 6] = [
    &ANGER,
    &SADNESS,
    &JOY,
    &ANNIE,
    &SANDSTORM,
    &FISH_AND_CHIPS,
];
const TUESDAY_METCONS: [&MetconDef; 4] = [&PITA, &CIABATTA, &FEAR_FACTOR, &CHIPS_AND_SALSA];
const THURSDAY_METCONS: [&MetconDef; 4] = [&WONDER_BREAD, &DISGUST, &SOURDOUGH, &DT];
const FRIDAY_METCONS: [&MetconDef; 4] = [&AUSTIN_POWERS, &BARBELL_BANGER, &SURVIVOR, &OUCH];
const SUNDAY_METCONS: [&MetconDef; 12] = [
    &MERRY_LIFTMAS,
    &SOURDOUGH,
    &DISGUST,
    &BARBELL_BANGER,
    &MERRY_LIFTMAS,
    &SOURDOUGH,
    &DISGUST,
    &BARBELL_BANGER,
    &DT,
    &OUCH,
    &BARBELL_BANGER,
    &MERRY_LIFTMAS,
];

const HYROX_FOUNDATIONAL: [&str; 3] = [
    "HYROX Foundational #37",
    "HYROX Foundational #39",
    "HYROX Foundational #44",
];
const HYROX_ENGINE: [&str; 3] = ["HYROX Engine #49", "HYROX Engine #52", "HYROX Engine #55"];

const OLY_SESSIONS: [(&str, Lift, &str); 4] = [
    ("Clean Complex", Lift::PowerClean, "E2MOM x 6 sets"),
    ("Snatch Singles", Lift::Snatch, "E1.5MOM x 8 sets"),
    ("Clean & Jerk Complex", Lift::PowerClean, "E2MOM x 5 sets"),
    ("Snatch Complex", Lift::Snatch, "E2MOM x 6 sets"),
];

fn pick<T: Copy>(pool: &[T], week_number: u32) -> T {
    pool[(week_number as usize - 1) % pool.len()]
}

fn sets_at(pcts: &[f64], reps: u32) -> Vec<SetScheme> {
    pcts.iter()
        .enumerate()
        .map(|(i, &pct)| SetScheme {
            pct,
            reps,
            set: i as u32 + 1,
        })
        .collect()
}

/// Percentage scheme shared by every main barbell lift.
fn main_lift_sets(week_number: u32) -> Vec<SetScheme> {
    match week_number {
        1 => sets_at(&[0.45, 0.55, 0.55, 0.60, 0.60, 0.65], 6),
        2 => sets_at(&[0.50, 0.55, 0.60, 0.60, 0.65, 0.67], 6),
        3 => sets_at(&[0.50, 0.57, 0.62, 0.62, 0.67, 0.70], 6),
        4 => sets_at(&[0.45, 0.50, 0.55, 0.55, 0.60, 0.60], 6),
        5 => sets_at(&[0.55, 0.62, 0.67, 0.70, 0.72], 5),
        6 => sets_at(&[0.57, 0.65, 0.70, 0.75, 0.77], 5),
        7 => sets_at(&[0.60, 0.67, 0.72, 0.77, 0.80], 5),
        8 => sets_at(&[0.50, 0.55, 0.60, 0.62, 0.65], 5),
        9 => sets_at(&[0.65, 0.72, 0.80, 0.85], 3),
        10 => sets_at(&[0.70, 0.80, 0.87], 3),
        11 => sets_at(&[0.80, 0.90], 2),
        _ => Vec::new(),
    }
}

fn olympic_sets(week_number: u32) -> Vec<SetScheme> {
    match week_number {
        0..=4 => sets_at(&[0.50, 0.55, 0.57, 0.60, 0.62, 0.65], 1),
        5..=8 => sets_at(&[0.55, 0.60, 0.65, 0.70, 0.72], 1),
        _ => sets_at(&[0.60, 0.67, 0.72, 0.77, 0.80], 1),
    }
}

/// Build-to-max ladder for the week 12 tests.
fn test_sets(ladder: &[(f64, u32)]) -> Vec<SetScheme> {
    ladder
        .iter()
        .enumerate()
        .map(|(i, &(pct, reps))| SetScheme {
            pct,
            reps,
            set: i as u32 + 1,
        })
        .collect()
}

const FULL_TEST: [(f64, u32); 8] = [
    (0.50, 5),
    (0.60, 3),
    (0.70, 2),
    (0.80, 1),
    (0.87, 1),
    (0.93, 1),
    (0.97, 1),
    (1.0, 1),
];
const PUSH_PRESS_TEST: [(f64, u32); 7] = [
    (0.50, 5),
    (0.60, 3),
    (0.70, 2),
    (0.80, 1),
    (0.87, 1),
    (0.93, 1),
    (1.0, 1),
];
const HIP_THRUST_TEST: [(f64, u32); 6] = [
    (0.50, 5),
    (0.60, 3),
    (0.70, 2),
    (0.80, 1),
    (0.90, 1),
    (1.0, 1),
];

fn main_lift_scheme(week_number: u32) -> &'static str {
    match week_number {
        0..=4 => "E2MOM x 6 sets of 6",
        5..=8 => "E2MOM x 5 sets of 5",
        9..=10 => "E2MOM x 4 sets of 3",
        _ => "E2MOM x 2 sets of 2",
    }
}

fn active_days(week_number: u32) -> &'static [u32] {
    match week_number {
        0..=2 => &[0, 1, 3, 4],
        3..=4 => &[0, 1, 2, 3, 4],
        5..=8 => &[0, 1, 2, 3, 4, 5],
        _ => &[0, 1, 2, 3, 4, 5, 6],
    }
}

fn rehab_title(week_number: u32) -> &'static str {
    match week_number {
        0..=4 => "5th Metatarsal Rehab (Daily)",
        5..=8 => "5th Metatarsal Rehab (3-4x/week)",
        _ => "Foot Maintenance (2-3x/week)",
    }
}

struct DayBuilder {
    sections: Vec<Section>,
}

impl DayBuilder {
    fn new() -> Self {
        Self {
            sections: Vec::new(),
        }
    }

    fn simple(mut self, kind: SectionKind, title: &str) -> Self {
        self.sections.push(Section {
            id: String::new(),
            kind,
            title: title.to_string(),
            lift: None,
            scheme: None,
            sets: Vec::new(),
            metcon_format: None,
        });
        self
    }

    fn strength(mut self, title: &str, lift: Lift, scheme: &str, sets: Vec<SetScheme>) -> Self {
        self.sections.push(Section {
            id: String::new(),
            kind: SectionKind::Strength,
            title: title.to_string(),
            lift: Some(lift),
            scheme: Some(scheme.to_string()),
            sets,
            metcon_format: None,
        });
        self
    }

    fn metcon(mut self, name: &str, format: MetconFormat) -> Self {
        self.sections.push(Section {
            id: String::new(),
            kind: SectionKind::Metcon,
            title: name.to_string(),
            lift: None,
            scheme: None,
            sets: Vec::new(),
            metcon_format: Some(format),
        });
        self
    }

    fn finish(self, week_number: u32, day_index: u32) -> Vec<Section> {
        self.sections
            .into_iter()
            .enumerate()
            .map(|(i, mut section)| {
                section.id = format!(
                    "w{}d{}-{}{}",
                    week_number,
                    day_index,
                    section.kind.as_str(),
                    i
                );
                section
            })
            .collect()
    }
}

fn main_lift_day(
    week_number: u32,
    builder: DayBuilder,
    lifts: &[(&str, Lift, &[(f64, u32)])],
) -> DayBuilder {
    let is_test = week_number == PROGRAM_WEEKS;
    lifts.iter().fold(builder, |builder, (title, lift, ladder)| {
        if is_test {
            builder.strength(
                &format!("{} 1RM Test", title),
                *lift,
                "Build to 1RM",
                test_sets(ladder),
            )
        } else {
            builder.strength(
                title,
                *lift,
                main_lift_scheme(week_number),
                main_lift_sets(week_number),
            )
        }
    })
}

fn build_day(week_number: u32, day_index: u32) -> ProgramDay {
    if !active_days(week_number).contains(&day_index) {
        return ProgramDay {
            day_index,
            is_rest_day: true,
            label: "Rest Day".to_string(),
            sections: Vec::new(),
        };
    }

    let is_test = week_number == PROGRAM_WEEKS;
    let is_deload = week_number == 4 || week_number == 8;
    let pump = if week_number % 2 == 1 { "A" } else { "B" };
    let rehab = rehab_title(week_number);

    let label_for = |test: &str, deload: &str, normal: &str| {
        if is_test {
            test.to_string()
        } else if is_deload {
            deload.to_string()
        } else {
            normal.to_string()
        }
    };

    let (label, builder) = match day_index {
        0 => {
            let day = main_lift_day(
                week_number,
                DayBuilder::new().simple(SectionKind::Warmup, "Leg Day Warm-up"),
                &[("Back Squat", Lift::BackSquat, &FULL_TEST[..])],
            );
            let metcon = pick(&MONDAY_METCONS, week_number);
            (
                label_for("Back Squat 1RM Test", "Legs (Deload)", "Legs: Back Squat"),
                day.simple(
                    SectionKind::Accessory,
                    &format!("Functional Pumps: Legs {}", pump),
                )
                .metcon(metcon.name, metcon.format)
                .simple(SectionKind::Cooldown, "Lower Body Mobility")
                .simple(SectionKind::Rehab, rehab),
            )
        }
        1 => {
            let day = main_lift_day(
                week_number,
                DayBuilder::new().simple(SectionKind::Warmup, "Upper Body Warm-up"),
                &[("Bench Press", Lift::Bench, &FULL_TEST[..])],
            );
            let metcon = pick(&TUESDAY_METCONS, week_number);
            (
                label_for(
                    "Bench Press 1RM Test",
                    "Upper Body (Deload)",
                    "Upper: Bench Press",
                ),
                day.simple(
                    SectionKind::Accessory,
                    &format!("Functional Pumps: Push + Pull {}", pump),
                )
                .metcon(metcon.name, metcon.format)
                .simple(SectionKind::Cooldown, "Upper Body Mobility")
                .simple(SectionKind::Rehab, rehab),
            )
        }
        2 => (
            "HYROX Foundational".to_string(),
            DayBuilder::new()
                .simple(SectionKind::Warmup, "HYROX Warm-up")
                .metcon(pick(&HYROX_FOUNDATIONAL, week_number), MetconFormat::ForTime)
                .simple(SectionKind::Cooldown, "General Cooldown")
                .simple(SectionKind::Rehab, rehab),
        ),
        3 => {
            let day = main_lift_day(
                week_number,
                DayBuilder::new().simple(SectionKind::Warmup, "Posterior Chain Warm-up"),
                &[("Deadlift", Lift::Deadlift, &FULL_TEST[..])],
            );
            let metcon = pick(&THURSDAY_METCONS, week_number);
            (
                label_for(
                    "Deadlift 1RM Test",
                    "Posterior Chain (Deload)",
                    "Posterior: Deadlift",
                ),
                day.simple(
                    SectionKind::Accessory,
                    &format!("Functional Pumps: Back + Biceps {}", pump),
                )
                .metcon(metcon.name, metcon.format)
                .simple(SectionKind::Cooldown, "Posterior Chain Mobility")
                .simple(SectionKind::Rehab, rehab),
            )
        }
        4 => {
            let day = main_lift_day(
                week_number,
                DayBuilder::new().simple(SectionKind::Warmup, "Shoulders & Glutes Warm-up"),
                &[
                    ("Push Press", Lift::PushPress, &PUSH_PRESS_TEST[..]),
                    ("Hip Thrust", Lift::HipThrust, &HIP_THRUST_TEST[..]),
                ],
            );
            let metcon = pick(&FRIDAY_METCONS, week_number);
            (
                label_for(
                    "Push Press + Hip Thrust Test",
                    "Shoulders & Glutes (Deload)",
                    "Shoulders & Glutes",
                ),
                day.simple(
                    SectionKind::Accessory,
                    &format!("Functional Pumps: Shoulders + Glutes {}", pump),
                )
                .metcon(metcon.name, metcon.format)
                .simple(SectionKind::Cooldown, "Shoulder & Hip Mobility")
                .simple(SectionKind::Rehab, rehab),
            )
        }
        5 => (
            "HYROX Engine".to_string(),
            DayBuilder::new()
                .simple(SectionKind::Warmup, "HYROX Warm-up")
                .metcon(pick(&HYROX_ENGINE, week_number), MetconFormat::ForTime)
                .simple(SectionKind::Cooldown, "General Cooldown")
                .simple(SectionKind::Rehab, rehab),
        ),
        _ => {
            let (title, lift, scheme) = pick(&OLY_SESSIONS, week_number);
            let metcon = pick(&SUNDAY_METCONS, week_number);
            (
                "Olympic Lifting".to_string(),
                DayBuilder::new()
                    .simple(SectionKind::Warmup, "Olympic Lifting Warm-up")
                    .strength(title, lift, scheme, olympic_sets(week_number))
                    .metcon(metcon.name, metcon.format)
                    .simple(SectionKind::Cooldown, "General Cooldown")
                    .simple(SectionKind::Rehab, rehab),
            )
        }
    };

    ProgramDay {
        day_index,
        is_rest_day: false,
        label,
        sections: builder.finish(week_number, day_index),
    }
}

fn build_week(week_number: u32) -> ProgramWeek {
    ProgramWeek {
        week_number,
        phase: phases::phase_for_week(week_number).number,
        days: (0..7).map(|day| build_day(week_number, day)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn training_days(week: &ProgramWeek) -> usize {
        week.days.iter().filter(|d| !d.is_rest_day).count()
    }

    #[test]
    fn test_training_days_grow_by_phase() {
        let program = Program::standard();
        assert_eq!(program.weeks.len(), 12);
        assert_eq!(training_days(&program.weeks[0]), 4);
        assert_eq!(training_days(&program.weeks[2]), 5);
        assert_eq!(training_days(&program.weeks[4]), 6);
        assert_eq!(training_days(&program.weeks[8]), 7);
    }

    #[test]
    fn test_week_one_monday_layout() {
        let day = PROGRAM.day(1, 0).unwrap();
        assert!(!day.is_rest_day);
        let kinds: Vec<_> = day.sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::Warmup,
                SectionKind::Strength,
                SectionKind::Accessory,
                SectionKind::Metcon,
                SectionKind::Cooldown,
                SectionKind::Rehab,
            ]
        );
        assert_eq!(day.sections[1].id, "w1d0-strength1");
        assert_eq!(day.sections[1].lift, Some(Lift::BackSquat));
        assert_eq!(day.sections[1].sets.len(), 6);
        assert_eq!(day.sections[3].title, "Anger");
    }

    #[test]
    fn test_test_week_ladders_reach_full_max() {
        let friday = PROGRAM.day(12, 4).unwrap();
        let strength: Vec<_> = friday
            .sections
            .iter()
            .filter(|s| s.kind == SectionKind::Strength)
            .collect();
        assert_eq!(strength.len(), 2);
        assert_eq!(strength[0].sets.len(), 7);
        assert_eq!(strength[1].sets.len(), 6);
        assert_eq!(strength[1].sets.last().unwrap().pct, 1.0);
    }

    #[test]
    fn test_out_of_range_lookups() {
        assert!(PROGRAM.day(0, 0).is_none());
        assert!(PROGRAM.day(13, 0).is_none());
        assert!(PROGRAM.day(1, 7).is_none());
        assert!(PROGRAM.day(1, 2).unwrap().is_rest_day);
    }
}
