use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::lift::Lift;
use crate::models::log::{LoggedSet, PersonalRecord, RecordTable, SectionLog, WorkoutLogs};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    pub lift: Lift,
    pub reps: u32,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimatedMax {
    pub estimated: f64,
    pub source: PersonalRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeRecord {
    pub total_volume: f64,
    pub sets: u32,
    pub date: NaiveDate,
    pub week_number: u32,
}

fn strength_sections(sections: &BTreeMap<String, SectionLog>) -> impl Iterator<Item = (Lift, &[LoggedSet])> {
    sections
        .values()
        .filter_map(|section| section.lift_key.map(|lift| (lift, section.sets.as_slice())))
}

/// Heaviest weight ever logged per lift at each exact rep count.
///
/// Logs are visited in date order and only a strictly heavier set replaces a
/// record, so ties keep the earliest date.
pub fn detect_records(logs: &WorkoutLogs) -> RecordTable {
    let mut records = RecordTable::new();

    for (date, log) in logs {
        for (lift, sets) in strength_sections(&log.sections) {
            let by_reps = records.entry(lift).or_default();
            for set in sets.iter().filter(|set| set.is_counted()) {
                let heavier = by_reps
                    .get(&set.reps)
                    .is_none_or(|current| set.weight > current.weight);
                if heavier {
                    by_reps.insert(
                        set.reps,
                        PersonalRecord {
                            weight: set.weight,
                            reps: set.reps,
                            date: *date,
                            week_number: log.week_number,
                        },
                    );
                }
            }
        }
    }

    records
}

/// Every set in a finished section that beats the stored record at its rep count.
pub fn check_for_new_records(existing: &RecordTable, section: &SectionLog) -> Vec<NewRecord> {
    let Some(lift) = section.lift_key else {
        return Vec::new();
    };
    let current = existing.get(&lift);

    section
        .sets
        .iter()
        .filter(|set| set.is_counted())
        .filter(|set| {
            current
                .and_then(|by_reps| by_reps.get(&set.reps))
                .is_none_or(|record| set.weight > record.weight)
        })
        .map(|set| NewRecord {
            lift,
            reps: set.reps,
            weight: set.weight,
        })
        .collect()
}

/// Writes new records into the table. A record only ever moves up.
pub fn commit_records(
    records: &mut RecordTable,
    new_records: &[NewRecord],
    date: NaiveDate,
    week_number: u32,
) {
    for new in new_records {
        let by_reps = records.entry(new.lift).or_default();
        let heavier = by_reps
            .get(&new.reps)
            .is_none_or(|current| new.weight > current.weight);
        if heavier {
            by_reps.insert(
                new.reps,
                PersonalRecord {
                    weight: new.weight,
                    reps: new.reps,
                    date,
                    week_number,
                },
            );
        }
    }
}

/// Epley estimate rounded to the nearest 0.5 kg. A single is returned as-is.
pub fn estimated_one_rep_max(weight: f64, reps: u32) -> f64 {
    if reps == 1 {
        return weight;
    }
    (weight * (1.0 + f64::from(reps) / 30.0) * 2.0).round() / 2.0
}

pub fn best_estimated_one_rep_max(records: &BTreeMap<u32, PersonalRecord>) -> Option<EstimatedMax> {
    records.values().fold(None, |best, record| {
        let estimated = estimated_one_rep_max(record.weight, record.reps);
        match best {
            Some(best) if best.estimated >= estimated => Some(best),
            _ => Some(EstimatedMax {
                estimated,
                source: record.clone(),
            }),
        }
    })
}

/// Heaviest directly measured record across all rep counts.
pub fn best_record(records: &BTreeMap<u32, PersonalRecord>) -> Option<&PersonalRecord> {
    records.values().fold(None, |best, record| match best {
        Some(best) if best.weight >= record.weight => Some(best),
        _ => Some(record),
    })
}

/// Best single-session tonnage per lift.
pub fn detect_volume_records(logs: &WorkoutLogs) -> BTreeMap<Lift, VolumeRecord> {
    let mut records: BTreeMap<Lift, VolumeRecord> = BTreeMap::new();

    for (date, log) in logs {
        let mut session: BTreeMap<Lift, (f64, u32)> = BTreeMap::new();
        for (lift, sets) in strength_sections(&log.sections) {
            let totals = session.entry(lift).or_default();
            for set in sets.iter().filter(|set| set.is_counted()) {
                totals.0 += set.volume();
                totals.1 += 1;
            }
        }

        for (lift, (total_volume, sets)) in session {
            if sets == 0 {
                continue;
            }
            let heavier = records
                .get(&lift)
                .is_none_or(|current| total_volume > current.total_volume);
            if heavier {
                records.insert(
                    lift,
                    VolumeRecord {
                        total_volume,
                        sets,
                        date: *date,
                        week_number: log.week_number,
                    },
                );
            }
        }
    }

    records
}
