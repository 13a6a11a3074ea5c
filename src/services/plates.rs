use serde::Serialize;

use crate::services::units::WeightUnit;

const KG_PLATES: [f64; 7] = [25.0, 20.0, 15.0, 10.0, 5.0, 2.5, 1.25];
const LBS_PLATES: [f64; 6] = [45.0, 35.0, 25.0, 10.0, 5.0, 2.5];
/// A sleeve holds a finite stack; anything past it is reported as remainder.
const MAX_PLATES_PER_SIDE: usize = 40;
/// Heaviest total the calculator accepts from a caller.
pub const MAX_TOTAL_KG: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlateLoad {
    pub bar: f64,
    pub per_side: Vec<f64>,
    pub total_loaded: f64,
    pub unit: WeightUnit,
    /// Weight per side that the plate set could not make up.
    pub remainder: f64,
}

fn plate_set(unit: WeightUnit) -> (f64, &'static [f64]) {
    match unit {
        WeightUnit::Kg => (20.0, &KG_PLATES),
        WeightUnit::Lbs => (45.0, &LBS_PLATES),
    }
}

/// Plates per side for a total bar weight, greedy from the heaviest plate.
/// `total_weight` and `bar_override` are in `unit`.
pub fn calculate_plates(total_weight: f64, unit: WeightUnit, bar_override: Option<f64>) -> PlateLoad {
    let (default_bar, plates) = plate_set(unit);
    let bar = bar_override.unwrap_or(default_bar);

    if total_weight <= bar {
        return PlateLoad {
            bar,
            per_side: Vec::new(),
            total_loaded: bar,
            unit,
            remainder: 0.0,
        };
    }

    let mut remaining = (total_weight - bar) / 2.0;
    let mut per_side = Vec::new();
    for &plate in plates {
        let room = MAX_PLATES_PER_SIDE - per_side.len();
        let count = (((remaining + 0.001) / plate).floor() as usize).min(room);
        per_side.extend(std::iter::repeat_n(plate, count));
        remaining -= count as f64 * plate;
    }

    let loaded: f64 = per_side.iter().sum();
    PlateLoad {
        bar,
        total_loaded: bar + loaded * 2.0,
        per_side,
        unit,
        remainder: (remaining * 100.0).round() / 100.0,
    }
}
