use serde::Serialize;

use crate::models::lift::{Lift, LiftMap};
use crate::program::SetScheme;

/// Smallest loadable step on the bar, in kilograms.
pub const PLATE_INCREMENT_KG: f64 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescribedSet {
    pub pct: f64,
    pub reps: u32,
    pub set: u32,
    pub target_weight: f64,
}

/// Base max plus the learned adjustment. Missing entries count as zero.
pub fn effective_max(lift: Lift, base_maxes: &LiftMap, adjustments: &LiftMap) -> f64 {
    let base = base_maxes.get(&lift).copied().unwrap_or(0.0);
    let adjustment = adjustments.get(&lift).copied().unwrap_or(0.0);
    base + adjustment
}

/// Nearest multiple of the plate increment. Every prescription goes through here.
pub fn round_to_plate(kg: f64) -> f64 {
    (kg / PLATE_INCREMENT_KG).round() * PLATE_INCREMENT_KG
}

pub fn prescribe(effective_max: f64, pct: f64) -> f64 {
    round_to_plate(effective_max * pct)
}

pub fn prescribe_sets(effective_max: f64, sets: &[SetScheme]) -> Vec<PrescribedSet> {
    sets.iter()
        .map(|scheme| PrescribedSet {
            pct: scheme.pct,
            reps: scheme.reps,
            set: scheme.set,
            target_weight: prescribe(effective_max, scheme.pct),
        })
        .collect()
}
