use serde::Serialize;

use crate::error::EngineError;
use crate::models::lift::{Lift, LiftMap};

/// Cap on the learned adjustment in either direction, in kilograms.
pub const MAX_ADJUSTMENT_KG: f64 = 15.0;
pub const ADJUSTMENT_STEP_KG: f64 = 2.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpeAdjustment {
    pub delta: f64,
    pub reason: Option<String>,
}

/// Exertion is reported on an integer 1-10 scale.
pub fn validate_exertion(rpe: u8) -> Result<u8, EngineError> {
    if (1..=10).contains(&rpe) {
        Ok(rpe)
    } else {
        Err(EngineError::InvalidExertion(rpe))
    }
}

/// Derives the change to a lift's adjustment from reported exertion.
///
/// Landing one point outside the target band is treated as noise; only a
/// miss of two or more points moves the max. The comparison is strict, so
/// RPE 5 against a 6-7 band holds the load rather than bumping it.
pub fn calculate_delta(reported_rpe: u8, target: (u8, u8)) -> Result<RpeAdjustment, EngineError> {
    let (low, high) = target;
    if low > high || !(1..=10).contains(&low) || !(1..=10).contains(&high) {
        return Err(EngineError::InvalidTargetBand { low, high });
    }
    let rpe = validate_exertion(reported_rpe)?;

    if i16::from(rpe) < i16::from(low) - 1 {
        return Ok(RpeAdjustment {
            delta: ADJUSTMENT_STEP_KG,
            reason: Some(format!(
                "RPE {} below target {}-{}, bumping +{}kg",
                rpe, low, high, ADJUSTMENT_STEP_KG
            )),
        });
    }

    if rpe > high + 1 {
        return Ok(RpeAdjustment {
            delta: -ADJUSTMENT_STEP_KG,
            reason: Some(format!(
                "RPE {} above target {}-{}, dropping -{}kg",
                rpe, low, high, ADJUSTMENT_STEP_KG
            )),
        });
    }

    Ok(RpeAdjustment {
        delta: 0.0,
        reason: None,
    })
}

/// Returns a new map with `delta` applied to `lift`, saturating at the band edges.
pub fn apply_delta(adjustments: &LiftMap, lift: Lift, delta: f64) -> LiftMap {
    let current = adjustments.get(&lift).copied().unwrap_or(0.0);
    let clamped = (current + delta).clamp(-MAX_ADJUSTMENT_KG, MAX_ADJUSTMENT_KG);

    let mut next = adjustments.clone();
    next.insert(lift, clamped);
    next
}
