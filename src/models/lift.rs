use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Tracked barbell movements. The catalog is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Lift {
    BackSquat,
    Deadlift,
    Bench,
    PushPress,
    HipThrust,
    PowerClean,
    Snatch,
}

impl Lift {
    pub const ALL: [Lift; 7] = [
        Lift::BackSquat,
        Lift::Deadlift,
        Lift::Bench,
        Lift::PushPress,
        Lift::HipThrust,
        Lift::PowerClean,
        Lift::Snatch,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Lift::BackSquat => "backSquat",
            Lift::Deadlift => "deadlift",
            Lift::Bench => "bench",
            Lift::PushPress => "pushPress",
            Lift::HipThrust => "hipThrust",
            Lift::PowerClean => "powerClean",
            Lift::Snatch => "snatch",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Lift::BackSquat => "Back Squat",
            Lift::Deadlift => "Deadlift",
            Lift::Bench => "Bench Press",
            Lift::PushPress => "Push Press",
            Lift::HipThrust => "Hip Thrust",
            Lift::PowerClean => "Power Clean",
            Lift::Snatch => "Snatch",
        }
    }

    pub fn default_max(&self) -> f64 {
        match self {
            Lift::BackSquat => 120.0,
            Lift::Deadlift => 120.0,
            Lift::Bench => 65.0,
            Lift::PushPress => 45.0,
            Lift::HipThrust => 90.0,
            Lift::PowerClean => 82.5,
            Lift::Snatch => 40.0,
        }
    }
}

impl fmt::Display for Lift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Lift {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Lift::ALL
            .iter()
            .find(|lift| lift.key() == s)
            .copied()
            .ok_or_else(|| EngineError::UnknownLift(s.to_string()))
    }
}

/// Kilogram values keyed by lift, used for base maxes and adjustments.
pub type LiftMap = BTreeMap<Lift, f64>;

pub fn default_base_maxes() -> LiftMap {
    Lift::ALL.iter().map(|lift| (*lift, lift.default_max())).collect()
}

pub fn default_adjustments() -> LiftMap {
    Lift::ALL.iter().map(|lift| (*lift, 0.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_lift() {
        assert_eq!("backSquat".parse::<Lift>(), Ok(Lift::BackSquat));
        assert_eq!("powerClean".parse::<Lift>(), Ok(Lift::PowerClean));
    }

    #[test]
    fn test_parse_unknown_lift_fails_loudly() {
        assert_eq!(
            "frontSquat".parse::<Lift>(),
            Err(EngineError::UnknownLift("frontSquat".to_string()))
        );
    }

    #[test]
    fn test_serde_uses_catalog_keys() {
        let json = serde_json::to_string(&Lift::HipThrust).unwrap();
        assert_eq!(json, "\"hipThrust\"");

        let maxes = default_base_maxes();
        let json = serde_json::to_value(&maxes).unwrap();
        assert_eq!(json["powerClean"], 82.5);
    }
}
