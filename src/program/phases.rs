use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub number: u8,
    pub label: &'static str,
    pub color: &'static str,
    /// Inclusive RPE band the lifter should land in for strength work.
    pub target_rpe: (u8, u8),
    pub injury_note: &'static str,
}

const BASE_BUILDING: Phase = Phase {
    number: 1,
    label: "Base Building",
    color: "#22c55e",
    target_rpe: (6, 7),
    injury_note: "ZERO IMPACT: no running, jumping, box jumps, burpees, double-unders",
};

const STRENGTH: Phase = Phase {
    number: 2,
    label: "Strength",
    color: "#f59e0b",
    target_rpe: (7, 8),
    injury_note: "GRADUAL RETURN: walking, step-ups, light sled, hang Olympic lifts",
};

const PEAK_AND_TEST: Phase = Phase {
    number: 3,
    label: "Peak & Test",
    color: "#ef4444",
    target_rpe: (8, 9),
    injury_note: "FULL RETURN: running, box jumps, double-unders by Week 11",
};

pub fn phase_for_week(week_number: u32) -> Phase {
    match week_number {
        0..=4 => BASE_BUILDING,
        5..=8 => STRENGTH,
        _ => PEAK_AND_TEST,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_boundaries() {
        assert_eq!(phase_for_week(1).number, 1);
        assert_eq!(phase_for_week(4).number, 1);
        assert_eq!(phase_for_week(5).target_rpe, (7, 8));
        assert_eq!(phase_for_week(8).number, 2);
        assert_eq!(phase_for_week(9).target_rpe, (8, 9));
        assert_eq!(phase_for_week(12).number, 3);
    }
}
