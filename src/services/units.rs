//! Display-side unit handling. Everything stored or computed stays in kilograms;
//! these helpers only run at the presentation edge.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const KG_TO_LBS: f64 = 2.20462;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lbs,
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightUnit::Kg => f.write_str("kg"),
            WeightUnit::Lbs => f.write_str("lbs"),
        }
    }
}

impl FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kg" => Ok(WeightUnit::Kg),
            "lb" | "lbs" => Ok(WeightUnit::Lbs),
            _ => Err(format!("Unknown weight unit: {}", s)),
        }
    }
}

pub fn kg_to_lbs(kg: f64) -> f64 {
    kg * KG_TO_LBS
}

pub fn lbs_to_kg(lbs: f64) -> f64 {
    lbs / KG_TO_LBS
}

/// Kilograms as shown to the user, rounded to 5 lb when displaying pounds.
pub fn display_weight(kg: f64, unit: WeightUnit) -> f64 {
    match unit {
        WeightUnit::Kg => kg,
        WeightUnit::Lbs => (kg_to_lbs(kg) / 5.0).round() * 5.0,
    }
}

pub fn format_weight(kg: f64, unit: WeightUnit) -> String {
    let value = display_weight(kg, unit);
    if value.fract().abs() < f64::EPSILON {
        format!("{:.0}{}", value, unit)
    } else {
        format!("{:.1}{}", value, unit)
    }
}

pub fn input_to_kg(value: f64, unit: WeightUnit) -> f64 {
    match unit {
        WeightUnit::Kg => value,
        WeightUnit::Lbs => lbs_to_kg(value),
    }
}

/// Bars are sold as 45/35 lb, not as exact conversions of 20/15 kg.
pub fn bar_weight_in_unit(bar_weight_kg: f64, unit: WeightUnit) -> f64 {
    match unit {
        WeightUnit::Kg => bar_weight_kg,
        WeightUnit::Lbs if bar_weight_kg == 15.0 => 35.0,
        WeightUnit::Lbs => 45.0,
    }
}
