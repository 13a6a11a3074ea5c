//! Upgrades for older persisted records. Each step takes the JSON shape of
//! version N and returns the shape of version N + 1.

use serde_json::{Map, Value, json};

use crate::error::EngineError;
use crate::models::log::WorkoutLogs;
use crate::services::records::detect_records;

pub const CURRENT_VERSION: u64 = 3;

type Step = fn(Map<String, Value>) -> Result<Map<String, Value>, EngineError>;

/// Indexed by source version minus one.
const STEPS: [Step; 2] = [v1_to_v2, v2_to_v3];

fn invalid(message: impl Into<String>) -> EngineError {
    EngineError::InvalidBackup(message.into())
}

/// Brings any supported record up to `CURRENT_VERSION`.
pub fn migrate(value: Value) -> Result<Value, EngineError> {
    let Value::Object(mut data) = value else {
        return Err(invalid("expected a JSON object"));
    };
    if !data.get("baseMaxes").is_some_and(Value::is_object) {
        return Err(invalid("missing baseMaxes"));
    }

    let version = match data.get("version") {
        None | Some(Value::Null) => 1,
        Some(v) => v
            .as_u64()
            .ok_or_else(|| invalid(format!("version must be a positive integer, got {}", v)))?
            .max(1),
    };
    if version > CURRENT_VERSION {
        return Err(invalid(format!(
            "version {} is newer than supported version {}",
            version, CURRENT_VERSION
        )));
    }

    for step in &STEPS[(version - 1) as usize..] {
        data = step(data)?;
    }
    data.insert("version".to_string(), json!(CURRENT_VERSION));
    Ok(Value::Object(data))
}

fn v1_to_v2(mut data: Map<String, Value>) -> Result<Map<String, Value>, EngineError> {
    data.entry("readiness").or_insert_with(|| json!({}));
    data.entry("metconScores").or_insert_with(|| json!({}));
    data.entry("settings")
        .or_insert_with(|| json!({ "unit": "kg", "barWeightKg": 20 }));

    // Early logs were written without their own date or completion time.
    if let Some(Value::Object(logs)) = data.get_mut("workoutLogs") {
        for (date, log) in logs.iter_mut() {
            let Value::Object(log) = log else {
                return Err(invalid(format!("workout log for {} is not an object", date)));
            };
            log.entry("date").or_insert_with(|| json!(date));
            log.entry("completedAt")
                .or_insert_with(|| json!(format!("{}T00:00:00Z", date)));
        }
    }

    data.insert("version".to_string(), json!(2));
    Ok(data)
}

fn v2_to_v3(mut data: Map<String, Value>) -> Result<Map<String, Value>, EngineError> {
    data.entry("workoutNotes").or_insert_with(|| json!({}));

    let has_records = data
        .get("personalRecords")
        .and_then(Value::as_object)
        .is_some_and(|records| !records.is_empty());
    if !has_records {
        let logs: WorkoutLogs = match data.get("workoutLogs") {
            Some(logs) => serde_json::from_value(logs.clone())
                .map_err(|e| invalid(format!("unreadable workout logs: {}", e)))?,
            None => WorkoutLogs::new(),
        };
        let records = serde_json::to_value(detect_records(&logs))
            .map_err(|e| invalid(format!("could not rebuild records: {}", e)))?;
        data.insert("personalRecords".to_string(), records);
    }

    data.insert("version".to_string(), json!(3));
    Ok(data)
}
