use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::lift::Lift;

/// A change the coach proposes. Nothing is applied until the lifter confirms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoachAction {
    #[serde(rename = "adjust_1rm")]
    AdjustMax { lift: Lift, delta_kg: f64 },
    AddNote { date: NaiveDate, text: String },
}

impl CoachAction {
    fn is_meaningful(&self) -> bool {
        match self {
            CoachAction::AdjustMax { delta_kg, .. } => delta_kg.is_finite() && *delta_kg != 0.0,
            CoachAction::AddNote { text, .. } => !text.trim().is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoachReply {
    pub response: String,
    pub actions: Vec<CoachAction>,
}

pub fn parse_coach_response(response: &str) -> Result<CoachReply> {
    let json_content = extract_json_from_response(response);

    let parsed_json: Value = match serde_json::from_str(&json_content) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "coach.unstructured_reply");
            return Ok(CoachReply {
                response: response.trim().to_string(),
                actions: Vec::new(),
            });
        }
    };

    let reply = parsed_json
        .get("response")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("Missing 'response' field in coach reply"))?
        .to_string();

    Ok(CoachReply {
        response: reply,
        actions: extract_actions(&parsed_json),
    })
}

fn extract_actions(json: &Value) -> Vec<CoachAction> {
    let Some(actions) = json.get("actions").and_then(Value::as_array) else {
        return Vec::new();
    };

    actions
        .iter()
        .filter_map(
            |action| match serde_json::from_value::<CoachAction>(action.clone()) {
                Ok(action) if action.is_meaningful() => Some(action),
                Ok(action) => {
                    tracing::warn!(?action, "coach.action_dropped");
                    None
                }
                Err(e) => {
                    tracing::warn!(error = %e, %action, "coach.action_dropped");
                    None
                }
            },
        )
        .collect()
}

fn extract_json_from_response(response: &str) -> String {
    if let Some(json_block_start) = response.find("```json") {
        let content_start = json_block_start + "```json".len();

        if let Some(remaining_content) = response.get(content_start..) {
            if let Some(code_block_end) = remaining_content.find("```") {
                return remaining_content[..code_block_end].trim().to_string();
            }
            return remaining_content.trim().to_string();
        }
    }

    response.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fenced_reply() {
        let raw = r#"Sure thing.
```json
{
  "response": "Dropping your deadlift a touch.",
  "actions": [
    { "type": "adjust_1rm", "lift": "deadlift", "delta_kg": -5 },
    { "type": "add_note", "date": "2025-01-09", "text": "Go easy on the pulls" }
  ]
}
```"#;
        let reply = parse_coach_response(raw).unwrap();

        assert_eq!(reply.response, "Dropping your deadlift a touch.");
        assert_eq!(
            reply.actions,
            vec![
                CoachAction::AdjustMax {
                    lift: Lift::Deadlift,
                    delta_kg: -5.0
                },
                CoachAction::AddNote {
                    date: "2025-01-09".parse().unwrap(),
                    text: "Go easy on the pulls".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_unknown_and_empty_actions_are_dropped() {
        let raw = r#"{
            "response": "ok",
            "actions": [
                { "type": "swap_exercise", "from": "bench", "to": "dips" },
                { "type": "adjust_1rm", "lift": "curl", "delta_kg": 5 },
                { "type": "adjust_1rm", "lift": "bench", "delta_kg": 0 },
                { "type": "add_note", "date": "2025-01-09", "text": "  " },
                { "type": "adjust_1rm", "lift": "bench", "delta_kg": 2.5 }
            ]
        }"#;
        let reply = parse_coach_response(raw).unwrap();
        assert_eq!(
            reply.actions,
            vec![CoachAction::AdjustMax {
                lift: Lift::Bench,
                delta_kg: 2.5
            }]
        );
    }

    #[test]
    fn test_plain_text_reply_has_no_actions() {
        let reply = parse_coach_response("  Try some ankle circles first.  ").unwrap();
        assert_eq!(reply.response, "Try some ankle circles first.");
        assert!(reply.actions.is_empty());
    }

    #[test]
    fn test_json_without_response_is_an_error() {
        assert!(parse_coach_response(r#"{"actions": []}"#).is_err());
    }

    #[test]
    fn test_missing_actions_defaults_to_empty() {
        let reply = parse_coach_response(r#"{"response": "Looks good"}"#).unwrap();
        assert!(reply.actions.is_empty());
    }
}
