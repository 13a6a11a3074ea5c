use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, header::AUTHORIZATION};
use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::error::ApiError;
use crate::clients::gemini::GeminiClient;
use crate::config::Config;
use crate::error::EngineError;
use crate::models::lift::Lift;
use crate::models::log::{MetconScoreEntry, PersonalRecord, ReadinessEntry, SectionLog};
use crate::program::PROGRAM;
use crate::program::calendar::{ProgramPosition, date_for_program_day, program_position};
use crate::services::coach_parser::{CoachAction, CoachReply, parse_coach_response};
use crate::services::coach_prompt::{build_coach_context, build_coach_prompt};
use crate::services::metcon::best_score;
use crate::services::plates::{MAX_TOTAL_KG, PlateLoad, calculate_plates};
use crate::services::readiness::{self, WorkoutModifications};
use crate::services::records::{
    EstimatedMax, VolumeRecord, best_estimated_one_rep_max, best_record, detect_volume_records,
};
use crate::services::session::{
    self, CompletionOutcome, PlannedSession, ReadinessInput, WorkoutSubmission,
};
use crate::services::streaks::{Streaks, WeekConsistency, calculate_streaks, weekly_consistency};
use crate::services::summary::{WeekProgress, WeeklySummary, current_week_progress, weekly_summary};
use crate::services::units::{WeightUnit, bar_weight_in_unit, display_weight, input_to_kg};
use crate::services::weights::effective_max;
use crate::store::{AppData, StateStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<StateStore>,
    pub gemini: Option<GeminiClient>,
}

fn authenticate_request(headers: &HeaderMap, state: &AppState) -> Result<(), ApiError> {
    let Some(auth_header) = headers.get(AUTHORIZATION) else {
        return Err(ApiError::Unauthorized);
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(ApiError::Unauthorized);
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(ApiError::Unauthorized);
    };

    if token != state.config.api_token {
        return Err(ApiError::Unauthorized);
    }

    Ok(())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn require_start(data: &AppData) -> Result<NaiveDate, ApiError> {
    data.start_date
        .ok_or(ApiError::Engine(EngineError::StartDateNotSet))
}

pub async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

pub async fn get_program_day(
    State(state): State<AppState>,
    Path((week, day)): Path<(u32, u32)>,
) -> Result<Json<PlannedSession>, ApiError> {
    let data = state.store.snapshot().await;
    let readiness = data
        .start_date
        .map(|start| date_for_program_day(start, week, day))
        .and_then(|date| data.readiness.get(&date));

    let session = session::plan_session(&PROGRAM, &data, week, day, readiness)?;
    Ok(Json(session))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayResponse {
    date: NaiveDate,
    position: Option<ProgramPosition>,
    readiness: Option<ReadinessEntry>,
    session: Option<PlannedSession>,
    progress: Option<WeekProgress>,
    notes: Option<String>,
}

pub async fn get_today(State(state): State<AppState>) -> Result<Json<TodayResponse>, ApiError> {
    let data = state.store.snapshot().await;
    let date = today();
    let position = data.start_date.map(|start| program_position(start, date));
    let readiness = data.readiness.get(&date).cloned();

    let session = match position {
        Some(ProgramPosition::Active {
            week_number,
            day_index,
        }) => PROGRAM
            .day(week_number, day_index)
            .filter(|day| !day.is_rest_day)
            .map(|_| {
                session::plan_session(&PROGRAM, &data, week_number, day_index, readiness.as_ref())
            })
            .transpose()?,
        _ => None,
    };
    let progress = data
        .start_date
        .and_then(|start| current_week_progress(&PROGRAM, &data.workout_logs, start, date));

    Ok(Json(TodayResponse {
        date,
        position,
        session,
        progress,
        notes: data.workout_notes.get(&date).cloned(),
        readiness,
    }))
}

#[derive(Deserialize)]
pub struct ReadinessRequest {
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(flatten)]
    input: ReadinessInput,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    entry: ReadinessEntry,
    modifications: WorkoutModifications,
}

pub async fn post_readiness(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ReadinessRequest>,
) -> Result<Json<ReadinessResponse>, ApiError> {
    authenticate_request(&headers, &state)?;

    let date = request.date.unwrap_or_else(today);
    let entry = state
        .store
        .update(|data| session::record_readiness(data, date, request.input, Utc::now()))
        .await?;
    let modifications = readiness::classify(entry.score)?;

    tracing::info!(%date, score = entry.score, mode = ?modifications.mode, "readiness.recorded");
    Ok(Json(ReadinessResponse {
        entry,
        modifications,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteWorkoutRequest {
    week_number: u32,
    day_index: u32,
    #[serde(default)]
    sections: BTreeMap<String, SectionLog>,
}

pub async fn post_workout(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(date): Path<NaiveDate>,
    Json(request): Json<CompleteWorkoutRequest>,
) -> Result<Json<CompletionOutcome>, ApiError> {
    authenticate_request(&headers, &state)?;

    let submission = WorkoutSubmission {
        date,
        week_number: request.week_number,
        day_index: request.day_index,
        sections: request.sections,
    };
    let outcome = state
        .store
        .update(|data| session::complete_workout(&PROGRAM, data, submission, Utc::now()))
        .await?;

    for adjustment in &outcome.adjustments {
        tracing::info!(
            %date,
            lift = %adjustment.lift,
            delta = adjustment.delta,
            adjustment = adjustment.new_adjustment,
            "adjustment.applied"
        );
    }
    for record in &outcome.new_records {
        tracing::info!(%date, lift = %record.lift, reps = record.reps, weight = record.weight, "record.new");
    }
    tracing::info!(
        %date,
        week = request.week_number,
        day = request.day_index,
        "workout.completed"
    );

    Ok(Json(outcome))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiftMax {
    lift: Lift,
    name: &'static str,
    base_max: f64,
    adjustment: f64,
    effective_max: f64,
    display: f64,
    unit: WeightUnit,
}

fn lift_maxes(data: &AppData) -> Vec<LiftMax> {
    let unit = data.settings.unit;
    Lift::ALL
        .iter()
        .map(|&lift| {
            let effective = effective_max(lift, &data.base_maxes, &data.adjustments);
            LiftMax {
                lift,
                name: lift.name(),
                base_max: data.base_maxes.get(&lift).copied().unwrap_or(0.0),
                adjustment: data.adjustments.get(&lift).copied().unwrap_or(0.0),
                effective_max: effective,
                display: display_weight(effective, unit),
                unit,
            }
        })
        .collect()
}

pub async fn get_maxes(State(state): State<AppState>) -> Json<Vec<LiftMax>> {
    let data = state.store.snapshot().await;
    Json(lift_maxes(&data))
}

#[derive(Deserialize)]
pub struct UpdateMaxRequest {
    weight: f64,
    #[serde(default)]
    unit: Option<WeightUnit>,
}

pub async fn put_max(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(lift): Path<String>,
    Json(request): Json<UpdateMaxRequest>,
) -> Result<Json<Vec<LiftMax>>, ApiError> {
    authenticate_request(&headers, &state)?;
    let lift: Lift = lift.parse()?;

    let data = state
        .store
        .update(|data| {
            let unit = request.unit.unwrap_or(data.settings.unit);
            let kg = input_to_kg(request.weight, unit);
            let next = session::update_base_max(data, lift, kg)?;
            Ok((next.clone(), next))
        })
        .await?;

    tracing::info!(%lift, base_max = data.base_maxes[&lift], "max.updated");
    Ok(Json(lift_maxes(&data)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRequest {
    #[serde(default)]
    start_date: Option<NaiveDate>,
    #[serde(default)]
    unit: Option<WeightUnit>,
    #[serde(default)]
    bar_weight_kg: Option<f64>,
}

pub async fn put_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SettingsRequest>,
) -> Result<Json<AppData>, ApiError> {
    authenticate_request(&headers, &state)?;
    if let Some(bar) = request.bar_weight_kg
        && (!bar.is_finite() || bar <= 0.0)
    {
        return Err(ApiError::BadRequest(format!(
            "bar weight must be a positive number of kilograms, got {}",
            bar
        )));
    }

    let data = state
        .store
        .update(|data| {
            let mut next = data.clone();
            if request.start_date.is_some() {
                next.start_date = request.start_date;
            }
            if let Some(unit) = request.unit {
                next.settings.unit = unit;
            }
            if let Some(bar) = request.bar_weight_kg {
                next.settings.bar_weight_kg = bar;
            }
            Ok((next.clone(), next))
        })
        .await?;

    tracing::info!(start_date = ?data.start_date, unit = %data.settings.unit, "settings.updated");
    Ok(Json(data))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiftRecords {
    lift: Lift,
    name: &'static str,
    by_reps: BTreeMap<u32, PersonalRecord>,
    best: Option<PersonalRecord>,
    estimated_max: Option<EstimatedMax>,
    volume: Option<VolumeRecord>,
}

pub async fn get_records(State(state): State<AppState>) -> Json<Vec<LiftRecords>> {
    let data = state.store.snapshot().await;
    let mut volume = detect_volume_records(&data.workout_logs);

    let records = Lift::ALL
        .iter()
        .map(|&lift| {
            let by_reps = data
                .personal_records
                .get(&lift)
                .cloned()
                .unwrap_or_default();
            LiftRecords {
                lift,
                name: lift.name(),
                best: best_record(&by_reps).cloned(),
                estimated_max: best_estimated_one_rep_max(&by_reps),
                volume: volume.remove(&lift),
                by_reps,
            }
        })
        .collect();

    Json(records)
}

pub async fn get_streaks(State(state): State<AppState>) -> Result<Json<Streaks>, ApiError> {
    let data = state.store.snapshot().await;
    let start = require_start(&data)?;
    Ok(Json(calculate_streaks(
        &PROGRAM,
        &data.workout_logs,
        start,
        today(),
    )))
}

pub async fn get_consistency(
    State(state): State<AppState>,
) -> Result<Json<Vec<WeekConsistency>>, ApiError> {
    let data = state.store.snapshot().await;
    let start = require_start(&data)?;
    Ok(Json(weekly_consistency(
        &PROGRAM,
        &data.workout_logs,
        start,
        today(),
    )))
}

pub async fn get_summary(
    State(state): State<AppState>,
) -> Result<Json<Option<WeeklySummary>>, ApiError> {
    let data = state.store.snapshot().await;
    let start = require_start(&data)?;
    Ok(Json(weekly_summary(
        &PROGRAM,
        &data.workout_logs,
        &data.readiness,
        start,
        today(),
    )))
}

#[derive(Deserialize)]
pub struct PlatesQuery {
    weight: f64,
    #[serde(default)]
    unit: Option<WeightUnit>,
    #[serde(default)]
    bar: Option<f64>,
}

pub async fn get_plates(
    State(state): State<AppState>,
    Query(query): Query<PlatesQuery>,
) -> Result<Json<PlateLoad>, ApiError> {
    if !query.weight.is_finite() || query.weight < 0.0 {
        return Err(ApiError::BadRequest(format!(
            "weight must be a non-negative number, got {}",
            query.weight
        )));
    }

    if let Some(bar) = query.bar
        && (!bar.is_finite() || bar < 0.0)
    {
        return Err(ApiError::BadRequest(format!(
            "bar must be a non-negative number, got {}",
            bar
        )));
    }

    let data = state.store.snapshot().await;
    let unit = query.unit.unwrap_or(data.settings.unit);
    if input_to_kg(query.weight, unit) > MAX_TOTAL_KG {
        return Err(ApiError::BadRequest(format!(
            "weight must be at most {} {}, got {}",
            display_weight(MAX_TOTAL_KG, unit),
            unit,
            query.weight
        )));
    }
    let bar = query
        .bar
        .unwrap_or_else(|| bar_weight_in_unit(data.settings.bar_weight_kg, unit));
    Ok(Json(calculate_plates(query.weight, unit, Some(bar))))
}

#[derive(Serialize)]
pub struct MetconHistory {
    name: String,
    best: Option<MetconScoreEntry>,
    entries: Vec<MetconScoreEntry>,
}

pub async fn get_metcons(State(state): State<AppState>) -> Json<Vec<MetconHistory>> {
    let data = state.store.snapshot().await;
    let history = data
        .metcon_scores
        .into_iter()
        .map(|(name, entries)| MetconHistory {
            name,
            best: best_score(&entries).cloned(),
            entries,
        })
        .collect();
    Json(history)
}

#[derive(Deserialize)]
pub struct CoachRequest {
    message: String,
}

pub async fn post_coach(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CoachRequest>,
) -> Result<Json<CoachReply>, ApiError> {
    authenticate_request(&headers, &state)?;
    let Some(gemini) = &state.gemini else {
        return Err(ApiError::CoachUnavailable);
    };
    if request.message.trim().is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".to_string()));
    }

    let data = state.store.snapshot().await;
    let context = build_coach_context(&PROGRAM, &data, today());
    let prompt = build_coach_prompt(&context, &request.message);
    tracing::debug!(prompt = %prompt, "gemini.prompt");

    let response = gemini.generate_text(&prompt).await?;
    tracing::debug!(response = %response, "gemini.response");

    let reply = parse_coach_response(&response)?;
    tracing::info!(action_count = reply.actions.len(), "coach.replied");
    Ok(Json(reply))
}

#[derive(Deserialize)]
pub struct CoachActionsRequest {
    actions: Vec<CoachAction>,
}

pub async fn post_coach_actions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CoachActionsRequest>,
) -> Result<Json<Vec<LiftMax>>, ApiError> {
    authenticate_request(&headers, &state)?;

    let data = state
        .store
        .update(|data| {
            let next = session::apply_coach_actions(data, &request.actions);
            Ok((next.clone(), next))
        })
        .await?;

    tracing::info!(action_count = request.actions.len(), "coach.actions_applied");
    Ok(Json(lift_maxes(&data)))
}

pub async fn get_backup(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AppData>, ApiError> {
    authenticate_request(&headers, &state)?;
    Ok(Json(state.store.snapshot().await))
}

pub async fn put_backup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(backup): Json<Value>,
) -> Result<Json<AppData>, ApiError> {
    authenticate_request(&headers, &state)?;
    let data = state.store.import(backup).await?;
    tracing::info!(
        version = data.version,
        workout_count = data.workout_logs.len(),
        "backup.imported"
    );
    Ok(Json(data))
}

pub async fn delete_backup(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AppData>, ApiError> {
    authenticate_request(&headers, &state)?;
    let data = state.store.reset().await?;
    tracing::warn!("backup.reset");
    Ok(Json(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    async fn state() -> AppState {
        let path = std::env::temp_dir()
            .join(format!("recovery-tracker-auth-{}", std::process::id()))
            .join("data.json");
        AppState {
            config: Config {
                port: "3000".to_string(),
                api_token: "secret".to_string(),
                data_path: path.clone(),
                gemini_api_key: None,
                gemini_model: "gemini-2.0-flash".to_string(),
                gemini_api_url: "https://generativelanguage.googleapis.com".to_string(),
                reminder_cron: "0 0 7 * * *".to_string(),
            },
            store: Arc::new(StateStore::load(path).await.unwrap()),
            gemini: None,
        }
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[tokio::test]
    async fn test_authenticate_request() {
        let state = state().await;
        assert!(authenticate_request(&headers("Bearer secret"), &state).is_ok());
        assert!(authenticate_request(&headers("Bearer wrong"), &state).is_err());
        assert!(authenticate_request(&headers("secret"), &state).is_err());
        assert!(authenticate_request(&HeaderMap::new(), &state).is_err());
    }

    #[test]
    fn test_lift_maxes_use_effective_values() {
        let mut data = AppData::default();
        data.adjustments.insert(Lift::Bench, 2.5);
        data.settings.unit = WeightUnit::Lbs;

        let maxes = lift_maxes(&data);
        let bench = maxes.iter().find(|m| m.lift == Lift::Bench).unwrap();
        assert_eq!(bench.effective_max, 67.5);
        assert_eq!(bench.display, 150.0);
    }

    #[tokio::test]
    async fn test_plates_reject_unloadable_weights() {
        let query = |weight: f64| PlatesQuery {
            weight,
            unit: Some(WeightUnit::Kg),
            bar: None,
        };

        let result = get_plates(State(state().await), Query(query(4.0e18))).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
        let result = get_plates(State(state().await), Query(query(f64::NAN))).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));

        let Json(load) = get_plates(State(state().await), Query(query(100.0)))
            .await
            .unwrap();
        assert_eq!(load.per_side, vec![25.0, 15.0]);
    }

    #[test]
    fn test_readiness_request_accepts_flattened_input() {
        let request: ReadinessRequest = serde_json::from_str(
            r#"{"date":"2025-01-06","source":"external","recoveryPercent":45}"#,
        )
        .unwrap();
        assert_eq!(request.date, NaiveDate::from_ymd_opt(2025, 1, 6));
        assert_eq!(
            request.input,
            ReadinessInput::External {
                recovery_percent: 45.0
            }
        );
    }
}
