//! The persisted training record and the file-backed store that owns it.

pub mod migrations;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::error::EngineError;
use crate::models::lift::{LiftMap, default_adjustments, default_base_maxes};
use crate::models::log::{
    AdjustmentHistoryEntry, MetconScoreEntry, ReadinessEntry, RecordTable, WorkoutLogs,
};
use crate::services::units::WeightUnit;

pub use migrations::CURRENT_VERSION;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub unit: WeightUnit,
    #[serde(default = "default_bar_weight_kg")]
    pub bar_weight_kg: f64,
}

fn default_bar_weight_kg() -> f64 {
    20.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            unit: WeightUnit::Kg,
            bar_weight_kg: default_bar_weight_kg(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    pub version: u64,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    pub base_maxes: LiftMap,
    #[serde(default = "default_adjustments")]
    pub adjustments: LiftMap,
    #[serde(default)]
    pub adjustment_history: Vec<AdjustmentHistoryEntry>,
    #[serde(default)]
    pub workout_logs: WorkoutLogs,
    #[serde(default)]
    pub personal_records: RecordTable,
    #[serde(default)]
    pub readiness: BTreeMap<NaiveDate, ReadinessEntry>,
    /// Keyed by metcon name, append-only.
    #[serde(default)]
    pub metcon_scores: BTreeMap<String, Vec<MetconScoreEntry>>,
    #[serde(default)]
    pub workout_notes: BTreeMap<NaiveDate, String>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub last_reminder_date: Option<NaiveDate>,
}

impl Default for AppData {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            start_date: None,
            base_maxes: default_base_maxes(),
            adjustments: default_adjustments(),
            adjustment_history: Vec::new(),
            workout_logs: WorkoutLogs::new(),
            personal_records: RecordTable::new(),
            readiness: BTreeMap::new(),
            metcon_scores: BTreeMap::new(),
            workout_notes: BTreeMap::new(),
            settings: Settings::default(),
            last_reminder_date: None,
        }
    }
}

impl AppData {
    /// Parses a record of any supported version, migrating it forward.
    pub fn from_value(value: Value) -> Result<Self, EngineError> {
        let migrated = migrations::migrate(value)?;
        serde_json::from_value(migrated).map_err(|e| EngineError::InvalidBackup(e.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("failed to persist state: {0}")]
    Persist(#[from] anyhow::Error),
}

/// Owns the single mutable record. Every write replaces the file and the
/// in-memory copy together, under one lock.
pub struct StateStore {
    path: PathBuf,
    data: Mutex<AppData>,
}

impl StateStore {
    pub async fn load(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();

        let data = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => {
                let value: Value = serde_json::from_str(&raw)
                    .with_context(|| format!("failed to parse {}", path.display()))?;
                let stored_version = value.get("version").and_then(Value::as_u64);
                let data = AppData::from_value(value)?;
                if stored_version != Some(CURRENT_VERSION) {
                    tracing::info!(
                        from = ?stored_version,
                        to = CURRENT_VERSION,
                        "store.migrated"
                    );
                    write_atomic(&path, &data).await?;
                }
                data
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "store.initialized");
                AppData::default()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };

        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    pub async fn snapshot(&self) -> AppData {
        self.data.lock().await.clone()
    }

    /// Runs `mutation` against the current record and, if it succeeds,
    /// persists and installs the record it returns.
    pub async fn update<T, F>(&self, mutation: F) -> Result<T, StoreError>
    where
        F: FnOnce(&AppData) -> Result<(AppData, T), EngineError>,
    {
        let mut guard = self.data.lock().await;
        let (next, output) = mutation(&guard)?;
        write_atomic(&self.path, &next).await?;
        *guard = next;
        Ok(output)
    }

    pub async fn import(&self, value: Value) -> Result<AppData, StoreError> {
        let data = AppData::from_value(value)?;
        self.replace(data.clone()).await?;
        Ok(data)
    }

    pub async fn reset(&self) -> Result<AppData, StoreError> {
        let data = AppData::default();
        self.replace(data.clone()).await?;
        Ok(data)
    }

    async fn replace(&self, data: AppData) -> Result<(), StoreError> {
        let mut guard = self.data.lock().await;
        write_atomic(&self.path, &data).await?;
        *guard = data;
        Ok(())
    }
}

async fn write_atomic(path: &Path, data: &AppData) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let body = serde_json::to_string_pretty(data)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body)
        .await
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lift::Lift;
    use serde_json::json;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "recovery-tracker-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir.join("data.json")
    }

    #[test]
    fn test_default_record_round_trips() {
        let data = AppData::default();
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["version"], json!(3));
        assert_eq!(value["baseMaxes"]["powerClean"], json!(82.5));
        assert_eq!(value["settings"]["barWeightKg"], json!(20.0));
        assert_eq!(AppData::from_value(value).unwrap(), data);
    }

    #[tokio::test]
    async fn test_missing_file_starts_from_defaults() {
        let path = temp_path("missing");
        let store = StateStore::load(&path).await.unwrap();
        assert_eq!(store.snapshot().await, AppData::default());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_update_persists_and_reloads() {
        let path = temp_path("update");
        let store = StateStore::load(&path).await.unwrap();

        let squat = store
            .update(|data| {
                let mut next = data.clone();
                next.base_maxes.insert(Lift::BackSquat, 130.0);
                Ok((next, 130.0))
            })
            .await
            .unwrap();
        assert_eq!(squat, 130.0);

        let reloaded = StateStore::load(&path).await.unwrap();
        assert_eq!(reloaded.snapshot().await.base_maxes[&Lift::BackSquat], 130.0);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_failed_update_leaves_state_untouched() {
        let path = temp_path("failed");
        let store = StateStore::load(&path).await.unwrap();

        let result: Result<(), _> = store
            .update(|_| Err(EngineError::StartDateNotSet))
            .await;
        assert!(matches!(
            result,
            Err(StoreError::Engine(EngineError::StartDateNotSet))
        ));
        assert_eq!(store.snapshot().await, AppData::default());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_import_migrates_and_reset_restores() {
        let path = temp_path("import");
        let store = StateStore::load(&path).await.unwrap();

        let imported = store
            .import(json!({
                "version": 1,
                "startDate": "2025-01-06",
                "baseMaxes": { "backSquat": 140 },
                "adjustments": { "backSquat": -5 }
            }))
            .await
            .unwrap();
        assert_eq!(imported.version, CURRENT_VERSION);
        assert_eq!(imported.adjustments[&Lift::BackSquat], -5.0);
        assert_eq!(store.snapshot().await.start_date, imported.start_date);

        assert!(store.import(json!({ "version": 1 })).await.is_err());
        assert_eq!(store.snapshot().await, imported);

        store.reset().await.unwrap();
        assert_eq!(store.snapshot().await, AppData::default());
    }

    #[tokio::test]
    async fn test_old_file_is_migrated_on_load() {
        let path = temp_path("legacy");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            r#"{"version":1,"startDate":null,"baseMaxes":{"bench":70},"adjustments":{},"adjustmentHistory":[],"workoutLogs":{}}"#,
        )
        .unwrap();

        let store = StateStore::load(&path).await.unwrap();
        assert_eq!(store.snapshot().await.base_maxes[&Lift::Bench], 70.0);

        let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk["version"], json!(3));
    }
}
