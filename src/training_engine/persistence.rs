//! Storage port and load-time reconciliation.
//!
//! A [`StorageBackend`] is a flat key → JSON-string map (the same shape as
//! browser local storage). Loading never fails: a missing key yields the
//! defaults, an unreadable payload yields the defaults plus a warning, and a
//! readable payload is reconciled field by field against the current default
//! schema so older layouts keep loading after fields are added.

use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::training_engine::{
    achievements::{default_achievements, Achievement, AchievementId},
    config::StoreConfig,
    error::{StoreError, StoreResult},
    models::{clamp_score, Ability, AbilityScores, TrainingRecord},
    store::{parse_day, UserData},
};

/// Version written with every snapshot.
/// v1: first layout, without `schemaVersion`. v2: adds `schemaVersion`,
/// `logic_master` and `storyteller`.
pub const SCHEMA_VERSION: u32 = 2;

// ---------------------------------------------------------------------------
// Backends
// ---------------------------------------------------------------------------

pub trait StorageBackend {
    fn read(&self, key: &str) -> StoreResult<Option<String>>;
    fn write(&mut self, key: &str, payload: &str) -> StoreResult<()>;
    fn remove(&mut self, key: &str) -> StoreResult<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, payload: &str) -> StoreResult<()> {
        self.entries.insert(key.to_string(), payload.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileBackend { dir: dir.into() }
    }

    /// Use `config.data_dir`, falling back to the working directory.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.data_dir.clone().unwrap_or_else(|| PathBuf::from(".")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn io_err(key: &str, source: std::io::Error) -> StoreError {
    StoreError::Io { key: key.to_string(), source }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_err(key, err)),
        }
    }

    fn write(&mut self, key: &str, payload: &str) -> StoreResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| io_err(key, e))?;
        fs::write(self.path_for(key), payload).map_err(|e| io_err(key, e))
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_err(key, err)),
        }
    }
}

// ---------------------------------------------------------------------------
// Lenient stored shapes
// ---------------------------------------------------------------------------

/// Every field optional; unknown fields are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoredUserData {
    pub schema_version: Option<u32>,
    pub total_training_time: Option<u64>,
    pub total_sessions: Option<u32>,
    pub current_streak: Option<u32>,
    pub longest_streak: Option<u32>,
    pub last_training_date: Option<String>,
    pub level: Option<u32>,
    pub experience: Option<u64>,
    pub ability_scores: Option<StoredAbilityScores>,
    pub training_history: Option<Vec<TrainingRecord>>,
    pub achievements: Option<Vec<StoredAchievement>>,
    pub daily_goal: Option<u32>,
    pub daily_progress: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StoredAbilityScores {
    pub attention: Option<f64>,
    pub memory: Option<f64>,
    pub reaction: Option<f64>,
    pub logic: Option<f64>,
    pub coordination: Option<f64>,
    pub inhibition: Option<f64>,
    pub creativity: Option<f64>,
}

impl StoredAbilityScores {
    fn get(&self, ability: Ability) -> Option<f64> {
        match ability {
            Ability::Attention    => self.attention,
            Ability::Memory       => self.memory,
            Ability::Reaction     => self.reaction,
            Ability::Logic        => self.logic,
            Ability::Coordination => self.coordination,
            Ability::Inhibition   => self.inhibition,
            Ability::Creativity   => self.creativity,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAchievement {
    pub id: String,
    #[serde(default)]
    pub progress: Option<u32>,
    #[serde(default)]
    pub target: Option<u32>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub unlocked_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Merge a stored payload over `defaults`, one field at a time.
pub fn reconcile(stored: StoredUserData, defaults: UserData) -> UserData {
    if stored.schema_version.unwrap_or(1) < SCHEMA_VERSION {
        debug!(
            from = stored.schema_version.unwrap_or(1),
            to = SCHEMA_VERSION,
            "upgrading stored user data"
        );
    }

    let experience = stored.experience.unwrap_or(defaults.experience);
    let level = stored.level.unwrap_or(defaults.level).max(1);

    UserData {
        schema_version: SCHEMA_VERSION,
        total_training_time: stored.total_training_time.unwrap_or(defaults.total_training_time),
        total_sessions: stored.total_sessions.unwrap_or(defaults.total_sessions),
        current_streak: stored.current_streak.unwrap_or(defaults.current_streak),
        longest_streak: stored.longest_streak.unwrap_or(defaults.longest_streak),
        last_training_date: stored
            .last_training_date
            .as_deref()
            .and_then(parse_day)
            .or(defaults.last_training_date),
        level,
        experience,
        ability_scores: reconcile_abilities(stored.ability_scores, defaults.ability_scores),
        training_history: stored.training_history.unwrap_or(defaults.training_history),
        achievements: reconcile_achievements(stored.achievements.unwrap_or_default()),
        daily_goal: stored.daily_goal.unwrap_or(defaults.daily_goal),
        daily_progress: stored.daily_progress.unwrap_or(defaults.daily_progress),
    }
}

fn reconcile_abilities(stored: Option<StoredAbilityScores>, defaults: AbilityScores) -> AbilityScores {
    let stored = stored.unwrap_or_default();
    let mut scores = defaults;
    for ability in Ability::ALL {
        if let Some(value) = stored.get(ability) {
            scores.set(ability, clamp_score(value));
        }
    }
    scores
}

/// Defaults in catalogue order, each overlaid by its stored counterpart.
fn reconcile_achievements(stored: Vec<StoredAchievement>) -> Vec<Achievement> {
    let mut by_id: HashMap<AchievementId, StoredAchievement> = HashMap::new();
    for ach in stored {
        match AchievementId::from_key(&ach.id) {
            Some(id) => {
                by_id.insert(id, ach);
            }
            None => debug!(id = %ach.id, "dropping unknown stored achievement"),
        }
    }

    default_achievements()
        .into_iter()
        .map(|mut ach| {
            if let Some(saved) = by_id.remove(&ach.id) {
                ach.target = saved.target.unwrap_or(ach.target);
                ach.progress = saved.progress.unwrap_or(ach.progress);
                ach.unlocked_at = saved.unlocked_at;
            }
            ach
        })
        .collect()
}

/// Parse and reconcile a raw payload.
pub fn decode_user_data(payload: &str, defaults: UserData) -> StoreResult<UserData> {
    let stored: StoredUserData = serde_json::from_str(payload)?;
    Ok(reconcile(stored, defaults))
}

pub fn load_user_data<B: StorageBackend + ?Sized>(backend: &B, config: &StoreConfig) -> UserData {
    let defaults = UserData::with_goal(config.default_daily_goal);
    let payload = match backend.read(&config.storage_key) {
        Ok(Some(payload)) => payload,
        Ok(None) => return defaults,
        Err(err) => {
            warn!(error = %err, key = %config.storage_key, "failed to read user data, using defaults");
            return defaults;
        }
    };

    match decode_user_data(&payload, defaults.clone()) {
        Ok(mut data) => {
            if data.training_history.len() > config.history_limit {
                data.training_history.truncate(config.history_limit);
            }
            data
        }
        Err(err) => {
            warn!(error = %err, key = %config.storage_key, "failed to load user data, using defaults");
            defaults
        }
    }
}

pub fn save_user_data<B: StorageBackend + ?Sized>(
    backend: &mut B,
    config: &StoreConfig,
    data: &UserData,
) -> StoreResult<()> {
    let payload = serde_json::to_string(data)?;
    backend.write(&config.storage_key, &payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_take_defaults() {
        let payload = json!({
            "level": 3,
            "experience": 320,
            "abilityScores": { "memory": 72, "logic": 140 },
            "somethingNew": true
        })
        .to_string();
        let data = decode_user_data(&payload, UserData::default()).unwrap();
        assert_eq!(data.level, 3);
        assert_eq!(data.ability_scores.memory, 72.0);
        assert_eq!(data.ability_scores.logic, 100.0);
        assert_eq!(data.ability_scores.attention, 50.0);
        assert_eq!(data.daily_goal, 15);
        assert_eq!(data.achievements.len(), default_achievements().len());
        assert_eq!(data.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn stored_achievements_overlay_defaults() {
        let payload = json!({
            "achievements": [
                { "id": "week_streak", "name": "old name", "progress": 4, "target": 7 },
                { "id": "first_training", "progress": 1, "target": 1, "unlockedAt": 1_700_000_000_000_i64 },
                { "id": "retired_badge", "progress": 9, "target": 9 }
            ]
        })
        .to_string();
        let data = decode_user_data(&payload, UserData::default()).unwrap();
        let ids: Vec<AchievementId> = data.achievements.iter().map(|a| a.id).collect();
        assert_eq!(ids, AchievementId::ALL.to_vec());
        let week = &data.achievements[1];
        assert_eq!(week.progress, 4);
        assert_eq!(week.name, "One Week Strong");
        assert!(data.achievements[0].is_unlocked());
    }

    #[test]
    fn empty_last_training_date_is_none() {
        let data = decode_user_data(r#"{"lastTrainingDate": ""}"#, UserData::default()).unwrap();
        assert_eq!(data.last_training_date, None);
    }

    #[test]
    fn garbage_payload_is_an_error() {
        assert!(matches!(
            decode_user_data("{not json", UserData::default()),
            Err(StoreError::Json(_))
        ));
    }

    #[test]
    fn file_backend_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FileBackend::new(dir.path().join("nested"));
        assert_eq!(backend.read("k").unwrap(), None);
        backend.write("k", "{}").unwrap();
        assert_eq!(backend.read("k").unwrap().as_deref(), Some("{}"));
        backend.remove("k").unwrap();
        backend.remove("k").unwrap();
        assert_eq!(backend.read("k").unwrap(), None);
    }
}
