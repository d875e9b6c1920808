//! Record store: the persisted user snapshot and the facade that mutates it.
//!
//! [`UserData`] holds every transition as a plain method so it can be driven
//! without any storage at all. [`TrainingStore`] wraps one snapshot with a
//! [`StorageBackend`] and writes after every mutation; write failures are
//! logged and swallowed so callers never handle persistence errors.

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::training_engine::{
    achievements::{default_achievements, Achievement, AchievementId},
    adaptive::AdaptiveEngine,
    config::StoreConfig,
    games::{AchievementSignal, GameOutcome},
    models::{local_day, Ability, AbilityScores, RecordDraft, TrainingRecord, TrainingType},
    persistence::{self, StorageBackend, SCHEMA_VERSION},
};

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub schema_version: u32,
    /// Seconds.
    pub total_training_time: u64,
    pub total_sessions: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    #[serde(with = "date_or_empty")]
    pub last_training_date: Option<NaiveDate>,
    pub level: u32,
    /// Accumulated, never reset on level-up.
    pub experience: u64,
    pub ability_scores: AbilityScores,
    /// Most recent first.
    pub training_history: Vec<TrainingRecord>,
    pub achievements: Vec<Achievement>,
    /// Minutes.
    pub daily_goal: u32,
    /// Minutes trained on `last_training_date`.
    pub daily_progress: u32,
}

impl Default for UserData {
    fn default() -> Self {
        UserData::with_goal(crate::training_engine::config::DEFAULT_DAILY_GOAL)
    }
}

/// Level reached from `level` once `experience` (the running total) is
/// spent: leaving level `n` costs `n × 100`. Never below `level`.
pub fn level_after(level: u32, experience: u64) -> u32 {
    let mut level = level.max(1);
    let mut remaining = experience;
    while remaining >= level as u64 * 100 {
        remaining -= level as u64 * 100;
        level += 1;
    }
    level
}

impl UserData {
    pub fn with_goal(daily_goal: u32) -> Self {
        UserData {
            schema_version: SCHEMA_VERSION,
            total_training_time: 0,
            total_sessions: 0,
            current_streak: 0,
            longest_streak: 0,
            last_training_date: None,
            level: 1,
            experience: 0,
            ability_scores: AbilityScores::default(),
            training_history: Vec::new(),
            achievements: default_achievements(),
            daily_goal,
            daily_progress: 0,
        }
    }

    /// Engine view over this snapshot, evaluated at `now`.
    pub fn engine_at(&self, now: DateTime<Utc>) -> AdaptiveEngine<'_> {
        AdaptiveEngine::new(&self.training_history, &self.ability_scores)
            .with_progress(self.level, self.experience)
            .at(now)
    }

    /// Finalize a draft: assign id/timestamp, update streak, experience,
    /// level, daily progress, trim history, refresh milestone achievements.
    pub fn add_training_record(
        &mut self,
        draft: RecordDraft,
        now: DateTime<Utc>,
        history_limit: usize,
    ) -> TrainingRecord {
        let today = local_day(now);
        let minutes = draft.duration / 60;
        self.daily_progress = if self.last_training_date == Some(today) {
            self.daily_progress + minutes
        } else {
            minutes
        };
        self.bump_streak(today);

        self.experience += draft.experience();
        self.level = level_after(self.level, self.experience);
        self.total_training_time += draft.duration as u64;
        self.total_sessions += 1;

        let record = TrainingRecord {
            id: Uuid::new_v4().to_string(),
            training_type: draft.training_type,
            score: draft.score.min(100),
            accuracy: draft.accuracy,
            duration: draft.duration,
            difficulty: draft.difficulty,
            timestamp: now,
        };
        self.training_history.insert(0, record.clone());
        self.training_history.truncate(history_limit);
        debug!(
            id = %record.id,
            training_type = record.training_type.tag(),
            score = record.score,
            level = self.level,
            "training record added"
        );

        self.refresh_milestones(now);
        record
    }

    fn bump_streak(&mut self, today: NaiveDate) {
        match self.last_training_date {
            Some(last) if last == today => {}
            Some(last) if today - last == Duration::days(1) => {
                self.current_streak += 1;
                self.longest_streak = self.longest_streak.max(self.current_streak);
            }
            _ => {
                self.current_streak = 1;
                self.longest_streak = self.longest_streak.max(1);
            }
        }
        self.last_training_date = Some(today);
    }

    fn refresh_milestones(&mut self, now: DateTime<Utc>) {
        let sessions = self.total_sessions;
        let streak = self.current_streak;
        let level = self.level;
        let modules = self
            .training_history
            .iter()
            .map(|r| r.training_type)
            .collect::<HashSet<TrainingType>>()
            .len() as u32;

        self.update_achievement_progress(AchievementId::FirstTraining, sessions, now);
        self.update_achievement_progress(AchievementId::Training100, sessions, now);
        self.update_achievement_progress(AchievementId::WeekStreak, streak, now);
        self.update_achievement_progress(AchievementId::MonthStreak, streak, now);
        self.update_achievement_progress(AchievementId::Level10, level, now);
        self.update_achievement_progress(AchievementId::Level50, level, now);
        self.update_achievement_progress(AchievementId::AllRounder, modules, now);
    }

    /// Merge a partial update; every value is clamped to `[0, 100]`.
    pub fn update_ability_scores<I>(&mut self, updates: I)
    where
        I: IntoIterator<Item = (Ability, f64)>,
    {
        self.ability_scores.merge(updates);
    }

    pub fn unlock_achievement(&mut self, id: AchievementId, now: DateTime<Utc>) {
        if let Some(ach) = self.achievements.iter_mut().find(|a| a.id == id) {
            if ach.unlock(now) {
                info!(achievement = %id, "achievement unlocked");
            }
        }
    }

    pub fn update_achievement_progress(&mut self, id: AchievementId, progress: u32, now: DateTime<Utc>) {
        if let Some(ach) = self.achievements.iter_mut().find(|a| a.id == id) {
            if ach.set_progress(progress, now) {
                info!(achievement = %id, "achievement unlocked");
            }
        }
    }

    /// Apply a finished game: record, ability nudges, achievement signals.
    pub fn complete_session(
        &mut self,
        outcome: GameOutcome,
        now: DateTime<Utc>,
        history_limit: usize,
    ) -> TrainingRecord {
        let record = self.add_training_record(outcome.draft, now, history_limit);
        let nudged: Vec<(Ability, f64)> = outcome
            .nudges
            .iter()
            .map(|n| (n.ability, (self.ability_scores.get(n.ability) + n.gain).min(100.0)))
            .collect();
        self.update_ability_scores(nudged);
        for signal in outcome.achievements {
            match signal {
                AchievementSignal::Progress(id, progress) => {
                    self.update_achievement_progress(id, progress, now)
                }
                AchievementSignal::Unlock(id) => self.unlock_achievement(id, now),
            }
        }
        record
    }

    /// History, optionally filtered to one module; most recent first.
    pub fn training_history(&self, training_type: Option<TrainingType>) -> Vec<&TrainingRecord> {
        self.training_history
            .iter()
            .filter(|r| training_type.map_or(true, |t| r.training_type == t))
            .collect()
    }

    /// Records no older than `days` days before `now`.
    pub fn recent_training_data(&self, days: u32, now: DateTime<Utc>) -> Vec<&TrainingRecord> {
        let cutoff = now - Duration::days(days as i64);
        self.training_history.iter().filter(|r| r.timestamp >= cutoff).collect()
    }

    /// Share of the current level already earned, in percent.
    pub fn level_progress(&self) -> f64 {
        let spent: u64 = (1..self.level as u64).map(|l| l * 100).sum();
        let current = self.experience.saturating_sub(spent) as f64;
        (current / (self.level as f64 * 100.0) * 100.0).min(100.0)
    }
}

/// `Option<NaiveDate>` as `"YYYY-MM-DD"` or `""`.
mod date_or_empty {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = String::deserialize(d)?;
        Ok(super::parse_day(&raw))
    }
}

/// Parse `"YYYY-MM-DD"`, tolerating a trailing time part; anything else is `None`.
pub(crate) fn parse_day(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

// ---------------------------------------------------------------------------
// Facade
// ---------------------------------------------------------------------------

/// One user's snapshot bound to a storage backend.
pub struct TrainingStore<B: StorageBackend> {
    config: StoreConfig,
    backend: B,
    data: UserData,
}

impl<B: StorageBackend> TrainingStore<B> {
    /// Load (or default) the snapshot. Never fails.
    pub fn open(config: StoreConfig, backend: B) -> Self {
        let data = persistence::load_user_data(&backend, &config);
        TrainingStore { config, backend, data }
    }

    pub fn data(&self) -> &UserData {
        &self.data
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// For side stores (daily challenge, plans) sharing the same backend.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn engine(&self) -> AdaptiveEngine<'_> {
        self.data.engine_at(Utc::now())
    }

    pub fn add_training_record(&mut self, draft: RecordDraft) -> TrainingRecord {
        self.add_training_record_at(draft, Utc::now())
    }

    pub fn add_training_record_at(&mut self, draft: RecordDraft, now: DateTime<Utc>) -> TrainingRecord {
        let limit = self.config.history_limit;
        let record = self.data.add_training_record(draft, now, limit);
        self.persist();
        record
    }

    pub fn complete_session(&mut self, outcome: GameOutcome) -> TrainingRecord {
        self.complete_session_at(outcome, Utc::now())
    }

    pub fn complete_session_at(&mut self, outcome: GameOutcome, now: DateTime<Utc>) -> TrainingRecord {
        let limit = self.config.history_limit;
        let record = self.data.complete_session(outcome, now, limit);
        self.persist();
        record
    }

    pub fn update_ability_scores<I>(&mut self, updates: I)
    where
        I: IntoIterator<Item = (Ability, f64)>,
    {
        self.data.update_ability_scores(updates);
        self.persist();
    }

    pub fn unlock_achievement(&mut self, id: AchievementId) {
        self.data.unlock_achievement(id, Utc::now());
        self.persist();
    }

    pub fn update_achievement_progress(&mut self, id: AchievementId, progress: u32) {
        self.data.update_achievement_progress(id, progress, Utc::now());
        self.persist();
    }

    pub fn set_daily_goal(&mut self, minutes: u32) {
        self.data.daily_goal = minutes;
        self.persist();
    }

    /// Back to defaults and drop the stored payload.
    pub fn reset(&mut self) {
        self.data = UserData::with_goal(self.config.default_daily_goal);
        if let Err(err) = self.backend.remove(&self.config.storage_key) {
            error!(error = %err, key = %self.config.storage_key, "failed to clear user data");
        }
    }

    fn persist(&mut self) {
        if let Err(err) = persistence::save_user_data(&mut self.backend, &self.config, &self.data) {
            error!(error = %err, key = %self.config.storage_key, "failed to save user data");
        }
    }
}
