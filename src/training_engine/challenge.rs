//! Daily challenge: three modules per calendar day, the same for every user.
//!
//! The draw is seeded from the date (`y·10000 + m·100 + d`) through a small
//! linear congruential generator, so the lineup is reproducible without any
//! stored state. Progress for the day lives under its own storage key and is
//! discarded once the date rolls over; completed dates accumulate under a
//! second key for the challenge streak.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::training_engine::{
    error::StoreResult,
    models::{local_day, RecordDraft, TrainingType},
    persistence::StorageBackend,
};

pub const PROGRESS_KEY: &str = "dailyChallengeProgress";
pub const HISTORY_KEY: &str = "dailyChallengeHistory";
pub const MODULES_PER_DAY: usize = 3;
const CHALLENGE_DIFFICULTY: u32 = 2;
/// Longest streak looked back over.
const STREAK_HORIZON_DAYS: i64 = 365;

// ---------------------------------------------------------------------------
// Date-seeded draw
// ---------------------------------------------------------------------------

/// `seed = (seed · 9301 + 49297) mod 233280`, yielding `seed / 233280`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyLcg {
    seed: u64,
}

impl DailyLcg {
    const MULTIPLIER: u64 = 9301;
    const INCREMENT: u64 = 49297;
    const MODULUS: u64 = 233_280;

    pub fn for_date(date: NaiveDate) -> Self {
        let seed = date.year() as u64 * 10_000 + date.month() as u64 * 100 + date.day() as u64;
        DailyLcg { seed }
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.seed = (self.seed * Self::MULTIPLIER + Self::INCREMENT) % Self::MODULUS;
        self.seed as f64 / Self::MODULUS as f64
    }
}

/// The day's lineup: a Fisher-Yates shuffle of all modules driven by the
/// date LCG, first three kept.
pub fn daily_modules(date: NaiveDate) -> [TrainingType; MODULES_PER_DAY] {
    let mut lcg = DailyLcg::for_date(date);
    let mut modules = TrainingType::ALL;
    for i in (1..modules.len()).rev() {
        let j = ((lcg.next_f64() * (i + 1) as f64) as usize).min(i);
        modules.swap(i, j);
    }
    [modules[0], modules[1], modules[2]]
}

// ---------------------------------------------------------------------------
// Per-day progress
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeProgress {
    pub date: NaiveDate,
    #[serde(default)]
    pub completed_modules: Vec<TrainingType>,
    #[serde(default)]
    pub scores: BTreeMap<TrainingType, u32>,
    #[serde(default)]
    pub total_score: u32,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl ChallengeProgress {
    pub fn fresh(date: NaiveDate) -> Self {
        ChallengeProgress {
            date,
            completed_modules: Vec::new(),
            scores: BTreeMap::new(),
            total_score: 0,
            completed: false,
            start_time: None,
            end_time: None,
        }
    }
}

/// What completing a module led to.
#[derive(Debug, Clone, PartialEq)]
pub enum ChallengeStep {
    /// More modules to go; this one is next.
    Next(TrainingType),
    /// The last module is done. One draft per module, ready for the store.
    Completed(Vec<RecordDraft>),
    /// Today's challenge was already finished; nothing changed.
    AlreadyCompleted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyChallenge {
    modules: [TrainingType; MODULES_PER_DAY],
    progress: ChallengeProgress,
}

impl DailyChallenge {
    /// A fresh challenge for `date`.
    pub fn for_date(date: NaiveDate) -> Self {
        DailyChallenge { modules: daily_modules(date), progress: ChallengeProgress::fresh(date) }
    }

    /// Today's challenge, resuming stored progress when it is from today.
    pub fn load<B: StorageBackend + ?Sized>(backend: &B) -> Self {
        Self::load_for(backend, Local::now().date_naive())
    }

    pub fn load_for<B: StorageBackend + ?Sized>(backend: &B, today: NaiveDate) -> Self {
        let mut challenge = Self::for_date(today);
        let payload = match backend.read(PROGRESS_KEY) {
            Ok(Some(payload)) => payload,
            Ok(None) => return challenge,
            Err(err) => {
                warn!(error = %err, "failed to read challenge progress");
                return challenge;
            }
        };
        match serde_json::from_str::<ChallengeProgress>(&payload) {
            Ok(progress) if progress.date == today => challenge.progress = progress,
            Ok(progress) => debug!(stored = %progress.date, %today, "discarding stale challenge progress"),
            Err(err) => warn!(error = %err, "unreadable challenge progress, starting fresh"),
        }
        challenge
    }

    pub fn save<B: StorageBackend + ?Sized>(&self, backend: &mut B) -> StoreResult<()> {
        let payload = serde_json::to_string(&self.progress)?;
        backend.write(PROGRESS_KEY, &payload)
    }

    pub fn modules(&self) -> &[TrainingType; MODULES_PER_DAY] {
        &self.modules
    }

    pub fn progress(&self) -> &ChallengeProgress {
        &self.progress
    }

    pub fn date(&self) -> NaiveDate {
        self.progress.date
    }

    pub fn is_completed(&self) -> bool {
        self.progress.completed
    }

    /// The module to play next.
    pub fn current_module(&self) -> Option<TrainingType> {
        if self.progress.completed {
            return None;
        }
        self.modules.get(self.progress.completed_modules.len()).copied()
    }

    pub fn total_estimated_minutes(&self) -> u32 {
        self.modules.iter().map(|m| m.estimated_minutes()).sum()
    }

    /// Stamp the start time once.
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.progress.start_time.get_or_insert(now);
    }

    /// Record `score` for the current module and advance.
    pub fn complete_module<R: Rng>(&mut self, score: u32, now: DateTime<Utc>, rng: &mut R) -> ChallengeStep {
        let Some(module) = self.current_module() else {
            return ChallengeStep::AlreadyCompleted;
        };
        self.progress.completed_modules.push(module);
        self.progress.scores.insert(module, score);
        self.progress.total_score = self.progress.scores.values().sum();

        if let Some(next) = self.current_module() {
            return ChallengeStep::Next(next);
        }

        self.progress.completed = true;
        self.progress.end_time = Some(now);
        info!(date = %self.progress.date, total = self.progress.total_score, "daily challenge completed");
        let drafts = self
            .modules
            .iter()
            .map(|m| RecordDraft {
                training_type: *m,
                score: self.progress.scores.get(m).copied().unwrap_or(0),
                accuracy: rng.gen_range(80.0..100.0),
                duration: m.estimated_minutes() * 60,
                difficulty: CHALLENGE_DIFFICULTY,
            })
            .collect();
        ChallengeStep::Completed(drafts)
    }

    /// Start today over (testing aid).
    pub fn reset(&mut self) {
        self.progress = ChallengeProgress::fresh(self.progress.date);
    }
}

// ---------------------------------------------------------------------------
// Completion history
// ---------------------------------------------------------------------------

/// Dates on which the challenge was completed, stored as `"YYYY-MM-DD"` strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChallengeHistory {
    dates: BTreeSet<NaiveDate>,
}

impl ChallengeHistory {
    pub fn load<B: StorageBackend + ?Sized>(backend: &B) -> Self {
        match backend.read(HISTORY_KEY) {
            Ok(Some(payload)) => serde_json::from_str(&payload).unwrap_or_else(|err| {
                warn!(error = %err, "unreadable challenge history, starting empty");
                ChallengeHistory::default()
            }),
            Ok(None) => ChallengeHistory::default(),
            Err(err) => {
                warn!(error = %err, "failed to read challenge history");
                ChallengeHistory::default()
            }
        }
    }

    pub fn save<B: StorageBackend + ?Sized>(&self, backend: &mut B) -> StoreResult<()> {
        let payload = serde_json::to_string(self)?;
        backend.write(HISTORY_KEY, &payload)
    }

    /// Returns `true` if the date was new.
    pub fn record(&mut self, date: NaiveDate) -> bool {
        self.dates.insert(date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn streak(&self) -> u32 {
        self.streak_on(local_day(Utc::now()))
    }

    /// Consecutive completed days ending at `today`; an unfinished today does
    /// not break a run that ended yesterday.
    pub fn streak_on(&self, today: NaiveDate) -> u32 {
        let mut streak = 0;
        for back in 0..STREAK_HORIZON_DAYS {
            let day = today - Duration::days(back);
            if self.dates.contains(&day) {
                streak += 1;
            } else if back > 0 {
                break;
            }
        }
        streak
    }
}
