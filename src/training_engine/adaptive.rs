//! Adaptive recommendation engine.
//!
//! Pure reductions over a borrowed snapshot of the training history and the
//! ability vector. Nothing here fails: averages over no data are 50, trends
//! over fewer than three records are stable, and streaks over no data are 0.
//!
//! The store keeps history most-recent-first. Every per-module view the
//! engine builds is re-ordered oldest-first, so "the last N records" are the
//! N most recent attempts.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::training_engine::{
    bands::{self, REVIEW_AFTER_DAYS, WEAK_ABILITY_BELOW},
    models::{
        local_day, Ability, AbilityAnalysis, AbilityScores, DailyPlan, DifficultyTier,
        TrainingRecommendation, TrainingRecord, TrainingStats, TrainingType, Trend,
        NEUTRAL_SCORE,
    },
};

/// Records considered when suggesting a difficulty.
pub const DIFFICULTY_WINDOW: usize = 5;
/// Records considered per module for recency and ability trends.
pub const HISTORY_WINDOW: usize = 10;
/// Flat per-module estimate used by the daily plan, in minutes.
pub const MINUTES_PER_MODULE: u32 = 5;

const MS_PER_DAY: f64 = 86_400_000.0;

// ---------------------------------------------------------------------------
// Free functions over record slices
// ---------------------------------------------------------------------------

/// Mean `score`; exactly 50 for an empty slice.
pub fn average_score(records: &[&TrainingRecord]) -> f64 {
    if records.is_empty() {
        return NEUTRAL_SCORE;
    }
    let sum: f64 = records.iter().map(|r| r.score as f64).sum();
    sum / records.len() as f64
}

/// Compare the older ⌊n/2⌋ records with the recent ⌈n/2⌉. When `n` is odd
/// the middle record belongs to both halves.
pub fn trend(records: &[&TrainingRecord]) -> Trend {
    let n = records.len();
    if n < 3 {
        return Trend::Stable;
    }
    let older = &records[..n / 2];
    let recent = &records[n - n.div_ceil(2)..];
    bands::trend_for_delta(average_score(recent) - average_score(older))
}

/// `records[start..end]` with negative, JavaScript-style offsets from the end.
/// Short inputs yield shorter or empty slices.
fn tail_slice<'r, 'a>(
    records: &'r [&'a TrainingRecord],
    from_end: usize,
    until_end: usize,
) -> &'r [&'a TrainingRecord] {
    let n = records.len();
    let start = n.saturating_sub(from_end);
    let end = n.saturating_sub(until_end);
    &records[start..end.max(start)]
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Read-only view over one snapshot, evaluated at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveEngine<'a> {
    history: &'a [TrainingRecord],
    abilities: &'a AbilityScores,
    level: u32,
    experience: u64,
    now: DateTime<Utc>,
}

impl<'a> AdaptiveEngine<'a> {
    /// `history` must be most-recent-first, as the store keeps it.
    pub fn new(history: &'a [TrainingRecord], abilities: &'a AbilityScores) -> Self {
        AdaptiveEngine {
            history,
            abilities,
            level: 1,
            experience: 0,
            now: Utc::now(),
        }
    }

    /// Evaluate "today" and day counts relative to `now`.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Carry level and experience through to [`TrainingStats`].
    pub fn with_progress(mut self, level: u32, experience: u64) -> Self {
        self.level = level;
        self.experience = experience;
        self
    }

    /// Up to `count` most recent records of one module, oldest first.
    pub fn recent_records(&self, training_type: TrainingType, count: usize) -> Vec<&'a TrainingRecord> {
        let mut records: Vec<&TrainingRecord> = self
            .history
            .iter()
            .filter(|r| r.training_type == training_type)
            .take(count)
            .collect();
        records.reverse();
        records
    }

    pub fn recommend_difficulty(&self, training_type: TrainingType) -> DifficultyTier {
        let records = self.recent_records(training_type, DIFFICULTY_WINDOW);
        let base = bands::base_difficulty(average_score(&records));
        match trend(&records) {
            Trend::Improving => base.harder(),
            Trend::Declining => base.easier(),
            Trend::Stable    => base,
        }
    }

    /// All seven modules, highest priority first.
    pub fn training_recommendations(&self) -> Vec<TrainingRecommendation> {
        self.ranked().into()
    }

    fn ranked(&self) -> [TrainingRecommendation; 7] {
        let mut recs = TrainingType::ALL.map(|t| self.recommendation_for(t));
        recs.sort_by(|a, b| b.priority.total_cmp(&a.priority));
        recs
    }

    fn recommendation_for(&self, training_type: TrainingType) -> TrainingRecommendation {
        let target_ability = training_type.target_ability();
        let ability_score = self.abilities.get(target_ability);
        let last_attempt = self
            .recent_records(training_type, HISTORY_WINDOW)
            .last()
            .map(|r| r.timestamp);

        let mut priority = 50.0 + (100.0 - ability_score) * 0.3;
        let days_since = last_attempt.map(|ts| self.days_since(ts));
        priority += match days_since {
            Some(days) => (days * 5.0).min(20.0),
            None => 25.0,
        };

        let reason = if ability_score < WEAK_ABILITY_BELOW {
            format!("{target_ability} is weak and needs focused training")
        } else {
            match days_since.map(|d| d.floor() as i64) {
                None => "Not tried yet. Give it a go".to_string(),
                Some(days) if days >= REVIEW_AFTER_DAYS => {
                    format!("{days} days since the last session. Time to review")
                }
                Some(_) => "Keep practising to consolidate".to_string(),
            }
        };

        TrainingRecommendation {
            training_type,
            name: training_type.to_string(),
            priority,
            suggested_difficulty: self.recommend_difficulty(training_type),
            reason,
            target_ability,
        }
    }

    fn days_since(&self, ts: DateTime<Utc>) -> f64 {
        (self.now - ts).num_milliseconds() as f64 / MS_PER_DAY
    }

    pub fn analyze_abilities(&self) -> Vec<AbilityAnalysis> {
        Ability::ALL
            .into_iter()
            .map(|ability| {
                let score = self.abilities.get(ability);
                let records: Vec<&TrainingRecord> = ability
                    .training_types()
                    .flat_map(|t| self.recent_records(t, HISTORY_WINDOW))
                    .collect();

                // Short histories compare against the neutral 50 and can swing
                // recent_change by up to ±50.
                let recent = tail_slice(&records, 5, 0);
                let older = tail_slice(&records, 10, 5);
                let recent_change = (average_score(recent) - average_score(older)).round() as i32;

                AbilityAnalysis {
                    ability,
                    name: ability.to_string(),
                    score,
                    trend: trend(&records),
                    recent_change,
                    recommendation: bands::advice_for(score).message().to_string(),
                }
            })
            .collect()
    }

    pub fn daily_plan(&self) -> DailyPlan {
        let [main_training, second, third, ..] = self.ranked();
        let supplementary_trainings = vec![second, third];
        let estimated_duration = MINUTES_PER_MODULE * (1 + supplementary_trainings.len() as u32);
        DailyPlan {
            main_training,
            supplementary_trainings,
            estimated_duration,
        }
    }

    pub fn training_stats(&self) -> TrainingStats {
        let all: Vec<&TrainingRecord> = self.history.iter().collect();
        TrainingStats {
            total_sessions: self.history.len(),
            total_duration: self.history.iter().map(|r| r.duration as u64).sum(),
            average_score: average_score(&all).round(),
            streak: self.streak(),
            level: self.level,
            experience: self.experience,
        }
    }

    /// Consecutive calendar days with training, ending today or yesterday.
    pub fn streak(&self) -> u32 {
        let days: BTreeSet<NaiveDate> = self.history.iter().map(|r| local_day(r.timestamp)).collect();
        let today = local_day(self.now);
        let yesterday = local_day(self.now - Duration::days(1));
        if !days.contains(&today) && !days.contains(&yesterday) {
            return 0;
        }

        let ordered: Vec<NaiveDate> = days.into_iter().collect();
        let mut streak = 1;
        for pair in ordered.windows(2).rev() {
            if (pair[1] - pair[0]).num_days() == 1 {
                streak += 1;
            } else {
                break;
            }
        }
        streak
    }
}
