use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Training modules and ability axes
// ---------------------------------------------------------------------------

/// The seven fixed training modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrainingType {
    Schulte,
    Stroop,
    /// Older daily-challenge payloads stored this module as `"sequence"`.
    #[serde(alias = "sequence")]
    SequenceMemory,
    Auditory,
    Mirror,
    Logic,
    Scene,
}

impl TrainingType {
    /// Canonical order used for recommendations and daily-challenge draws.
    pub const ALL: [TrainingType; 7] = [
        TrainingType::Schulte,
        TrainingType::Stroop,
        TrainingType::SequenceMemory,
        TrainingType::Auditory,
        TrainingType::Mirror,
        TrainingType::Logic,
        TrainingType::Scene,
    ];

    /// The ability axis this module trains. Many-to-one: two modules feed
    /// `Memory` and two feed `Attention`.
    pub fn target_ability(self) -> Ability {
        match self {
            TrainingType::Schulte        => Ability::Attention,
            TrainingType::Stroop         => Ability::Inhibition,
            TrainingType::SequenceMemory => Ability::Memory,
            TrainingType::Auditory       => Ability::Attention,
            TrainingType::Mirror         => Ability::Coordination,
            TrainingType::Logic          => Ability::Logic,
            TrainingType::Scene          => Ability::Memory,
        }
    }

    /// Wire tag, identical to the serde representation.
    pub fn tag(self) -> &'static str {
        match self {
            TrainingType::Schulte        => "schulte",
            TrainingType::Stroop         => "stroop",
            TrainingType::SequenceMemory => "sequence-memory",
            TrainingType::Auditory       => "auditory",
            TrainingType::Mirror         => "mirror",
            TrainingType::Logic          => "logic",
            TrainingType::Scene          => "scene",
        }
    }

    /// Rough minutes one session takes; used by the daily challenge.
    pub fn estimated_minutes(self) -> u32 {
        match self {
            TrainingType::Schulte        => 3,
            TrainingType::Stroop         => 2,
            TrainingType::SequenceMemory => 4,
            TrainingType::Auditory       => 3,
            TrainingType::Mirror         => 3,
            TrainingType::Logic          => 4,
            TrainingType::Scene          => 5,
        }
    }
}

impl fmt::Display for TrainingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrainingType::Schulte        => "Schulte Table",
            TrainingType::Stroop         => "Stroop Inhibition",
            TrainingType::SequenceMemory => "Sequence Working Memory",
            TrainingType::Auditory       => "Auditory Selective Attention",
            TrainingType::Mirror         => "Bimanual Mirror Coordination",
            TrainingType::Logic          => "Rule-Based Classification",
            TrainingType::Scene          => "Scene Association Memory",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Ability {
    Attention,
    Memory,
    Reaction,
    Logic,
    Coordination,
    Inhibition,
    Creativity,
}

impl Ability {
    pub const ALL: [Ability; 7] = [
        Ability::Attention,
        Ability::Memory,
        Ability::Reaction,
        Ability::Logic,
        Ability::Coordination,
        Ability::Inhibition,
        Ability::Creativity,
    ];

    /// Training modules that feed this axis, in canonical module order.
    pub fn training_types(self) -> impl Iterator<Item = TrainingType> {
        TrainingType::ALL
            .into_iter()
            .filter(move |t| t.target_ability() == self)
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Ability::Attention    => "Attention",
            Ability::Memory       => "Memory",
            Ability::Reaction     => "Reaction Speed",
            Ability::Logic        => "Logical Reasoning",
            Ability::Coordination => "Coordination",
            Ability::Inhibition   => "Inhibitory Control",
            Ability::Creativity   => "Creativity",
        };
        write!(f, "{}", s)
    }
}

// ---------------------------------------------------------------------------
// Ability score vector
// ---------------------------------------------------------------------------

/// Neutral value for every axis, and for averages over no data.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Clamp an ability value into `[0, 100]`. NaN collapses to 0.
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityScores {
    pub attention: f64,
    pub memory: f64,
    pub reaction: f64,
    pub logic: f64,
    pub coordination: f64,
    pub inhibition: f64,
    pub creativity: f64,
}

impl Default for AbilityScores {
    fn default() -> Self {
        AbilityScores {
            attention: NEUTRAL_SCORE,
            memory: NEUTRAL_SCORE,
            reaction: NEUTRAL_SCORE,
            logic: NEUTRAL_SCORE,
            coordination: NEUTRAL_SCORE,
            inhibition: NEUTRAL_SCORE,
            creativity: NEUTRAL_SCORE,
        }
    }
}

impl AbilityScores {
    pub fn get(&self, ability: Ability) -> f64 {
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

    /// Set one axis; the value is clamped, never rejected.
    pub fn set(&mut self, ability: Ability, value: f64) {
        let slot = match ability {
            Ability::Attention    => &mut self.attention,
            Ability::Memory       => &mut self.memory,
            Ability::Reaction     => &mut self.reaction,
            Ability::Logic        => &mut self.logic,
            Ability::Coordination => &mut self.coordination,
            Ability::Inhibition   => &mut self.inhibition,
            Ability::Creativity   => &mut self.creativity,
        };
        *slot = clamp_score(value);
    }

    /// Merge a partial update. Axes not named keep their value.
    pub fn merge<I>(&mut self, updates: I)
    where
        I: IntoIterator<Item = (Ability, f64)>,
    {
        for (ability, value) in updates {
            self.set(ability, value);
        }
    }
}

// ---------------------------------------------------------------------------
// Training records
// ---------------------------------------------------------------------------

/// One completed attempt. Immutable once created by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRecord {
    pub id: String,
    pub training_type: TrainingType,
    /// 0..=100; games clamp before handing the draft over.
    pub score: u32,
    pub accuracy: f64,
    /// Seconds spent in the attempt.
    pub duration: u32,
    pub difficulty: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// A record before the store assigns `id` and `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDraft {
    pub training_type: TrainingType,
    pub score: u32,
    pub accuracy: f64,
    pub duration: u32,
    pub difficulty: u32,
}

impl RecordDraft {
    /// `floor(score × accuracy / 100 × (1 + difficulty × 0.1))`, never negative.
    pub fn experience(&self) -> u64 {
        let raw = self.score as f64 * self.accuracy / 100.0 * (1.0 + self.difficulty as f64 * 0.1);
        if raw.is_finite() && raw > 0.0 {
            raw.floor() as u64
        } else {
            0
        }
    }
}

// ---------------------------------------------------------------------------
// Engine outputs
// ---------------------------------------------------------------------------

/// Suggested difficulty, always within `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DifficultyTier(u8);

impl DifficultyTier {
    pub const MIN: DifficultyTier = DifficultyTier(1);
    pub const MAX: DifficultyTier = DifficultyTier(5);

    /// Build a tier, saturating at the bounds.
    pub fn new(level: u8) -> Self {
        DifficultyTier(level.clamp(Self::MIN.0, Self::MAX.0))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn harder(self) -> Self {
        DifficultyTier::new(self.0.saturating_add(1))
    }

    pub fn easier(self) -> Self {
        DifficultyTier::new(self.0.saturating_sub(1))
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lv.{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Trend {
    Improving,
    Stable,
    Declining,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Improving => write!(f, "improving"),
            Trend::Stable    => write!(f, "stable"),
            Trend::Declining => write!(f, "declining"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRecommendation {
    pub training_type: TrainingType,
    pub name: String,
    /// Ordering key only; not a meaningful unit.
    pub priority: f64,
    pub suggested_difficulty: DifficultyTier,
    pub reason: String,
    pub target_ability: Ability,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityAnalysis {
    pub ability: Ability,
    pub name: String,
    pub score: f64,
    pub trend: Trend,
    pub recent_change: i32,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPlan {
    pub main_training: TrainingRecommendation,
    pub supplementary_trainings: Vec<TrainingRecommendation>,
    /// Minutes; a flat estimate per selected module.
    pub estimated_duration: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingStats {
    pub total_sessions: usize,
    /// Seconds.
    pub total_duration: u64,
    pub average_score: f64,
    pub streak: u32,
    pub level: u32,
    pub experience: u64,
}

// ---------------------------------------------------------------------------
// Calendar helpers shared by the store and the engine
// ---------------------------------------------------------------------------

/// Calendar day of a timestamp in the local time zone.
pub fn local_day(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&chrono::Local).date_naive()
}
