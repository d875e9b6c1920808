//! The seven training games as explicit state machines.
//!
//! Every game implements [`TrainingGame`]: the presenter feeds typed events
//! (each carrying a millisecond stamp where timing matters) and gets back
//! [`Step::Continue`] or, exactly once, [`Step::Finished`] with a
//! [`GameOutcome`] ready for the store.
//!
//! | Module     | Game | Ability |
//! |------------|------|---------|
//! | `schulte`  | Ordered visual search on a shuffled grid | attention |
//! | `stroop`   | Name the ink colour, not the word | inhibition |
//! | `sequence` | Show-then-recall item sequences that grow | memory |
//! | `auditory` | Spoken digit spans | attention |
//! | `mirror`   | Two-handed mirrored path tracing | coordination |
//! | `logic`    | Card sorting under a hidden, shifting rule | logic |
//! | `scene`    | Memorize, narrate, recall | memory, creativity |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::training_engine::{
    achievements::AchievementId,
    bands,
    error::{GameError, GameKind},
    models::{Ability, RecordDraft, TrainingType},
};

pub mod auditory;
pub mod logic;
pub mod mirror;
pub mod scene;
pub mod schulte;
pub mod sequence;
pub mod stroop;

pub use auditory::AuditoryGame;
pub use logic::LogicGame;
pub use mirror::MirrorGame;
pub use scene::SceneGame;
pub use schulte::SchulteGame;
pub use sequence::SequenceGame;
pub use stroop::StroopGame;

/// Coarse phase shared by all games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GamePhase {
    Idle,
    /// Stimuli are being shown or played; no answers accepted yet.
    Presenting,
    Playing,
    Recalling,
    Finished,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GamePhase::Idle       => write!(f, "idle"),
            GamePhase::Presenting => write!(f, "presenting"),
            GamePhase::Playing    => write!(f, "playing"),
            GamePhase::Recalling  => write!(f, "recalling"),
            GamePhase::Finished   => write!(f, "finished"),
        }
    }
}

/// Three-level setting used by most games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DifficultyLevel {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl DifficultyLevel {
    /// Value recorded in `TrainingRecord::difficulty`.
    pub fn tier(self) -> u32 {
        match self {
            DifficultyLevel::Easy   => 1,
            DifficultyLevel::Medium => 2,
            DifficultyLevel::Hard   => 3,
        }
    }

    /// Pick the per-level value.
    pub fn pick<T>(self, easy: T, medium: T, hard: T) -> T {
        match self {
            DifficultyLevel::Easy   => easy,
            DifficultyLevel::Medium => medium,
            DifficultyLevel::Hard   => hard,
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifficultyLevel::Easy   => write!(f, "Easy"),
            DifficultyLevel::Medium => write!(f, "Medium"),
            DifficultyLevel::Hard   => write!(f, "Hard"),
        }
    }
}

/// Points to add to one ability axis; the store caps the result at 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbilityNudge {
    pub ability: Ability,
    pub gain: f64,
}

impl AbilityNudge {
    /// The shared convention: `> 70` → +2, `> 50` → +1, else 0.
    pub fn from_score(ability: Ability, score: u32) -> Self {
        AbilityNudge { ability, gain: bands::ability_gain(score) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AchievementSignal {
    Progress(AchievementId, u32),
    Unlock(AchievementId),
}

/// Everything a finished game hands to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub draft: RecordDraft,
    pub nudges: Vec<AbilityNudge>,
    pub achievements: Vec<AchievementSignal>,
}

impl GameOutcome {
    pub fn score(&self) -> u32 {
        self.draft.score
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Continue,
    Finished(GameOutcome),
}

impl Step {
    pub fn outcome(self) -> Option<GameOutcome> {
        match self {
            Step::Finished(outcome) => Some(outcome),
            Step::Continue => None,
        }
    }
}

pub trait TrainingGame {
    type Event;

    fn training_type(&self) -> TrainingType;

    fn phase(&self) -> GamePhase;

    fn handle(&mut self, event: Self::Event) -> Result<Step, GameError>;
}

/// Rejection for `event` in the game's current phase.
pub(crate) fn invalid<G: TrainingGame + ?Sized>(game: &G, event: &'static str) -> GameError {
    GameError::InvalidEvent {
        game: GameKind::Training(game.training_type()),
        phase: game.phase(),
        event,
    }
}

pub(crate) fn check_index(what: &'static str, index: usize, len: usize) -> Result<(), GameError> {
    if index < len {
        Ok(())
    } else {
        Err(GameError::OutOfRange { what, index, len })
    }
}
