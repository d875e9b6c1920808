//! Core training engine: adaptive recommendations, the record store, and the
//! training games that feed it.
//!
//! ## Module overview
//!
//! | Module         | Purpose |
//! |----------------|---------|
//! | `models`       | Shared types: training modules, ability axes, records, recommendations |
//! | `bands`        | Threshold tables for difficulty, trend, gains, advice, and rarity |
//! | `adaptive`     | `AdaptiveEngine`: difficulty, priorities, ability analysis, daily plan, stats |
//! | `store`        | `UserData` snapshot and the persisting `TrainingStore` facade |
//! | `persistence`  | Storage backends, schema reconciliation, load/save |
//! | `config`       | `StoreConfig` with environment overrides |
//! | `achievements` | Fixed achievement table, categories, summary |
//! | `games`        | Seven event-driven training games behind the `TrainingGame` trait |
//! | `assessment`   | Four-test initial assessment producing ability scores |
//! | `challenge`    | Date-seeded daily challenge and its completion history |
//! | `plans`        | Static multi-day training plans and plan progress |
//! | `helpers`      | RNG construction, shuffling, timing, and score rounding |
//! | `error`        | `StoreError`, `GameError`, `PlanError` |

pub mod achievements;
pub mod adaptive;
pub mod assessment;
pub mod bands;
pub mod challenge;
pub mod config;
pub mod error;
pub mod games;
pub mod helpers;
pub mod models;
pub mod persistence;
pub mod plans;
pub mod store;

// Re-export the public API surface so callers can use
// `training_engine::TrainingStore` without reaching into sub-modules.
pub use achievements::{Achievement, AchievementCategory, AchievementId, AchievementSummary};
pub use adaptive::AdaptiveEngine;
pub use assessment::{Assessment, AssessmentEvent, AssessmentResults, AssessmentStep, AssessmentTest};
pub use challenge::{ChallengeHistory, ChallengeProgress, ChallengeStep, DailyChallenge};
pub use config::StoreConfig;
pub use error::{GameError, PlanError, StoreError};
pub use games::{
    AbilityNudge, AchievementSignal, DifficultyLevel, GameOutcome, GamePhase, Step, TrainingGame,
};
pub use models::{
    Ability, AbilityAnalysis, AbilityScores, DailyPlan, DifficultyTier, RecordDraft,
    TrainingRecommendation, TrainingRecord, TrainingStats, TrainingType, Trend,
};
pub use persistence::{FileBackend, MemoryBackend, StorageBackend};
pub use plans::{PlanProgress, TrainingPlan, PLANS};
pub use store::{TrainingStore, UserData};
