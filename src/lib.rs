//! # brain_drill
//!
//! An offline cognitive-training engine: seven training games, an adaptive
//! recommender that decides what to train next and how hard, and a persisted
//! record store with streaks, levels, and achievements.
//!
//! ## How it works
//!
//! 1. Open a [`TrainingStore`] over a [`StorageBackend`] (in-memory or
//!    file-backed). Missing or corrupt data falls back to defaults.
//! 2. Ask the store's [`AdaptiveEngine`] for recommendations, a suggested
//!    difficulty, or a daily plan.
//! 3. Drive a game (e.g. [`games::SchulteGame`]) by feeding it events. When
//!    it returns [`Step::Finished`], hand the [`GameOutcome`] to
//!    [`TrainingStore::complete_session`].
//!
//! ## Key features
//!
//! - **Deterministic**: every game and the assessment accept
//!   `rng_seed: Option<u64>`; `Some(seed)` reproduces the same boards.
//! - **Total engine**: recommendation and analysis never fail; empty history
//!   means neutral defaults.
//! - **Daily challenge**: three modules per day, the same for every user,
//!   drawn from a date-seeded generator.
//!
//! ## Quick start
//!
//! ```rust
//! use brain_drill::{
//!     games::{schulte::{SchulteConfig, SchulteEvent}, SchulteGame},
//!     MemoryBackend, Step, StoreConfig, TrainingGame, TrainingStore,
//! };
//!
//! let mut store = TrainingStore::open(StoreConfig::default(), MemoryBackend::new());
//! let recommendations = store.engine().training_recommendations();
//! let next = &recommendations[0];
//! println!("Try {} at difficulty {}: {}", next.name, next.suggested_difficulty, next.reason);
//!
//! let mut game = SchulteGame::new(SchulteConfig::default(), Some(7));
//! game.handle(SchulteEvent::Start { at: 0 }).unwrap();
//! let mut step = Step::Continue;
//! let mut at = 0;
//! while let Some(target) = game.current_target().map(str::to_owned) {
//!     let cell = game.grid().iter().position(|c| *c == target).unwrap();
//!     at += 1_000;
//!     step = game.handle(SchulteEvent::Tap { cell, at }).unwrap();
//! }
//! if let Step::Finished(outcome) = step {
//!     let record = store.complete_session(outcome);
//!     println!("Scored {}", record.score);
//! }
//! ```

pub mod dashboard;
pub mod training_engine;

// Convenience re-exports so callers can use `brain_drill::TrainingStore`
// directly without reaching into `training_engine::`.
pub use training_engine::{
    assessment, challenge, games, plans, Ability, AbilityScores, AdaptiveEngine, Assessment,
    DailyChallenge, DifficultyLevel, FileBackend, GameError, GameOutcome, MemoryBackend,
    PlanProgress, RecordDraft, StorageBackend, Step, StoreConfig, TrainingGame, TrainingRecord,
    TrainingStore, TrainingType, UserData,
};

#[cfg(test)]
mod tests;
