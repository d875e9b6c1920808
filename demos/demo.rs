//! End-to-end walk through one training day.
//!
//! Run with: `cargo run --example demo`
//!
//! 1. **Recommendations**: a fresh profile asks the adaptive engine what to
//!    train and how hard.
//! 2. **Games**: a Schulte table and a Stroop run are played by a scripted
//!    "player" with fixed seeds, so the output is reproducible.
//! 3. **Store**: each finished game is handed to the store, which updates
//!    streaks, experience, abilities, and achievements.
//! 4. **Daily challenge, plans, dashboard**: today's lineup, the first day of
//!    a plan, and the dashboard view-model as JSON.
//!
//! Set `BRAIN_DRILL_DATA_DIR` to persist the profile to disk between runs;
//! otherwise everything stays in memory.

use brain_drill::{
    challenge::{ChallengeHistory, DailyChallenge},
    dashboard,
    games::{
        schulte::{GridSize, SchulteConfig, SchulteEvent},
        stroop::{StroopConfig, StroopEvent},
        SchulteGame, StroopGame,
    },
    DifficultyLevel, FileBackend, GameOutcome, MemoryBackend, PlanProgress, StorageBackend, Step,
    StoreConfig, TrainingGame, TrainingStore,
};

/// Clear the grid in order, one second per tap.
fn play_schulte(seed: u64) -> Option<GameOutcome> {
    let config = SchulteConfig { grid_size: GridSize::Four, ..SchulteConfig::default() };
    let mut game = SchulteGame::new(config, Some(seed));
    game.handle(SchulteEvent::Start { at: 0 }).ok()?;
    let mut at = 0;
    let mut step = Step::Continue;
    while let Some(target) = game.current_target().map(str::to_owned) {
        let cell = game.grid().iter().position(|c| *c == target)?;
        at += 1_000;
        step = game.handle(SchulteEvent::Tap { cell, at }).ok()?;
    }
    step.outcome()
}

/// Answer every word correctly in 700 ms.
fn play_stroop(seed: u64) -> Option<GameOutcome> {
    let config = StroopConfig { difficulty: DifficultyLevel::Medium, ..StroopConfig::default() };
    let mut game = StroopGame::new(config, Some(seed));
    game.handle(StroopEvent::Start { at: 0 }).ok()?;
    let mut at = 0;
    let mut step = Step::Continue;
    while let Some(word) = game.current_word() {
        at += 700;
        step = game.handle(StroopEvent::Answer { color: word.ink, at }).ok()?;
    }
    step.outcome()
}

fn run<B: StorageBackend>(mut store: TrainingStore<B>) {
    // ── Recommendations ──────────────────────────────────────────────────────
    println!();
    println!("══ What to train next ══");
    println!();
    for rec in store.engine().training_recommendations().iter().take(3) {
        println!("  {:<30} {}  priority {:>5.1}  {}",
            rec.name, rec.suggested_difficulty, rec.priority, rec.reason);
    }

    // ── Play ─────────────────────────────────────────────────────────────────
    println!();
    println!("══ Sessions ══");
    println!();
    for outcome in [play_schulte(7), play_stroop(11)].into_iter().flatten() {
        let record = store.complete_session(outcome);
        println!("  {:<30} score {:>3}  accuracy {:>5.1}  {}s",
            record.training_type, record.score, record.accuracy, record.duration);
    }
    let data = store.data();
    println!();
    println!("  Level {} ({} xp), streak {}, {} of {} minutes today",
        data.level, data.experience, data.current_streak, data.daily_progress, data.daily_goal);
    for ach in data.achievements.iter().filter(|a| a.is_unlocked()) {
        println!("  {} {}  [{:?}]", ach.icon, ach.name, ach.rarity());
    }

    // ── Daily challenge ──────────────────────────────────────────────────────
    println!();
    println!("══ Daily challenge ══");
    println!();
    let challenge = DailyChallenge::load(store.backend());
    let lineup: Vec<String> = challenge.modules().iter().map(|m| m.to_string()).collect();
    println!("  {}  ({} min)", lineup.join(" → "), challenge.total_estimated_minutes());
    println!("  Challenge streak: {}", ChallengeHistory::load(store.backend()).streak());

    // ── Plans ────────────────────────────────────────────────────────────────
    println!();
    println!("══ Training plan ══");
    println!();
    let mut plans = PlanProgress::load(store.backend());
    if plans.active_plan().is_none() {
        if let Err(err) = plans.start_plan("focus-21") {
            println!("  {err}");
        }
    }
    if let Some(today) = plans.today() {
        println!("  {}: day {} of {}, {}", today.plan.name, today.day, today.plan.duration, today.content.title);
        for session in today.content.sessions {
            println!("    - {} ({} min)", session.label, session.minutes);
        }
        println!("  Tip: {}", today.content.tip);
    }
    if let Err(err) = plans.save(store.backend_mut()) {
        println!("  could not save plan progress: {err}");
    }

    // ── Dashboard ────────────────────────────────────────────────────────────
    println!();
    println!("══ Dashboard ══");
    println!();
    let view = dashboard::dashboard(store.data());
    match serde_json::to_string_pretty(&view["weekly"]) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("  {err}"),
    }
    println!("  Level progress: {}%", view["levelProgress"]);
}

fn main() {
    let config = StoreConfig::from_env();
    match config.data_dir.clone() {
        Some(dir) => {
            println!("Using profile in {}", dir.display());
            run(TrainingStore::open(config, FileBackend::new(dir)));
        }
        None => run(TrainingStore::open(config, MemoryBackend::new())),
    }
}
