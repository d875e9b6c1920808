//! Unit tests for the `brain_drill` crate.
//!
//! Included from `lib.rs` under `#[cfg(test)]`.
//!
//! # Coverage
//!
//! | Group | What is tested |
//! |-------|----------------|
//! | Averages and tiers | Neutral average; flat-low and rising-high histories map to tiers 1 and 5 |
//! | Recommendations | Seven entries, sorted, positive priority; weak-axis, review, and untried reasons |
//! | Analysis | Seven axes; short-history comparison against the neutral 50 |
//! | Stats | Totals and the engine streak stopping at a two-day gap |
//! | Daily plan | Top three modules, flat five minutes each |
//! | Store | History cap evicts the oldest; streaks; reset; persistence round trip |
//! | Persistence | Corrupt payloads fall back to defaults; file backend on a temp dir |
//! | Games | Same seed → same boards; a full Stroop run lands in the store |
//! | Assessment | Completed results flow into ability scores |
//! | Daily challenge | Completion drafts land in the store and the challenge history |
//! | Properties | Ability updates always clamp into `[0, 100]` |

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use crate::{
    challenge::{ChallengeHistory, ChallengeStep, DailyChallenge},
    games::{
        logic::{LogicConfig, LogicEvent},
        schulte::{SchulteConfig, SchulteEvent},
        sequence::{SequenceConfig, SequenceEvent},
        stroop::{StroopConfig, StroopEvent},
        LogicGame, SchulteGame, SequenceGame, StroopGame,
    },
    training_engine::{
        adaptive::average_score,
        assessment::{AssessmentEvent, AssessmentStep, AssessmentTest, LOGIC_QUESTIONS},
        helpers::make_rng,
        models::{local_day, DifficultyTier, Trend},
        persistence::{load_user_data, save_user_data},
    },
    Ability, AbilityScores, AdaptiveEngine, Assessment, FileBackend, MemoryBackend, RecordDraft,
    StorageBackend, Step, StoreConfig, TrainingGame, TrainingRecord, TrainingStore, TrainingType,
    UserData,
};

// ── helpers ──────────────────────────────────────────────────────────────────

fn draft(training_type: TrainingType, score: u32) -> RecordDraft {
    RecordDraft { training_type, score, accuracy: score as f64, duration: 120, difficulty: 2 }
}

/// Append `scores` oldest-first, one hour apart, ending at `end`.
fn history_of(training_type: TrainingType, scores: &[u32], end: DateTime<Utc>) -> UserData {
    let mut data = UserData::default();
    let n = scores.len() as i64;
    for (i, score) in scores.iter().enumerate() {
        let at = end - Duration::hours(n - 1 - i as i64);
        data.add_training_record(draft(training_type, *score), at, 500);
    }
    data
}

/// `Utc::now()` truncated to what the stored JSON keeps.
fn now_ms() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(Utc::now().timestamp_millis()).unwrap()
}

fn memory_store() -> TrainingStore<MemoryBackend> {
    TrainingStore::open(StoreConfig::default(), MemoryBackend::new())
}

// ── averages and difficulty tiers ────────────────────────────────────────────

#[test]
fn average_of_no_records_is_neutral() {
    assert_eq!(average_score(&[]), 50.0);
    let data = history_of(TrainingType::Logic, &[80, 60], Utc::now());
    let refs: Vec<&TrainingRecord> = data.training_history.iter().collect();
    assert_eq!(average_score(&refs), 70.0);
}

#[test]
fn untried_module_gets_tier_two() {
    let data = UserData::default();
    let engine = data.engine_at(Utc::now());
    // average 50 → tier 2, stable
    assert_eq!(engine.recommend_difficulty(TrainingType::Mirror), DifficultyTier::new(2));
}

#[test]
fn flat_low_scores_stay_at_tier_one() {
    let now = Utc::now();
    let data = history_of(TrainingType::Schulte, &[30, 30, 30, 30, 30], now);
    assert_eq!(data.engine_at(now).recommend_difficulty(TrainingType::Schulte), DifficultyTier::MIN);
}

#[test]
fn rising_high_scores_reach_tier_five() {
    let now = Utc::now();
    let data = history_of(TrainingType::Stroop, &[90, 92, 94, 96, 98], now);
    let engine = data.engine_at(now);
    assert_eq!(engine.recommend_difficulty(TrainingType::Stroop), DifficultyTier::MAX);
    // other modules are unaffected
    assert_eq!(engine.recommend_difficulty(TrainingType::Logic), DifficultyTier::new(2));
}

#[test]
fn declining_scores_step_down() {
    let now = Utc::now();
    let data = history_of(TrainingType::Logic, &[80, 80, 60, 40, 40], now);
    // average 60 → tier 3, declining → 2
    assert_eq!(data.engine_at(now).recommend_difficulty(TrainingType::Logic), DifficultyTier::new(2));
}

#[test]
fn only_the_last_five_records_count() {
    let now = Utc::now();
    let data = history_of(TrainingType::Scene, &[10, 10, 10, 10, 10, 60, 60, 60, 60, 60], now);
    assert_eq!(data.engine_at(now).recommend_difficulty(TrainingType::Scene), DifficultyTier::new(3));
}

// ── recommendations ──────────────────────────────────────────────────────────

#[test]
fn recommendations_cover_every_module_in_priority_order() {
    let data = UserData::default();
    let recs = data.engine_at(Utc::now()).training_recommendations();
    assert_eq!(recs.len(), 7);
    assert!(recs.iter().all(|r| r.priority > 0.0));
    assert!(recs.windows(2).all(|w| w[0].priority >= w[1].priority));
    for t in TrainingType::ALL {
        assert!(recs.iter().any(|r| r.training_type == t), "missing {t:?}");
    }
}

#[test]
fn weak_axis_is_called_out_and_ranked_first() {
    let mut data = UserData::default();
    data.update_ability_scores([(Ability::Coordination, 20.0)]);
    let recs = data.engine_at(Utc::now()).training_recommendations();
    assert_eq!(recs[0].training_type, TrainingType::Mirror);
    assert!(recs[0].reason.contains("weak"), "reason was {:?}", recs[0].reason);
}

#[test]
fn stale_module_is_due_for_review() {
    let now = Utc::now();
    let mut data = UserData::default();
    data.add_training_record(draft(TrainingType::Logic, 70), now - Duration::days(4), 500);
    data.add_training_record(draft(TrainingType::Schulte, 70), now - Duration::hours(2), 500);
    let recs = data.engine_at(now).training_recommendations();

    let logic = recs.iter().find(|r| r.training_type == TrainingType::Logic).unwrap();
    assert!(logic.reason.starts_with("4 days"), "reason was {:?}", logic.reason);
    let schulte = recs.iter().find(|r| r.training_type == TrainingType::Schulte).unwrap();
    assert!(schulte.reason.contains("consolidate"));
    let stroop = recs.iter().find(|r| r.training_type == TrainingType::Stroop).unwrap();
    assert!(stroop.reason.contains("Not tried"));
    // untried (+25) outranks four days away (+20) at equal ability
    assert!(stroop.priority > logic.priority);
    assert!(logic.priority > schulte.priority);
}

#[test]
fn daily_plan_takes_the_top_three() {
    let now = Utc::now();
    let data = history_of(TrainingType::Schulte, &[70], now);
    let engine = data.engine_at(now);
    let recs = engine.training_recommendations();
    let plan = engine.daily_plan();
    assert_eq!(plan.main_training, recs[0]);
    assert_eq!(plan.supplementary_trainings, recs[1..3].to_vec());
    assert_eq!(plan.estimated_duration, 15);
}

// ── ability analysis ─────────────────────────────────────────────────────────

#[test]
fn analysis_covers_all_axes_with_advice() {
    let data = UserData::default();
    let analysis = data.engine_at(Utc::now()).analyze_abilities();
    assert_eq!(analysis.len(), 7);
    assert!(analysis.iter().all(|a| a.score == 50.0 && a.trend == Trend::Stable));
    assert!(analysis.iter().all(|a| a.recent_change == 0 && !a.recommendation.is_empty()));
}

#[test]
fn short_history_compares_against_neutral() {
    let now = Utc::now();
    let data = history_of(TrainingType::Logic, &[90, 90], now);
    let analysis = data.engine_at(now).analyze_abilities();
    let logic = analysis.iter().find(|a| a.ability == Ability::Logic).unwrap();
    // recent average 90 against an empty older window (50)
    assert_eq!(logic.recent_change, 40);
    assert_eq!(logic.trend, Trend::Stable);
}

#[test]
fn stats_and_streak_follow_history() {
    let now = Utc::now();
    let mut data = UserData::default();
    data.add_training_record(draft(TrainingType::Stroop, 60), now - Duration::days(1), 500);
    data.add_training_record(draft(TrainingType::Stroop, 80), now, 500);
    let stats = data.engine_at(now).training_stats();
    assert_eq!(stats.total_sessions, 2);
    assert_eq!(stats.total_duration, 240);
    assert_eq!(stats.average_score, 70.0);
    assert_eq!(stats.streak, 2);
    assert_eq!(stats.level, data.level);

    let abilities = AbilityScores::default();
    assert_eq!(AdaptiveEngine::new(&[], &abilities).streak(), 0);
}

/// Engine streak over records on the given day offsets (0 = today, 1 = yesterday).
fn streak_for(days_ago: &[i64]) -> u32 {
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
    let mut data = UserData::default();
    for days in days_ago.iter().rev() {
        data.add_training_record(draft(TrainingType::Logic, 70), now - Duration::days(*days), 500);
    }
    data.engine_at(now).training_stats().streak
}

#[test]
fn streak_stops_at_a_gap() {
    assert_eq!(streak_for(&[0, 1, 3]), 2);
    assert_eq!(streak_for(&[1, 2]), 2);
    assert_eq!(streak_for(&[2]), 0);
}

// ── store ────────────────────────────────────────────────────────────────────

#[test]
fn history_cap_evicts_the_oldest() {
    let mut store = memory_store();
    let start = Utc::now() - Duration::days(1);
    let first = store.add_training_record_at(draft(TrainingType::Logic, 1), start);
    for i in 1..=500 {
        store.add_training_record_at(draft(TrainingType::Logic, 50), start + Duration::seconds(i));
    }
    let history = &store.data().training_history;
    assert_eq!(history.len(), 500);
    assert!(history.iter().all(|r| r.id != first.id));
    assert_eq!(store.data().total_sessions, 501);
}

#[test]
fn store_round_trips_through_its_backend() {
    let mut store = memory_store();
    store.add_training_record_at(draft(TrainingType::Scene, 85), now_ms());
    store.update_ability_scores([(Ability::Memory, 64.0), (Ability::Logic, 140.0)]);
    store.set_daily_goal(25);

    let reopened = TrainingStore::open(StoreConfig::default(), store.backend().clone());
    assert_eq!(reopened.data(), store.data());
    assert_eq!(reopened.data().ability_scores.logic, 100.0);
    assert_eq!(reopened.data().daily_goal, 25);
    assert!(reopened.data().achievements[0].is_unlocked());
}

#[test]
fn history_queries_filter_by_module_and_age() {
    let now = Utc::now();
    let mut data = UserData::default();
    data.add_training_record(draft(TrainingType::Logic, 40), now - Duration::days(10), 500);
    data.add_training_record(draft(TrainingType::Scene, 50), now - Duration::days(2), 500);
    data.add_training_record(draft(TrainingType::Logic, 60), now, 500);

    let logic: Vec<u32> = data.training_history(Some(TrainingType::Logic)).iter().map(|r| r.score).collect();
    assert_eq!(logic, vec![60, 40]);
    assert_eq!(data.training_history(None).len(), 3);
    assert_eq!(data.recent_training_data(7, now).len(), 2);
    assert_eq!(data.recent_training_data(30, now).len(), 3);
}

#[test]
fn reset_clears_the_stored_payload() {
    let mut store = memory_store();
    store.add_training_record(draft(TrainingType::Scene, 85));
    store.reset();
    assert_eq!(store.data(), &UserData::default());
    let key = store.config().storage_key.clone();
    assert_eq!(store.backend().read(&key).unwrap(), None);
}

#[test]
fn corrupt_payload_loads_defaults() {
    let config = StoreConfig::default();
    let mut backend = MemoryBackend::new();
    backend.write(&config.storage_key, "{not json").unwrap();
    assert_eq!(load_user_data(&backend, &config), UserData::default());
}

#[test]
fn file_backend_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig { data_dir: Some(dir.path().to_path_buf()), ..StoreConfig::default() };

    let mut data = UserData::default();
    data.add_training_record(draft(TrainingType::Auditory, 77), now_ms(), 500);
    let mut backend = FileBackend::from_config(&config);
    save_user_data(&mut backend, &config, &data).unwrap();

    let loaded = load_user_data(&FileBackend::from_config(&config), &config);
    assert_eq!(loaded, data);
    assert!(dir.path().join(format!("{}.json", config.storage_key)).exists());
}

// ── games ────────────────────────────────────────────────────────────────────

#[test]
fn same_seed_deals_the_same_boards() {
    let mut a = SchulteGame::new(SchulteConfig::default(), Some(99));
    let mut b = SchulteGame::new(SchulteConfig::default(), Some(99));
    a.handle(SchulteEvent::Start { at: 0 }).unwrap();
    b.handle(SchulteEvent::Start { at: 0 }).unwrap();
    assert_eq!(a.grid(), b.grid());

    let mut a = SequenceGame::new(SequenceConfig::default(), Some(5));
    let mut b = SequenceGame::new(SequenceConfig::default(), Some(5));
    a.handle(SequenceEvent::Start { at: 0 }).unwrap();
    b.handle(SequenceEvent::Start { at: 0 }).unwrap();
    assert_eq!(a.sequence(), b.sequence());

    let mut a = LogicGame::new(LogicConfig::default(), Some(11));
    let mut b = LogicGame::new(LogicConfig::default(), Some(11));
    a.handle(LogicEvent::Start { at: 0 }).unwrap();
    b.handle(LogicEvent::Start { at: 0 }).unwrap();
    assert_eq!(a.current_card(), b.current_card());
}

#[test]
fn a_full_stroop_run_lands_in_the_store() {
    let mut store = memory_store();
    let mut game = StroopGame::new(StroopConfig::default(), Some(21));
    game.handle(StroopEvent::Start { at: 0 }).unwrap();

    let mut at = 0;
    let mut step = Step::Continue;
    while let Some(word) = game.current_word() {
        at += 500;
        step = game.handle(StroopEvent::Answer { color: word.ink, at }).unwrap();
    }
    let outcome = step.outcome().unwrap();
    // 45 points a round out of 50
    assert_eq!(outcome.score(), 90);
    assert_eq!(outcome.draft.duration, 10);

    let record = store.complete_session(outcome);
    assert_eq!(record.training_type, TrainingType::Stroop);
    assert_eq!(store.data().ability_scores.inhibition, 52.0);
    assert_eq!(store.data().training_history[0].id, record.id);
}

#[test]
fn events_out_of_order_are_rejected() {
    let mut game = StroopGame::new(StroopConfig::default(), Some(1));
    let err = game.handle(StroopEvent::Timeout { at: 0 }).unwrap_err();
    assert!(err.to_string().contains("timeout"), "{err}");
}

// ── assessment ───────────────────────────────────────────────────────────────

#[test]
fn assessment_results_seed_the_profile() {
    let mut assessment = Assessment::new(Some(4));

    // reaction: ten 300 ms hits → (600 - 300) / 4 = 75
    assessment.handle(AssessmentEvent::Begin).unwrap();
    let mut at = 0;
    let mut step = AssessmentStep::Continue;
    for _ in 0..10 {
        at += 1_000;
        assessment.handle(AssessmentEvent::TargetShown { at }).unwrap();
        step = assessment.handle(AssessmentEvent::TargetHit { at: at + 300 }).unwrap();
    }
    assert_eq!(step, AssessmentStep::TestDone { test: AssessmentTest::Reaction, score: 75 });

    // memory: fail at the first length → 0
    assessment.handle(AssessmentEvent::Begin).unwrap();
    assessment.handle(AssessmentEvent::RevealDone).unwrap();
    assessment.handle(AssessmentEvent::SubmitDigits { answer: "x".into() }).unwrap();

    // attention: no taps
    assessment.handle(AssessmentEvent::Begin).unwrap();
    assessment.handle(AssessmentEvent::TimeUp).unwrap();

    // logic: all correct → 100
    assessment.handle(AssessmentEvent::Begin).unwrap();
    for question in LOGIC_QUESTIONS.iter() {
        step = assessment.handle(AssessmentEvent::Answer { option: question.answer }).unwrap();
    }
    let AssessmentStep::Completed(results) = step else {
        panic!("assessment did not complete: {step:?}");
    };
    assert_eq!((results.reaction, results.memory, results.attention, results.logic), (75, 0, 0, 100));

    let mut store = memory_store();
    store.update_ability_scores(results.ability_updates());
    let scores = &store.data().ability_scores;
    assert_eq!(scores.reaction, 75.0);
    assert_eq!(scores.memory, 0.0);
    assert_eq!(scores.logic, 100.0);
    assert_eq!(scores.coordination, 50.0);
    assert_eq!(scores.creativity, 50.0);
}

// ── daily challenge ──────────────────────────────────────────────────────────

#[test]
fn finished_challenge_feeds_store_and_history() {
    let now = Utc::now();
    let today = local_day(now);
    let mut store = memory_store();
    let mut rng = make_rng(Some(8));

    let mut challenge = DailyChallenge::load_for(store.backend(), today);
    challenge.start(now);
    let mut step = ChallengeStep::AlreadyCompleted;
    for score in [60, 70, 80] {
        step = challenge.complete_module(score, now, &mut rng);
    }
    challenge.save(store.backend_mut()).unwrap();
    let ChallengeStep::Completed(drafts) = step else {
        panic!("challenge not completed: {step:?}");
    };
    for d in drafts {
        store.add_training_record_at(d, now);
    }
    let mut history = ChallengeHistory::load(store.backend());
    history.record(today);
    history.save(store.backend_mut()).unwrap();

    assert_eq!(store.data().total_sessions, 3);
    assert!(DailyChallenge::load_for(store.backend(), today).is_completed());
    assert_eq!(ChallengeHistory::load(store.backend()).streak_on(today), 1);
    // the user-data blob and the challenge keys share the backend
    let reopened = TrainingStore::open(StoreConfig::default(), store.backend().clone());
    assert_eq!(reopened.data().training_history.len(), 3);
}

// ── properties ───────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn ability_updates_always_clamp(value in prop::num::f64::ANY, axis in 0usize..7) {
        let ability = Ability::ALL[axis];
        let mut data = UserData::default();
        data.update_ability_scores([(ability, value)]);
        let stored = data.ability_scores.get(ability);
        prop_assert!((0.0..=100.0).contains(&stored));
    }

    #[test]
    fn record_scores_never_exceed_100(score in 0u32..1_000) {
        let mut data = UserData::default();
        let record = data.add_training_record(draft(TrainingType::Logic, score), Utc::now(), 500);
        prop_assert!(record.score <= 100);
    }
}
