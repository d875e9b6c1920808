//! Initial assessment: four short tests whose scores seed the ability profile.
//!
//! | Test      | Ability   | Scoring |
//! |-----------|-----------|---------|
//! | Reaction  | reaction  | 10 targets, `(600 − mean ms) / 4`, clamped |
//! | Memory    | memory    | digit spans 3..=8, `level × 10` per span + `(level − 3) × 15` |
//! | Attention | attention | tap the 7s on a 5×5 grid until time runs out, +10 each |
//! | Logic     | logic     | five fixed questions, 20 points each |
//!
//! Coordination, inhibition and creativity are not measured and reset to the
//! neutral 50.

use std::fmt;

use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::training_engine::{
    error::{GameError, GameKind},
    games::{check_index, GamePhase},
    helpers::{make_rng, shuffle, Millis},
    models::{clamp_score, Ability, NEUTRAL_SCORE},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssessmentTest {
    Reaction,
    Memory,
    Attention,
    Logic,
}

impl AssessmentTest {
    pub const ALL: [AssessmentTest; 4] = [
        AssessmentTest::Reaction,
        AssessmentTest::Memory,
        AssessmentTest::Attention,
        AssessmentTest::Logic,
    ];

    pub fn ability(self) -> Ability {
        match self {
            AssessmentTest::Reaction  => Ability::Reaction,
            AssessmentTest::Memory    => Ability::Memory,
            AssessmentTest::Attention => Ability::Attention,
            AssessmentTest::Logic     => Ability::Logic,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AssessmentTest::Reaction  => "Tap each target as soon as it appears",
            AssessmentTest::Memory    => "Remember the digits and type them back",
            AssessmentTest::Attention => "Find the targets among distractors",
            AssessmentTest::Logic     => "Answer simple reasoning questions",
        }
    }

    /// Rough duration shown before the test starts.
    pub fn duration_label(self) -> &'static str {
        match self {
            AssessmentTest::Reaction  => "30 s",
            AssessmentTest::Memory    => "1 min",
            AssessmentTest::Attention => "1 min",
            AssessmentTest::Logic     => "2 min",
        }
    }
}

impl fmt::Display for AssessmentTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssessmentTest::Reaction  => write!(f, "Reaction Speed"),
            AssessmentTest::Memory    => write!(f, "Digit Memory"),
            AssessmentTest::Attention => write!(f, "Attention"),
            AssessmentTest::Logic     => write!(f, "Logical Reasoning"),
        }
    }
}

// ---------------------------------------------------------------------------
// Test parameters
// ---------------------------------------------------------------------------

pub const REACTION_TARGETS: usize = 10;
pub const MEMORY_START: u32 = 3;
pub const MEMORY_END: u32 = 8;
pub const ATTENTION_CELLS: usize = 25;
pub const ATTENTION_TARGETS: usize = 5;
pub const ATTENTION_TARGET_VALUE: u8 = 7;
pub const ATTENTION_SECS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LogicQuestion {
    pub question: &'static str,
    pub options: [&'static str; 4],
    pub answer: usize,
}

pub static LOGIC_QUESTIONS: [LogicQuestion; 5] = [
    LogicQuestion { question: "2, 4, 6, 8, ?", options: ["9", "10", "11", "12"], answer: 1 },
    LogicQuestion {
        question: "If A > B and B > C, how do A and C compare?",
        options: ["A < C", "A = C", "A > C", "Cannot tell"],
        answer: 2,
    },
    LogicQuestion { question: "1, 1, 2, 3, 5, ?", options: ["6", "7", "8", "9"], answer: 2 },
    LogicQuestion {
        question: "All dogs are animals. Rex is a dog. So?",
        options: ["Rex is not an animal", "Rex is an animal", "Cannot tell", "Rex is a cat"],
        answer: 1,
    },
    LogicQuestion { question: "3, 6, 12, 24, ?", options: ["36", "48", "42", "30"], answer: 1 },
];

/// Reaction score from the mean reaction time: 200 ms or faster is 100, 600 ms or slower is 0.
pub fn reaction_score(times_ms: &[Millis]) -> u32 {
    if times_ms.is_empty() {
        return 0;
    }
    let mean = times_ms.iter().sum::<Millis>() as f64 / times_ms.len() as f64;
    clamp_score(((600.0 - mean) / 4.0).round()) as u32
}

/// One attention-grid cell. Found targets are blanked out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttentionCell {
    pub value: Option<u8>,
    pub is_target: bool,
}

fn attention_grid<R: Rng>(rng: &mut R) -> Vec<AttentionCell> {
    let mut grid: Vec<AttentionCell> = (0..ATTENTION_CELLS)
        .map(|i| {
            let is_target = i < ATTENTION_TARGETS;
            let value = if is_target { ATTENTION_TARGET_VALUE } else { rng.gen_range(1..=9) };
            AttentionCell { value: Some(value), is_target }
        })
        .collect();
    shuffle(&mut grid, rng);
    grid
}

fn digits<R: Rng>(len: u32, rng: &mut R) -> Vec<u8> {
    (0..len).map(|_| rng.gen_range(0..10)).collect()
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResults {
    pub reaction: u32,
    pub memory: u32,
    pub attention: u32,
    pub logic: u32,
}

impl AssessmentResults {
    pub fn get(&self, test: AssessmentTest) -> u32 {
        match test {
            AssessmentTest::Reaction  => self.reaction,
            AssessmentTest::Memory    => self.memory,
            AssessmentTest::Attention => self.attention,
            AssessmentTest::Logic     => self.logic,
        }
    }

    fn set(&mut self, test: AssessmentTest, score: u32) {
        match test {
            AssessmentTest::Reaction  => self.reaction = score,
            AssessmentTest::Memory    => self.memory = score,
            AssessmentTest::Attention => self.attention = score,
            AssessmentTest::Logic     => self.logic = score,
        }
    }

    /// Ability values to merge into the profile, unmeasured axes at neutral.
    pub fn ability_updates(&self) -> Vec<(Ability, f64)> {
        let mut updates: Vec<(Ability, f64)> = AssessmentTest::ALL
            .iter()
            .map(|t| (t.ability(), self.get(*t) as f64))
            .collect();
        updates.extend(
            [Ability::Coordination, Ability::Inhibition, Ability::Creativity]
                .map(|a| (a, NEUTRAL_SCORE)),
        );
        updates
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssessmentEvent {
    /// Start the current test.
    Begin,
    /// Reaction: a target became visible.
    TargetShown { at: Millis },
    /// Reaction: the visible target was tapped.
    TargetHit { at: Millis },
    /// Memory: the digits have been shown.
    RevealDone,
    /// Memory: typed answer.
    SubmitDigits { answer: String },
    /// Attention: tap a grid cell.
    TapCell { cell: usize },
    /// Attention: the clock ran out.
    TimeUp,
    /// Logic: choose an option for the current question.
    Answer { option: usize },
}

impl AssessmentEvent {
    fn name(&self) -> &'static str {
        match self {
            AssessmentEvent::Begin             => "begin",
            AssessmentEvent::TargetShown { .. } => "target-shown",
            AssessmentEvent::TargetHit { .. }  => "target-hit",
            AssessmentEvent::RevealDone        => "reveal-done",
            AssessmentEvent::SubmitDigits { .. } => "submit-digits",
            AssessmentEvent::TapCell { .. }    => "tap-cell",
            AssessmentEvent::TimeUp            => "time-up",
            AssessmentEvent::Answer { .. }     => "answer",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssessmentStep {
    Continue,
    /// One test finished; the next waits for [`AssessmentEvent::Begin`].
    TestDone { test: AssessmentTest, score: u32 },
    /// All four finished.
    Completed(AssessmentResults),
}

#[derive(Debug, Clone, PartialEq)]
enum Running {
    Reaction { times: Vec<Millis>, shown_at: Option<Millis>, position: (f64, f64) },
    Memory { level: u32, score: u32, sequence: Vec<u8>, showing: bool },
    Attention { grid: Vec<AttentionCell>, score: u32 },
    Logic { question: usize, score: u32 },
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    /// Waiting for `Begin` on test `index`.
    Ready,
    Running(Running),
    Completed,
}

pub struct Assessment {
    rng: StdRng,
    index: usize,
    state: State,
    results: AssessmentResults,
}

impl Assessment {
    pub fn new(rng_seed: Option<u64>) -> Self {
        Assessment {
            rng: make_rng(rng_seed),
            index: 0,
            state: State::Ready,
            results: AssessmentResults::default(),
        }
    }

    /// The test in progress or up next; `None` once everything is done.
    pub fn current_test(&self) -> Option<AssessmentTest> {
        AssessmentTest::ALL.get(self.index).copied()
    }

    /// Share of tests started, in percent.
    pub fn progress(&self) -> f64 {
        ((self.index + 1).min(AssessmentTest::ALL.len()) as f64 / AssessmentTest::ALL.len() as f64) * 100.0
    }

    pub fn results(&self) -> AssessmentResults {
        self.results
    }

    pub fn phase(&self) -> GamePhase {
        match &self.state {
            State::Ready                                              => GamePhase::Idle,
            State::Running(Running::Memory { showing: true, .. })     => GamePhase::Presenting,
            State::Running(Running::Memory { showing: false, .. })    => GamePhase::Recalling,
            State::Running(_)                                         => GamePhase::Playing,
            State::Completed                                          => GamePhase::Finished,
        }
    }

    /// Reaction target position in percent of the play area, while one is visible.
    pub fn target_position(&self) -> Option<(f64, f64)> {
        match &self.state {
            State::Running(Running::Reaction { shown_at: Some(_), position, .. }) => Some(*position),
            _ => None,
        }
    }

    /// Memory digits, while they are being shown.
    pub fn digits(&self) -> &[u8] {
        match &self.state {
            State::Running(Running::Memory { sequence, showing: true, .. }) => sequence,
            _ => &[],
        }
    }

    pub fn attention_grid(&self) -> &[AttentionCell] {
        match &self.state {
            State::Running(Running::Attention { grid, .. }) => grid,
            _ => &[],
        }
    }

    pub fn logic_question(&self) -> Option<&'static LogicQuestion> {
        match &self.state {
            State::Running(Running::Logic { question, .. }) => LOGIC_QUESTIONS.get(*question),
            _ => None,
        }
    }

    fn invalid(&self, event: &AssessmentEvent) -> GameError {
        GameError::InvalidEvent { game: GameKind::Assessment, phase: self.phase(), event: event.name() }
    }

    fn begin(&mut self, test: AssessmentTest) -> Running {
        match test {
            AssessmentTest::Reaction => Running::Reaction {
                times: Vec::with_capacity(REACTION_TARGETS),
                shown_at: None,
                position: (0.0, 0.0),
            },
            AssessmentTest::Memory => Running::Memory {
                level: MEMORY_START,
                score: 0,
                sequence: digits(MEMORY_START, &mut self.rng),
                showing: true,
            },
            AssessmentTest::Attention => Running::Attention { grid: attention_grid(&mut self.rng), score: 0 },
            AssessmentTest::Logic => Running::Logic { question: 0, score: 0 },
        }
    }

    fn finish_test(&mut self, test: AssessmentTest, score: u32) -> AssessmentStep {
        debug!(test = ?test, score, "assessment test finished");
        self.results.set(test, score);
        self.index += 1;
        if self.index < AssessmentTest::ALL.len() {
            self.state = State::Ready;
            AssessmentStep::TestDone { test, score }
        } else {
            self.state = State::Completed;
            AssessmentStep::Completed(self.results)
        }
    }

    pub fn handle(&mut self, event: AssessmentEvent) -> Result<AssessmentStep, GameError> {
        let Some(test) = self.current_test() else {
            return Err(self.invalid(&event));
        };
        if self.state == State::Ready {
            if event != AssessmentEvent::Begin {
                return Err(self.invalid(&event));
            }
            let running = self.begin(test);
            self.state = State::Running(running);
            return Ok(AssessmentStep::Continue);
        }

        let State::Running(running) = &mut self.state else {
            return Err(self.invalid(&event));
        };
        let finished = match (running, &event) {
            (Running::Reaction { shown_at, position, .. }, AssessmentEvent::TargetShown { at }) => {
                *shown_at = Some(*at);
                *position = (10.0 + self.rng.gen::<f64>() * 80.0, 10.0 + self.rng.gen::<f64>() * 80.0);
                None
            }
            (Running::Reaction { times, shown_at, .. }, AssessmentEvent::TargetHit { at }) => {
                let Some(shown) = shown_at.take() else {
                    return Err(self.invalid(&event));
                };
                times.push(at.saturating_sub(shown));
                (times.len() >= REACTION_TARGETS).then(|| reaction_score(times))
            }
            (Running::Memory { showing, .. }, AssessmentEvent::RevealDone) if *showing => {
                *showing = false;
                None
            }
            (
                Running::Memory { level, score, sequence, showing },
                AssessmentEvent::SubmitDigits { answer },
            ) if !*showing => {
                let expected: String = sequence.iter().map(|d| d.to_string()).collect();
                let correct = answer.trim() == expected;
                if correct {
                    *score += *level * 10;
                }
                if correct && *level < MEMORY_END {
                    *level += 1;
                    *sequence = digits(*level, &mut self.rng);
                    *showing = true;
                    None
                } else {
                    Some((*score + (*level - MEMORY_START) * 15).min(100))
                }
            }
            (Running::Attention { grid, score }, AssessmentEvent::TapCell { cell }) => {
                check_index("cell", *cell, grid.len())?;
                if grid[*cell].is_target {
                    *score += 10;
                    grid[*cell] = AttentionCell { value: None, is_target: false };
                    if grid.iter().all(|c| !c.is_target) {
                        *grid = attention_grid(&mut self.rng);
                    }
                }
                None
            }
            (Running::Attention { score, .. }, AssessmentEvent::TimeUp) => Some((*score).min(100)),
            (Running::Logic { question, score }, AssessmentEvent::Answer { option }) => {
                let current = &LOGIC_QUESTIONS[*question];
                check_index("option", *option, current.options.len())?;
                if *option == current.answer {
                    *score += 20;
                }
                *question += 1;
                (*question >= LOGIC_QUESTIONS.len()).then_some(*score)
            }
            _ => return Err(self.invalid(&event)),
        };

        Ok(match finished {
            Some(score) => self.finish_test(test, score),
            None => AssessmentStep::Continue,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_reaction(a: &mut Assessment, reaction_ms: Millis) -> AssessmentStep {
        a.handle(AssessmentEvent::Begin).unwrap();
        let mut at = 0;
        let mut step = AssessmentStep::Continue;
        for _ in 0..REACTION_TARGETS {
            at += 1_000;
            a.handle(AssessmentEvent::TargetShown { at }).unwrap();
            assert!(a.target_position().is_some());
            step = a.handle(AssessmentEvent::TargetHit { at: at + reaction_ms }).unwrap();
        }
        step
    }

    fn run_memory(a: &mut Assessment, correct_spans: usize) -> AssessmentStep {
        a.handle(AssessmentEvent::Begin).unwrap();
        for _ in 0..correct_spans {
            let answer: String = a.digits().iter().map(|d| d.to_string()).collect();
            a.handle(AssessmentEvent::RevealDone).unwrap();
            let step = a.handle(AssessmentEvent::SubmitDigits { answer }).unwrap();
            if step != AssessmentStep::Continue {
                return step;
            }
        }
        a.handle(AssessmentEvent::RevealDone).unwrap();
        a.handle(AssessmentEvent::SubmitDigits { answer: "nope".into() }).unwrap()
    }

    fn run_attention(a: &mut Assessment, hits: usize) -> AssessmentStep {
        a.handle(AssessmentEvent::Begin).unwrap();
        for _ in 0..hits {
            let cell = a.attention_grid().iter().position(|c| c.is_target).unwrap();
            a.handle(AssessmentEvent::TapCell { cell }).unwrap();
        }
        a.handle(AssessmentEvent::TimeUp).unwrap()
    }

    fn run_logic(a: &mut Assessment, correct: usize) -> AssessmentStep {
        a.handle(AssessmentEvent::Begin).unwrap();
        let mut step = AssessmentStep::Continue;
        for i in 0..LOGIC_QUESTIONS.len() {
            let q = a.logic_question().unwrap();
            let option = if i < correct { q.answer } else { (q.answer + 1) % 4 };
            step = a.handle(AssessmentEvent::Answer { option }).unwrap();
        }
        step
    }

    #[test]
    fn reaction_scoring() {
        assert_eq!(reaction_score(&[200; 10]), 100);
        assert_eq!(reaction_score(&[400; 10]), 50);
        assert_eq!(reaction_score(&[900, 700]), 0);
        assert_eq!(reaction_score(&[]), 0);
    }

    #[test]
    fn attention_grid_has_five_sevens() {
        let grid = attention_grid(&mut make_rng(Some(3)));
        assert_eq!(grid.len(), ATTENTION_CELLS);
        let targets: Vec<_> = grid.iter().filter(|c| c.is_target).collect();
        assert_eq!(targets.len(), ATTENTION_TARGETS);
        assert!(targets.iter().all(|c| c.value == Some(ATTENTION_TARGET_VALUE)));
    }

    #[test]
    fn full_assessment_produces_profile() {
        let mut a = Assessment::new(Some(17));
        assert_eq!(
            run_reaction(&mut a, 300),
            AssessmentStep::TestDone { test: AssessmentTest::Reaction, score: 75 }
        );
        assert_eq!(a.current_test(), Some(AssessmentTest::Memory));
        // spans of 3 and 4, then a miss at 5: 30 + 40 + 2 * 15
        assert_eq!(
            run_memory(&mut a, 2),
            AssessmentStep::TestDone { test: AssessmentTest::Memory, score: 100 }
        );
        // 7 hits forces one grid regeneration
        assert_eq!(
            run_attention(&mut a, 7),
            AssessmentStep::TestDone { test: AssessmentTest::Attention, score: 70 }
        );
        let results = match run_logic(&mut a, 3) {
            AssessmentStep::Completed(results) => results,
            other => panic!("expected completion, got {other:?}"),
        };
        assert_eq!(results, AssessmentResults { reaction: 75, memory: 100, attention: 70, logic: 60 });
        assert_eq!(a.phase(), GamePhase::Finished);

        let updates = results.ability_updates();
        assert_eq!(updates.len(), 7);
        assert!(updates.contains(&(Ability::Reaction, 75.0)));
        assert!(updates.contains(&(Ability::Creativity, 50.0)));
    }

    #[test]
    fn memory_first_miss_scores_zero() {
        let mut a = Assessment::new(Some(1));
        run_reaction(&mut a, 200);
        assert_eq!(
            run_memory(&mut a, 0),
            AssessmentStep::TestDone { test: AssessmentTest::Memory, score: 0 }
        );
    }

    #[test]
    fn memory_caps_at_eight_digits() {
        let mut a = Assessment::new(Some(2));
        run_reaction(&mut a, 200);
        // 3..=8 all correct: 330 points, capped
        assert_eq!(
            run_memory(&mut a, 6),
            AssessmentStep::TestDone { test: AssessmentTest::Memory, score: 100 }
        );
    }

    #[test]
    fn events_for_other_tests_are_rejected() {
        let mut a = Assessment::new(Some(5));
        assert!(a.handle(AssessmentEvent::TimeUp).is_err());
        a.handle(AssessmentEvent::Begin).unwrap();
        let err = a.handle(AssessmentEvent::Answer { option: 0 }).unwrap_err();
        assert!(matches!(err, GameError::InvalidEvent { game: GameKind::Assessment, .. }));
        // a hit with no visible target
        assert!(a.handle(AssessmentEvent::TargetHit { at: 10 }).is_err());
    }
}
