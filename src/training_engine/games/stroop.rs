//! Stroop colour-word interference: answer the ink colour, ignore the word.

use std::fmt;

use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};

use crate::training_engine::{
    achievements::AchievementId,
    error::GameError,
    games::{
        invalid, AbilityNudge, AchievementSignal, DifficultyLevel, GameOutcome, GamePhase, Step,
        TrainingGame,
    },
    helpers::{final_score, make_rng, percent, whole_secs, Millis},
    models::{Ability, RecordDraft, TrainingType},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InkColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
}

impl InkColor {
    pub const ALL: [InkColor; 5] = [
        InkColor::Red,
        InkColor::Blue,
        InkColor::Green,
        InkColor::Yellow,
        InkColor::Purple,
    ];

    pub fn hex(self) -> &'static str {
        match self {
            InkColor::Red    => "#EF4444",
            InkColor::Blue   => "#3B82F6",
            InkColor::Green  => "#22C55E",
            InkColor::Yellow => "#EAB308",
            InkColor::Purple => "#A855F7",
        }
    }

    fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for InkColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InkColor::Red    => write!(f, "red"),
            InkColor::Blue   => write!(f, "blue"),
            InkColor::Green  => write!(f, "green"),
            InkColor::Yellow => write!(f, "yellow"),
            InkColor::Purple => write!(f, "purple"),
        }
    }
}

/// One stimulus: the word spelled out, printed in `ink`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorWord {
    pub word: InkColor,
    pub ink: InkColor,
}

impl ColorWord {
    pub fn is_congruent(&self) -> bool {
        self.word == self.ink
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StroopConfig {
    pub difficulty: DifficultyLevel,
    pub rounds: u32,
}

impl Default for StroopConfig {
    fn default() -> Self {
        StroopConfig { difficulty: DifficultyLevel::Easy, rounds: 20 }
    }
}

impl StroopConfig {
    /// Answer window per word.
    pub fn time_limit_ms(&self) -> Millis {
        self.difficulty.pick(5_000, 3_000, 2_000)
    }

    fn multiplier(&self) -> f64 {
        self.difficulty.pick(1.0, 1.2, 1.5)
    }
}

const MAX_ROUND_POINTS: u64 = 50;
const MIN_ROUND_POINTS: u64 = 10;
const FOCUS_KING_RUN: u32 = 50;

/// Points for a correct answer after `reaction_ms`.
pub fn round_points(reaction_ms: Millis) -> u64 {
    MAX_ROUND_POINTS
        .saturating_sub(reaction_ms / 100)
        .max(MIN_ROUND_POINTS)
}

/// Easy words are congruent at least half the time; harder levels never are.
fn generate_word<R: Rng>(difficulty: DifficultyLevel, rng: &mut R) -> ColorWord {
    let word = InkColor::random(rng);
    if difficulty == DifficultyLevel::Easy {
        let ink = if rng.gen_bool(0.5) { word } else { InkColor::random(rng) };
        return ColorWord { word, ink };
    }
    let others: Vec<InkColor> = InkColor::ALL.into_iter().filter(|c| *c != word).collect();
    ColorWord { word, ink: others[rng.gen_range(0..others.len())] }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StroopEvent {
    Start { at: Millis },
    Answer { color: InkColor, at: Millis },
    /// The answer window closed without a response.
    Timeout { at: Millis },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Tally {
    score: u64,
    streak: u32,
    max_streak: u32,
    correct: u32,
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    Idle,
    Playing {
        round: u32,
        word: ColorWord,
        shown_at: Millis,
        started: Millis,
        tally: Tally,
    },
    Finished,
}

pub struct StroopGame {
    config: StroopConfig,
    rng: StdRng,
    state: State,
}

impl StroopGame {
    pub fn new(config: StroopConfig, rng_seed: Option<u64>) -> Self {
        StroopGame { config, rng: make_rng(rng_seed), state: State::Idle }
    }

    pub fn config(&self) -> StroopConfig {
        self.config
    }

    pub fn current_word(&self) -> Option<ColorWord> {
        match &self.state {
            State::Playing { word, .. } => Some(*word),
            _ => None,
        }
    }

    /// Zero-based round index while playing.
    pub fn round(&self) -> Option<u32> {
        match &self.state {
            State::Playing { round, .. } => Some(*round),
            _ => None,
        }
    }

    pub fn streak(&self) -> u32 {
        match &self.state {
            State::Playing { tally, .. } => tally.streak,
            _ => 0,
        }
    }

    fn advance(&mut self, at: Millis) -> Step {
        let State::Playing { round, word, shown_at, started, tally } = &mut self.state else {
            return Step::Continue;
        };
        *round += 1;
        if *round < self.config.rounds {
            *word = generate_word(self.config.difficulty, &mut self.rng);
            *shown_at = at;
            return Step::Continue;
        }
        let (started, tally) = (*started, *tally);
        self.state = State::Finished;
        Step::Finished(self.outcome(tally, whole_secs(started, at)))
    }

    fn outcome(&self, tally: Tally, duration: u32) -> GameOutcome {
        let accuracy = percent(
            tally.score as f64,
            (self.config.rounds as u64 * MAX_ROUND_POINTS) as f64,
        );
        let score = final_score(accuracy * self.config.multiplier());

        let mut achievements = Vec::new();
        if tally.max_streak >= FOCUS_KING_RUN {
            achievements.push(AchievementSignal::Progress(AchievementId::FocusKing, tally.max_streak));
        }

        GameOutcome {
            draft: RecordDraft {
                training_type: TrainingType::Stroop,
                score,
                accuracy: accuracy.round(),
                duration,
                difficulty: self.config.difficulty.tier(),
            },
            nudges: vec![AbilityNudge::from_score(Ability::Inhibition, score)],
            achievements,
        }
    }
}

impl TrainingGame for StroopGame {
    type Event = StroopEvent;

    fn training_type(&self) -> TrainingType {
        TrainingType::Stroop
    }

    fn phase(&self) -> GamePhase {
        match self.state {
            State::Idle           => GamePhase::Idle,
            State::Playing { .. } => GamePhase::Playing,
            State::Finished       => GamePhase::Finished,
        }
    }

    fn handle(&mut self, event: StroopEvent) -> Result<Step, GameError> {
        match event {
            StroopEvent::Start { at } => {
                if matches!(self.state, State::Playing { .. }) {
                    return Err(invalid(self, "start"));
                }
                if self.config.rounds == 0 {
                    self.state = State::Finished;
                    return Ok(Step::Finished(self.outcome(Tally::default(), 0)));
                }
                let word = generate_word(self.config.difficulty, &mut self.rng);
                self.state = State::Playing {
                    round: 0,
                    word,
                    shown_at: at,
                    started: at,
                    tally: Tally::default(),
                };
                Ok(Step::Continue)
            }
            StroopEvent::Answer { color, at } => {
                let limit = self.config.time_limit_ms();
                let State::Playing { word, shown_at, tally, .. } = &mut self.state else {
                    return Err(invalid(self, "answer"));
                };
                let reaction = at.saturating_sub(*shown_at);
                // A late answer counts the same as a timeout.
                if color == word.ink && reaction <= limit {
                    tally.score += round_points(reaction);
                    tally.correct += 1;
                    tally.streak += 1;
                    tally.max_streak = tally.max_streak.max(tally.streak);
                } else {
                    tally.streak = 0;
                }
                Ok(self.advance(at))
            }
            StroopEvent::Timeout { at } => {
                let State::Playing { tally, .. } = &mut self.state else {
                    return Err(invalid(self, "timeout"));
                };
                tally.streak = 0;
                Ok(self.advance(at))
            }
        }
    }
}
