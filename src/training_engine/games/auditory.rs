//! Auditory digit span: listen to a spoken digit sequence, type it back.
//! Speech itself belongs to the presenter; this machine only tracks the
//! sequence, the replay loop, and scoring.

use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};

use crate::training_engine::{
    error::GameError,
    games::{invalid, AbilityNudge, DifficultyLevel, GameOutcome, GamePhase, Step, TrainingGame},
    helpers::{make_rng, percent, whole_secs, Millis},
    models::{Ability, RecordDraft, TrainingType},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditoryConfig {
    pub difficulty: DifficultyLevel,
    pub start_length: u32,
}

impl Default for AuditoryConfig {
    fn default() -> Self {
        AuditoryConfig { difficulty: DifficultyLevel::Easy, start_length: 4 }
    }
}

impl AuditoryConfig {
    /// Speech-synthesis rate for the presenter.
    pub fn speech_rate(&self) -> f64 {
        self.difficulty.pick(0.8, 1.0, 1.3)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditoryEvent {
    Start { at: Millis },
    /// Playback of the current sequence ended.
    PlaybackDone,
    /// Play the same sequence again. Only allowed while recalling.
    Replay,
    /// The typed answer; anything other than the exact digit string is wrong.
    Submit { answer: String, at: Millis },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Playing,
    Recalling,
    Finished,
}

pub struct AuditoryGame {
    config: AuditoryConfig,
    rng: StdRng,
    state: State,
    sequence: Vec<u8>,
    round: u32,
    max_round: u32,
    score: u32,
    replays: u32,
    started: Millis,
}

impl AuditoryGame {
    pub fn new(config: AuditoryConfig, rng_seed: Option<u64>) -> Self {
        AuditoryGame {
            config: AuditoryConfig { start_length: config.start_length.max(1), ..config },
            rng: make_rng(rng_seed),
            state: State::Idle,
            sequence: Vec::new(),
            round: 1,
            max_round: 1,
            score: 0,
            replays: 0,
            started: 0,
        }
    }

    pub fn config(&self) -> AuditoryConfig {
        self.config
    }

    /// Digits to speak. Empty unless playing.
    pub fn sequence(&self) -> &[u8] {
        match self.state {
            State::Playing => &self.sequence,
            _ => &[],
        }
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn replays(&self) -> u32 {
        self.replays
    }

    fn start_round(&mut self) {
        let length = self.config.start_length + self.round - 1;
        self.sequence = (0..length).map(|_| self.rng.gen_range(0..10u8)).collect();
        self.state = State::Playing;
    }

    fn matches(&self, answer: &str) -> bool {
        let typed: Vec<Option<u8>> = answer
            .trim()
            .chars()
            .map(|c| c.to_digit(10).map(|d| d as u8))
            .collect();
        typed.len() == self.sequence.len()
            && typed.iter().zip(&self.sequence).all(|(t, s)| *t == Some(*s))
    }

    fn outcome(&self, at: Millis) -> GameOutcome {
        let max_length = self.config.start_length + self.max_round - 1;
        let accuracy = percent(self.score as f64, (max_length * 10) as f64)
            .round()
            .min(100.0);
        let score = (self.score + (self.max_round - 1) * 15).min(100);
        GameOutcome {
            draft: RecordDraft {
                training_type: TrainingType::Auditory,
                score,
                accuracy,
                duration: whole_secs(self.started, at),
                difficulty: self.config.difficulty.tier(),
            },
            nudges: vec![AbilityNudge::from_score(Ability::Attention, score)],
            achievements: Vec::new(),
        }
    }
}

impl TrainingGame for AuditoryGame {
    type Event = AuditoryEvent;

    fn training_type(&self) -> TrainingType {
        TrainingType::Auditory
    }

    fn phase(&self) -> GamePhase {
        match self.state {
            State::Idle      => GamePhase::Idle,
            State::Playing   => GamePhase::Presenting,
            State::Recalling => GamePhase::Recalling,
            State::Finished  => GamePhase::Finished,
        }
    }

    fn handle(&mut self, event: AuditoryEvent) -> Result<Step, GameError> {
        match (self.state, event) {
            (State::Idle | State::Finished, AuditoryEvent::Start { at }) => {
                self.round = 1;
                self.max_round = 1;
                self.score = 0;
                self.replays = 0;
                self.started = at;
                self.start_round();
                Ok(Step::Continue)
            }
            (State::Playing, AuditoryEvent::PlaybackDone) => {
                self.state = State::Recalling;
                Ok(Step::Continue)
            }
            (State::Recalling, AuditoryEvent::Replay) => {
                self.replays += 1;
                self.state = State::Playing;
                Ok(Step::Continue)
            }
            (State::Recalling, AuditoryEvent::Submit { answer, at }) => {
                if !self.matches(&answer) {
                    self.state = State::Finished;
                    return Ok(Step::Finished(self.outcome(at)));
                }
                self.score += self.sequence.len() as u32 * 10;
                self.max_round = self.max_round.max(self.round);
                self.round += 1;
                self.start_round();
                Ok(Step::Continue)
            }
            (_, event) => Err(invalid(self, event_name(&event))),
        }
    }
}

fn event_name(event: &AuditoryEvent) -> &'static str {
    match event {
        AuditoryEvent::Start { .. }  => "start",
        AuditoryEvent::PlaybackDone  => "playback-done",
        AuditoryEvent::Replay        => "replay",
        AuditoryEvent::Submit { .. } => "submit",
    }
}
