//! Schulte table: tap every symbol of a shuffled grid in order.

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::training_engine::{
    achievements::AchievementId,
    error::GameError,
    games::{
        check_index, invalid, AbilityNudge, AchievementSignal, GameOutcome, GamePhase, Step,
        TrainingGame,
    },
    helpers::{elapsed_secs, final_score, make_rng, shuffled, whole_secs, Millis},
    models::{Ability, RecordDraft, TrainingType},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridSize {
    Three = 3,
    Four = 4,
    Five = 5,
}

impl GridSize {
    pub fn side(self) -> usize {
        self as usize
    }

    pub fn cells(self) -> usize {
        self.side() * self.side()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentType {
    #[default]
    Numbers,
    Letters,
    /// Numbers and letters alternating: 1, A, 2, B, ...
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchulteConfig {
    pub grid_size: GridSize,
    pub content: ContentType,
}

impl Default for SchulteConfig {
    fn default() -> Self {
        SchulteConfig { grid_size: GridSize::Three, content: ContentType::Numbers }
    }
}

const SPEED_DEMON_SECS: f64 = 30.0;

fn letter(i: usize) -> String {
    char::from(b'A' + (i % 26) as u8).to_string()
}

/// The order the symbols must be tapped in.
pub fn target_sequence(config: SchulteConfig) -> Vec<String> {
    (0..config.grid_size.cells())
        .map(|i| match config.content {
            ContentType::Numbers => (i + 1).to_string(),
            ContentType::Letters => letter(i),
            ContentType::Mixed if i % 2 == 0 => (i / 2 + 1).to_string(),
            ContentType::Mixed => letter(i / 2),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchulteEvent {
    Start { at: Millis },
    Tap { cell: usize, at: Millis },
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    Idle,
    Playing {
        grid: Vec<String>,
        cleared: Vec<bool>,
        next: usize,
        mistakes: u32,
        started: Millis,
    },
    Finished,
}

pub struct SchulteGame {
    config: SchulteConfig,
    targets: Vec<String>,
    rng: StdRng,
    state: State,
}

impl SchulteGame {
    pub fn new(config: SchulteConfig, rng_seed: Option<u64>) -> Self {
        SchulteGame {
            config,
            targets: target_sequence(config),
            rng: make_rng(rng_seed),
            state: State::Idle,
        }
    }

    /// Current grid, row-major. Empty outside play.
    pub fn grid(&self) -> &[String] {
        match &self.state {
            State::Playing { grid, .. } => grid,
            _ => &[],
        }
    }

    /// The symbol to find next.
    pub fn current_target(&self) -> Option<&str> {
        match &self.state {
            State::Playing { next, .. } => self.targets.get(*next).map(String::as_str),
            _ => None,
        }
    }

    pub fn is_cleared(&self, cell: usize) -> bool {
        match &self.state {
            State::Playing { cleared, .. } => cleared.get(cell).copied().unwrap_or(false),
            _ => false,
        }
    }

    pub fn mistakes(&self) -> u32 {
        match &self.state {
            State::Playing { mistakes, .. } => *mistakes,
            _ => 0,
        }
    }

    fn finish(&self, started: Millis, at: Millis, mistakes: u32) -> GameOutcome {
        let secs = elapsed_secs(started, at);
        let time_score = (100.0 - secs * 2.0).max(0.0);
        let accuracy = (100.0 - mistakes as f64 * 10.0).max(0.0);
        let bonus = (self.config.grid_size.side() as f64 - 3.0) * 10.0
            + if self.config.content == ContentType::Numbers { 0.0 } else { 10.0 };
        let score = final_score(time_score * (accuracy / 100.0) + bonus);

        let mut achievements = Vec::new();
        if self.config.grid_size == GridSize::Five && secs < SPEED_DEMON_SECS {
            achievements.push(AchievementSignal::Unlock(AchievementId::SpeedDemon));
        }

        GameOutcome {
            draft: RecordDraft {
                training_type: TrainingType::Schulte,
                score,
                accuracy,
                duration: whole_secs(started, at),
                difficulty: self.config.grid_size.side() as u32,
            },
            nudges: vec![AbilityNudge::from_score(Ability::Attention, score)],
            achievements,
        }
    }
}

impl TrainingGame for SchulteGame {
    type Event = SchulteEvent;

    fn training_type(&self) -> TrainingType {
        TrainingType::Schulte
    }

    fn phase(&self) -> GamePhase {
        match self.state {
            State::Idle              => GamePhase::Idle,
            State::Playing { .. }    => GamePhase::Playing,
            State::Finished          => GamePhase::Finished,
        }
    }

    fn handle(&mut self, event: SchulteEvent) -> Result<Step, GameError> {
        match event {
            SchulteEvent::Start { at } => {
                if matches!(self.state, State::Playing { .. }) {
                    return Err(invalid(self, "start"));
                }
                let grid = shuffled(&self.targets, &mut self.rng);
                self.state = State::Playing {
                    cleared: vec![false; grid.len()],
                    grid,
                    next: 0,
                    mistakes: 0,
                    started: at,
                };
                Ok(Step::Continue)
            }
            SchulteEvent::Tap { cell, at } => {
                let State::Playing { grid, cleared, next, mistakes, started } = &mut self.state else {
                    return Err(invalid(self, "tap"));
                };
                check_index("cell", cell, grid.len())?;

                if grid[cell] != self.targets[*next] {
                    *mistakes += 1;
                    return Ok(Step::Continue);
                }
                cleared[cell] = true;
                *next += 1;
                if *next < self.targets.len() {
                    return Ok(Step::Continue);
                }

                let (started, mistakes) = (*started, *mistakes);
                let outcome = self.finish(started, at, mistakes);
                self.state = State::Finished;
                Ok(Step::Finished(outcome))
            }
        }
    }
}
