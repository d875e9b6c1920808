//! Mirror coordination: trace a target path with both hands at once, the right
//! canvas mirrored. Five timed rounds.

use std::f64::consts::PI;

use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};

use crate::training_engine::{
    error::GameError,
    games::{invalid, AbilityNudge, DifficultyLevel, GameOutcome, GamePhase, Step, TrainingGame},
    helpers::{make_rng, whole_secs, Millis},
    models::{Ability, RecordDraft, TrainingType},
};

pub const ROUNDS: u32 = 5;
/// Canvas centre; canvases are 300 units square.
const CENTER: f64 = 150.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    fn polar(radius: f64, angle: f64) -> Self {
        Point::new(CENTER + angle.cos() * radius, CENTER + angle.sin() * radius)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PatternKind {
    #[default]
    Line,
    Circle,
    Spiral,
}

impl PatternKind {
    /// Target path for one round. Only `Line` uses the RNG.
    pub fn generate<R: Rng>(self, rng: &mut R) -> Vec<Point> {
        match self {
            PatternKind::Line => {
                let start_y = 50.0 + rng.gen::<f64>() * 50.0;
                let end_y = 200.0 + rng.gen::<f64>() * 50.0;
                (0..=20)
                    .map(|i| {
                        let x = CENTER + (rng.gen::<f64>() - 0.5) * 20.0;
                        Point::new(x, start_y + (end_y - start_y) * (i as f64 / 20.0))
                    })
                    .collect()
            }
            PatternKind::Circle => (0..=36)
                .map(|i| Point::polar(80.0, i as f64 / 36.0 * 2.0 * PI))
                .collect(),
            PatternKind::Spiral => (0..=72)
                .map(|i| Point::polar(20.0 + i as f64 * 1.5, i as f64 / 18.0 * PI))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorConfig {
    pub difficulty: DifficultyLevel,
    pub pattern: PatternKind,
}

impl MirrorConfig {
    pub fn time_limit_secs(&self) -> u32 {
        self.difficulty.pick(30, 20, 15)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Hand {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MirrorEvent {
    Start { at: Millis },
    /// Pointer down: restarts that hand's stroke.
    StrokeBegin { hand: Hand, point: Point },
    StrokeExtend { hand: Hand, point: Point },
    /// The round timer ran out.
    TimeUp { at: Millis },
}

/// Synchronisation score for one round, from stroke and target point counts.
///
/// Half the weight goes to how closely the two hands' strokes (and the left
/// stroke and the target) agree in length, half to how much of the target the
/// two strokes cover together.
pub fn round_score(left: usize, right: usize, target: usize) -> u32 {
    let (l, r, t) = (left as f64, right as f64, target as f64);
    let length_score = (100.0 - (l - r).abs() * 2.0 - (l - t).abs() * 0.5).max(0.0);
    let coverage = if target == 0 { 0.0 } else { ((l + r) / (t * 2.0) * 100.0).min(100.0) };
    (length_score * 0.5 + coverage * 0.5).round() as u32
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    Idle,
    Playing { target: Vec<Point>, left: Vec<Point>, right: Vec<Point> },
    Finished,
}

pub struct MirrorGame {
    config: MirrorConfig,
    rng: StdRng,
    state: State,
    round: u32,
    round_scores: Vec<u32>,
    started: Millis,
}

impl MirrorGame {
    pub fn new(config: MirrorConfig, rng_seed: Option<u64>) -> Self {
        MirrorGame {
            config,
            rng: make_rng(rng_seed),
            state: State::Idle,
            round: 1,
            round_scores: Vec::with_capacity(ROUNDS as usize),
            started: 0,
        }
    }

    pub fn config(&self) -> MirrorConfig {
        self.config
    }

    /// One-based round number.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn round_scores(&self) -> &[u32] {
        &self.round_scores
    }

    pub fn target(&self) -> &[Point] {
        match &self.state {
            State::Playing { target, .. } => target,
            _ => &[],
        }
    }

    pub fn stroke(&self, hand: Hand) -> &[Point] {
        match (&self.state, hand) {
            (State::Playing { left, .. }, Hand::Left) => left,
            (State::Playing { right, .. }, Hand::Right) => right,
            _ => &[],
        }
    }

    fn stroke_mut(&mut self, hand: Hand) -> Option<&mut Vec<Point>> {
        match (&mut self.state, hand) {
            (State::Playing { left, .. }, Hand::Left) => Some(left),
            (State::Playing { right, .. }, Hand::Right) => Some(right),
            _ => None,
        }
    }

    fn new_round(&mut self) {
        self.state = State::Playing {
            target: self.config.pattern.generate(&mut self.rng),
            left: Vec::new(),
            right: Vec::new(),
        };
    }

    fn outcome(&self, at: Millis) -> GameOutcome {
        let total: u32 = self.round_scores.iter().sum();
        let average = (total as f64 / ROUNDS as f64).round() as u32;
        let score = average.min(100);
        GameOutcome {
            draft: RecordDraft {
                training_type: TrainingType::Mirror,
                score,
                accuracy: average as f64,
                duration: whole_secs(self.started, at),
                difficulty: self.config.difficulty.tier(),
            },
            nudges: vec![AbilityNudge::from_score(Ability::Coordination, score)],
            achievements: Vec::new(),
        }
    }
}

impl TrainingGame for MirrorGame {
    type Event = MirrorEvent;

    fn training_type(&self) -> TrainingType {
        TrainingType::Mirror
    }

    fn phase(&self) -> GamePhase {
        match self.state {
            State::Idle           => GamePhase::Idle,
            State::Playing { .. } => GamePhase::Playing,
            State::Finished       => GamePhase::Finished,
        }
    }

    fn handle(&mut self, event: MirrorEvent) -> Result<Step, GameError> {
        match event {
            MirrorEvent::Start { at } => {
                if matches!(self.state, State::Playing { .. }) {
                    return Err(invalid(self, "start"));
                }
                self.round = 1;
                self.round_scores.clear();
                self.started = at;
                self.new_round();
                Ok(Step::Continue)
            }
            MirrorEvent::StrokeBegin { hand, point } => {
                let Some(stroke) = self.stroke_mut(hand) else {
                    return Err(invalid(self, "stroke-begin"));
                };
                stroke.clear();
                stroke.push(point);
                Ok(Step::Continue)
            }
            MirrorEvent::StrokeExtend { hand, point } => {
                let Some(stroke) = self.stroke_mut(hand) else {
                    return Err(invalid(self, "stroke-extend"));
                };
                stroke.push(point);
                Ok(Step::Continue)
            }
            MirrorEvent::TimeUp { at } => {
                let State::Playing { target, left, right } = &self.state else {
                    return Err(invalid(self, "time-up"));
                };
                let score = round_score(left.len(), right.len(), target.len());
                self.round_scores.push(score);
                if self.round < ROUNDS {
                    self.round += 1;
                    self.new_round();
                    return Ok(Step::Continue);
                }
                self.state = State::Finished;
                Ok(Step::Finished(self.outcome(at)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(game: &mut MirrorGame, points: usize) {
        let target = game.target().to_vec();
        for hand in [Hand::Left, Hand::Right] {
            for (i, p) in target.iter().cycle().take(points).enumerate() {
                let event = if i == 0 {
                    MirrorEvent::StrokeBegin { hand, point: *p }
                } else {
                    MirrorEvent::StrokeExtend { hand, point: *p }
                };
                game.handle(event).unwrap();
            }
        }
    }

    #[test]
    fn pattern_point_counts() {
        let mut rng = make_rng(Some(1));
        assert_eq!(PatternKind::Line.generate(&mut rng).len(), 21);
        assert_eq!(PatternKind::Circle.generate(&mut rng).len(), 37);
        assert_eq!(PatternKind::Spiral.generate(&mut rng).len(), 73);
        let line = PatternKind::Line.generate(&mut rng);
        assert!(line.iter().all(|p| (140.0..=160.0).contains(&p.x)));
    }

    #[test]
    fn round_score_blends_length_and_coverage() {
        assert_eq!(round_score(21, 21, 21), 100);
        // no strokes: 100 - 10.5 length penalty, zero coverage
        assert_eq!(round_score(0, 0, 21), 45);
        assert_eq!(round_score(30, 10, 37), 55);
    }

    #[test]
    fn five_matched_rounds_score_full() {
        let config = MirrorConfig { difficulty: DifficultyLevel::Hard, pattern: PatternKind::Circle };
        let mut game = MirrorGame::new(config, Some(2));
        game.handle(MirrorEvent::Start { at: 0 }).unwrap();
        for round in 1..=ROUNDS {
            assert_eq!(game.round(), round);
            trace(&mut game, 37);
            assert_eq!(game.stroke(Hand::Right).len(), 37);
            let step = game.handle(MirrorEvent::TimeUp { at: round as u64 * 15_000 }).unwrap();
            if round == ROUNDS {
                let outcome = step.outcome().unwrap();
                assert_eq!(outcome.score(), 100);
                assert_eq!(outcome.draft.accuracy, 100.0);
                assert_eq!(outcome.draft.duration, 75);
                assert_eq!(outcome.draft.difficulty, 3);
            }
        }
        assert_eq!(game.round_scores(), &[100; 5]);
        assert_eq!(game.phase(), GamePhase::Finished);
    }

    #[test]
    fn idle_rounds_still_average() {
        let mut game = MirrorGame::new(MirrorConfig::default(), Some(3));
        game.handle(MirrorEvent::Start { at: 0 }).unwrap();
        let mut last = Step::Continue;
        for _ in 0..ROUNDS {
            last = game.handle(MirrorEvent::TimeUp { at: 1_000 }).unwrap();
        }
        let outcome = last.outcome().unwrap();
        assert_eq!(outcome.score(), 45);
        assert_eq!(outcome.nudges[0].gain, 0.0);
    }

    #[test]
    fn strokes_before_start_are_rejected() {
        let mut game = MirrorGame::new(MirrorConfig::default(), None);
        let point = Point::new(1.0, 1.0);
        assert!(game.handle(MirrorEvent::StrokeExtend { hand: Hand::Left, point }).is_err());
    }
}
