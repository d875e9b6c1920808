//! Rule-switching card sort: match each card to one of four reference piles by
//! a hidden rule (colour, shape or count) that changes after a run of correct
//! answers.

use std::fmt;

use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};

use crate::training_engine::{
    achievements::AchievementId,
    error::GameError,
    games::{
        check_index, invalid, AbilityNudge, AchievementSignal, DifficultyLevel, GameOutcome,
        GamePhase, Step, TrainingGame,
    },
    helpers::{final_score, make_rng, percent, whole_secs, Millis},
    models::{Ability, RecordDraft, TrainingType},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardColor {
    Red,
    Blue,
    Green,
    Yellow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardShape {
    Circle,
    Square,
    Triangle,
    Star,
}

impl CardShape {
    pub fn glyph(self) -> char {
        match self {
            CardShape::Circle   => '●',
            CardShape::Square   => '■',
            CardShape::Triangle => '▲',
            CardShape::Star     => '★',
        }
    }
}

const COLORS: [CardColor; 4] = [CardColor::Red, CardColor::Blue, CardColor::Green, CardColor::Yellow];
const SHAPES: [CardShape; 4] = [CardShape::Circle, CardShape::Square, CardShape::Triangle, CardShape::Star];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub color: CardColor,
    pub shape: CardShape,
    /// How many shapes are printed, 1 to 4.
    pub count: u8,
}

impl Card {
    fn random<R: Rng>(rng: &mut R) -> Self {
        Card {
            color: COLORS[rng.gen_range(0..COLORS.len())],
            shape: SHAPES[rng.gen_range(0..SHAPES.len())],
            count: rng.gen_range(1..=4),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let glyphs: String = std::iter::repeat(self.shape.glyph()).take(self.count as usize).collect();
        write!(f, "{glyphs} ({:?})", self.color)
    }
}

/// The four piles cards are sorted onto.
pub const REFERENCE_CARDS: [Card; 4] = [
    Card { color: CardColor::Red, shape: CardShape::Circle, count: 1 },
    Card { color: CardColor::Blue, shape: CardShape::Square, count: 2 },
    Card { color: CardColor::Green, shape: CardShape::Triangle, count: 3 },
    Card { color: CardColor::Yellow, shape: CardShape::Star, count: 4 },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortRule {
    Color,
    Shape,
    Number,
}

impl SortRule {
    const CYCLE: [SortRule; 3] = [SortRule::Color, SortRule::Shape, SortRule::Number];

    pub fn matches(self, card: &Card, pile: &Card) -> bool {
        match self {
            SortRule::Color  => card.color == pile.color,
            SortRule::Shape  => card.shape == pile.shape,
            SortRule::Number => card.count == pile.count,
        }
    }

    /// Colour → shape → number → colour.
    pub fn next(self) -> SortRule {
        match self {
            SortRule::Color  => SortRule::Shape,
            SortRule::Shape  => SortRule::Number,
            SortRule::Number => SortRule::Color,
        }
    }
}

impl fmt::Display for SortRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortRule::Color  => write!(f, "sort by colour"),
            SortRule::Shape  => write!(f, "sort by shape"),
            SortRule::Number => write!(f, "sort by number"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicConfig {
    pub difficulty: DifficultyLevel,
}

impl LogicConfig {
    pub fn rounds(&self) -> u32 {
        self.difficulty.pick(20, 30, 40)
    }

    /// Correct answers in a row before the rule changes.
    pub fn switch_after(&self) -> u32 {
        self.difficulty.pick(6, 4, 3)
    }
}

const BASE_POINTS: u32 = 10;
const MAX_STREAK_BONUS: u32 = 10;
const HINT_COST: u32 = 20;
const LOGIC_MASTER_CHANGES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicEvent {
    Start { at: Millis },
    /// Place the current card on pile `pile` (0-3).
    Sort { pile: usize, at: Millis },
    /// Reveal the current rule. Once per rule.
    Hint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Playing,
    Finished,
}

pub struct LogicGame {
    config: LogicConfig,
    rng: StdRng,
    state: State,
    card: Card,
    rule: SortRule,
    round: u32,
    score: u32,
    streak: u32,
    rule_changes: u32,
    hint_shown: bool,
    started: Millis,
}

impl LogicGame {
    pub fn new(config: LogicConfig, rng_seed: Option<u64>) -> Self {
        LogicGame {
            config,
            rng: make_rng(rng_seed),
            state: State::Idle,
            card: REFERENCE_CARDS[0],
            rule: SortRule::Color,
            round: 0,
            score: 0,
            streak: 0,
            rule_changes: 0,
            hint_shown: false,
            started: 0,
        }
    }

    pub fn current_card(&self) -> Option<Card> {
        (self.state == State::Playing).then_some(self.card)
    }

    /// The rule, once a hint has been bought for it.
    pub fn revealed_rule(&self) -> Option<SortRule> {
        self.hint_shown.then_some(self.rule)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn rule_changes(&self) -> u32 {
        self.rule_changes
    }

    fn change_rule(&mut self) {
        self.rule = self.rule.next();
        self.rule_changes += 1;
        self.streak = 0;
        self.hint_shown = false;
    }

    fn outcome(&self, at: Millis) -> GameOutcome {
        let rounds = self.config.rounds();
        let accuracy = percent(self.score as f64, (rounds * 20) as f64).round();
        let score = final_score(self.score as f64 / rounds as f64 * 5.0);

        let mut achievements = Vec::new();
        if self.rule_changes >= LOGIC_MASTER_CHANGES {
            achievements.push(AchievementSignal::Progress(AchievementId::LogicMaster, 1));
        }

        GameOutcome {
            draft: RecordDraft {
                training_type: TrainingType::Logic,
                score,
                accuracy,
                duration: whole_secs(self.started, at),
                difficulty: self.config.difficulty.tier(),
            },
            nudges: vec![AbilityNudge::from_score(Ability::Logic, score)],
            achievements,
        }
    }
}

impl TrainingGame for LogicGame {
    type Event = LogicEvent;

    fn training_type(&self) -> TrainingType {
        TrainingType::Logic
    }

    fn phase(&self) -> GamePhase {
        match self.state {
            State::Idle     => GamePhase::Idle,
            State::Playing  => GamePhase::Playing,
            State::Finished => GamePhase::Finished,
        }
    }

    fn handle(&mut self, event: LogicEvent) -> Result<Step, GameError> {
        match (self.state, event) {
            (State::Idle | State::Finished, LogicEvent::Start { at }) => {
                self.rule = SortRule::CYCLE[self.rng.gen_range(0..SortRule::CYCLE.len())];
                self.round = 0;
                self.score = 0;
                self.streak = 0;
                self.rule_changes = 0;
                self.hint_shown = false;
                self.started = at;
                self.card = Card::random(&mut self.rng);
                self.state = State::Playing;
                Ok(Step::Continue)
            }
            (State::Playing, LogicEvent::Hint) => {
                if !self.hint_shown {
                    self.hint_shown = true;
                    self.score = self.score.saturating_sub(HINT_COST);
                }
                Ok(Step::Continue)
            }
            (State::Playing, LogicEvent::Sort { pile, at }) => {
                check_index("pile", pile, REFERENCE_CARDS.len())?;
                if self.rule.matches(&self.card, &REFERENCE_CARDS[pile]) {
                    self.score += BASE_POINTS + (self.streak * 2).min(MAX_STREAK_BONUS);
                    self.streak += 1;
                    if self.streak >= self.config.switch_after() {
                        self.change_rule();
                    }
                } else {
                    self.streak = 0;
                }

                self.round += 1;
                if self.round >= self.config.rounds() {
                    self.state = State::Finished;
                    return Ok(Step::Finished(self.outcome(at)));
                }
                self.card = Card::random(&mut self.rng);
                Ok(Step::Continue)
            }
            (_, LogicEvent::Start { .. }) => Err(invalid(self, "start")),
            (_, LogicEvent::Sort { .. }) => Err(invalid(self, "sort")),
            (_, LogicEvent::Hint) => Err(invalid(self, "hint")),
        }
    }
}
