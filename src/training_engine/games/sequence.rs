//! Sequence memory: watch a sequence of items, then pick them back in order.
//! Each cleared level lengthens the next sequence by one; the first wrong pick
//! ends the game.

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::training_engine::{
    achievements::AchievementId,
    error::GameError,
    games::{
        check_index, invalid, AbilityNudge, AchievementSignal, GameOutcome, GamePhase, Step,
        TrainingGame,
    },
    helpers::{make_rng, percent, sample, shuffle, whole_secs, Millis},
    models::{Ability, RecordDraft, TrainingType},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryItem {
    pub value: &'static str,
    pub category: &'static str,
}

const fn item(value: &'static str, category: &'static str) -> MemoryItem {
    MemoryItem { value, category }
}

const EMOJI: [MemoryItem; 16] = [
    item("🍎", "fruit"),
    item("🍌", "fruit"),
    item("🍊", "fruit"),
    item("🍇", "fruit"),
    item("🥕", "vegetable"),
    item("🥦", "vegetable"),
    item("🌽", "vegetable"),
    item("🍅", "vegetable"),
    item("🐶", "animal"),
    item("🐱", "animal"),
    item("🐰", "animal"),
    item("🐻", "animal"),
    item("🚗", "transport"),
    item("🚌", "transport"),
    item("✈️", "transport"),
    item("🚢", "transport"),
];

const COLORS: [MemoryItem; 8] = [
    item("red", "warm"),
    item("orange", "warm"),
    item("yellow", "warm"),
    item("pink", "warm"),
    item("blue", "cool"),
    item("green", "cool"),
    item("purple", "cool"),
    item("cyan", "cool"),
];

const SHAPES: [MemoryItem; 8] = [
    item("circle", "curved"),
    item("ellipse", "curved"),
    item("square", "straight"),
    item("triangle", "straight"),
    item("rectangle", "straight"),
    item("diamond", "straight"),
    item("star", "compound"),
    item("hexagon", "compound"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    #[default]
    Emoji,
    Color,
    Shape,
}

impl ItemKind {
    pub fn pool(self) -> &'static [MemoryItem] {
        match self {
            ItemKind::Emoji => &EMOJI,
            ItemKind::Color => &COLORS,
            ItemKind::Shape => &SHAPES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceConfig {
    pub item_kind: ItemKind,
    /// 3, 4 or 5 in the presenter; any positive length works.
    pub start_length: u32,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        SequenceConfig { item_kind: ItemKind::Emoji, start_length: 3 }
    }
}

const MAX_DISTRACTORS: usize = 4;
const MEMORY_MASTER_LEVEL: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceEvent {
    Start { at: Millis },
    /// The presenter finished showing the sequence.
    RevealDone,
    /// Index into [`SequenceGame::options`].
    Select { option: usize, at: Millis },
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    Idle,
    Showing,
    Recalling { options: Vec<MemoryItem>, answered: usize },
    Finished,
}

pub struct SequenceGame {
    config: SequenceConfig,
    rng: StdRng,
    state: State,
    level: u32,
    max_level: u32,
    score: u32,
    sequence: Vec<MemoryItem>,
    started: Millis,
}

impl SequenceGame {
    pub fn new(config: SequenceConfig, rng_seed: Option<u64>) -> Self {
        let start = config.start_length.max(1);
        SequenceGame {
            config: SequenceConfig { start_length: start, ..config },
            rng: make_rng(rng_seed),
            state: State::Idle,
            level: start,
            max_level: start,
            score: 0,
            sequence: Vec::new(),
            started: 0,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// The sequence to show. Hidden once recall begins.
    pub fn sequence(&self) -> &[MemoryItem] {
        match self.state {
            State::Showing => &self.sequence,
            _ => &[],
        }
    }

    pub fn options(&self) -> &[MemoryItem] {
        match &self.state {
            State::Recalling { options, .. } => options,
            _ => &[],
        }
    }

    /// Number of items already recalled this level.
    pub fn answered(&self) -> usize {
        match &self.state {
            State::Recalling { answered, .. } => *answered,
            _ => 0,
        }
    }

    /// Sequences never repeat an item, so long levels are capped at the pool size.
    fn begin_level(&mut self) {
        self.sequence = sample(self.config.item_kind.pool(), self.level as usize, &mut self.rng);
        self.state = State::Showing;
    }

    fn recall_options(&mut self) -> Vec<MemoryItem> {
        let pool = self.config.item_kind.pool();
        let unused: Vec<MemoryItem> = pool
            .iter()
            .filter(|candidate| !self.sequence.contains(*candidate))
            .copied()
            .collect();
        let distractors = MAX_DISTRACTORS.min(pool.len().saturating_sub(self.sequence.len()));
        let mut options = self.sequence.clone();
        options.extend(sample(&unused, distractors, &mut self.rng));
        shuffle(&mut options, &mut self.rng);
        options
    }

    fn outcome(&self, at: Millis) -> GameOutcome {
        let start = self.config.start_length;
        let accuracy = percent(self.score as f64, (self.max_level * 10) as f64)
            .round()
            .min(100.0);
        let score = (self.score + (self.max_level - start) * 15).min(100);

        let mut achievements = Vec::new();
        if self.max_level >= MEMORY_MASTER_LEVEL {
            achievements.push(AchievementSignal::Progress(AchievementId::MemoryMaster, 1));
        }

        GameOutcome {
            draft: RecordDraft {
                training_type: TrainingType::SequenceMemory,
                score,
                accuracy,
                duration: whole_secs(self.started, at),
                difficulty: self.max_level,
            },
            nudges: vec![AbilityNudge::from_score(Ability::Memory, score)],
            achievements,
        }
    }
}

impl TrainingGame for SequenceGame {
    type Event = SequenceEvent;

    fn training_type(&self) -> TrainingType {
        TrainingType::SequenceMemory
    }

    fn phase(&self) -> GamePhase {
        match self.state {
            State::Idle              => GamePhase::Idle,
            State::Showing           => GamePhase::Presenting,
            State::Recalling { .. }  => GamePhase::Recalling,
            State::Finished          => GamePhase::Finished,
        }
    }

    fn handle(&mut self, event: SequenceEvent) -> Result<Step, GameError> {
        match event {
            SequenceEvent::Start { at } => {
                if !matches!(self.state, State::Idle | State::Finished) {
                    return Err(invalid(self, "start"));
                }
                self.level = self.config.start_length;
                self.max_level = self.level;
                self.score = 0;
                self.started = at;
                self.begin_level();
                Ok(Step::Continue)
            }
            SequenceEvent::RevealDone => {
                if self.state != State::Showing {
                    return Err(invalid(self, "reveal-done"));
                }
                let options = self.recall_options();
                self.state = State::Recalling { options, answered: 0 };
                Ok(Step::Continue)
            }
            SequenceEvent::Select { option, at } => {
                let State::Recalling { options, answered } = &mut self.state else {
                    return Err(invalid(self, "select"));
                };
                check_index("option", option, options.len())?;

                if options[option] != self.sequence[*answered] {
                    self.state = State::Finished;
                    return Ok(Step::Finished(self.outcome(at)));
                }
                *answered += 1;
                if *answered < self.sequence.len() {
                    return Ok(Step::Continue);
                }

                self.score += self.level * 10;
                self.max_level = self.max_level.max(self.level);
                self.level += 1;
                self.begin_level();
                Ok(Step::Continue)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recall_level(game: &mut SequenceGame, at: Millis) -> Step {
        let expected = game.sequence().to_vec();
        game.handle(SequenceEvent::RevealDone).unwrap();
        let mut last = Step::Continue;
        for wanted in expected {
            let option = game.options().iter().position(|o| *o == wanted).unwrap();
            last = game.handle(SequenceEvent::Select { option, at }).unwrap();
        }
        last
    }

    fn fail(game: &mut SequenceGame, at: Millis) -> GameOutcome {
        let first = game.sequence()[0];
        game.handle(SequenceEvent::RevealDone).unwrap();
        let option = game.options().iter().position(|o| *o != first).unwrap();
        game.handle(SequenceEvent::Select { option, at }).unwrap().outcome().unwrap()
    }

    #[test]
    fn options_hold_sequence_plus_distractors() {
        let mut game = SequenceGame::new(SequenceConfig::default(), Some(9));
        game.handle(SequenceEvent::Start { at: 0 }).unwrap();
        assert_eq!(game.phase(), GamePhase::Presenting);
        let shown = game.sequence().to_vec();
        assert_eq!(shown.len(), 3);
        game.handle(SequenceEvent::RevealDone).unwrap();
        assert!(game.sequence().is_empty());
        assert_eq!(game.options().len(), 7);
        assert!(shown.iter().all(|s| game.options().contains(s)));
    }

    #[test]
    fn small_pools_get_fewer_distractors() {
        let config = SequenceConfig { item_kind: ItemKind::Color, start_length: 5 };
        let mut game = SequenceGame::new(config, Some(2));
        game.handle(SequenceEvent::Start { at: 0 }).unwrap();
        game.handle(SequenceEvent::RevealDone).unwrap();
        assert_eq!(game.options().len(), 8);
    }

    #[test]
    fn clearing_levels_then_failing() {
        let mut game = SequenceGame::new(SequenceConfig::default(), Some(4));
        game.handle(SequenceEvent::Start { at: 0 }).unwrap();
        assert_eq!(recall_level(&mut game, 5_000), Step::Continue);
        assert_eq!(game.level(), 4);
        assert_eq!(recall_level(&mut game, 10_000), Step::Continue);
        assert_eq!(game.score(), 70);

        let outcome = fail(&mut game, 12_000);
        // 70 + (4 - 3) * 15
        assert_eq!(outcome.score(), 85);
        assert_eq!(outcome.draft.accuracy, 100.0);
        assert_eq!(outcome.draft.difficulty, 4);
        assert_eq!(outcome.draft.duration, 12);
        assert_eq!(outcome.nudges[0].gain, 2.0);
        assert_eq!(game.phase(), GamePhase::Finished);
    }

    #[test]
    fn immediate_failure_scores_zero() {
        let mut game = SequenceGame::new(SequenceConfig::default(), Some(6));
        game.handle(SequenceEvent::Start { at: 0 }).unwrap();
        let outcome = fail(&mut game, 3_000);
        assert_eq!(outcome.score(), 0);
        assert_eq!(outcome.draft.accuracy, 0.0);
        assert_eq!(outcome.draft.difficulty, 3);
    }

    #[test]
    fn reaching_level_ten_reports_memory_master() {
        let config = SequenceConfig { item_kind: ItemKind::Emoji, start_length: 5 };
        let mut game = SequenceGame::new(config, Some(10));
        game.handle(SequenceEvent::Start { at: 0 }).unwrap();
        while game.level() <= 10 {
            recall_level(&mut game, 1_000);
        }
        let outcome = fail(&mut game, 2_000);
        assert_eq!(outcome.score(), 100);
        assert!(outcome
            .achievements
            .contains(&AchievementSignal::Progress(AchievementId::MemoryMaster, 1)));
    }

    #[test]
    fn selecting_while_showing_is_rejected() {
        let mut game = SequenceGame::new(SequenceConfig::default(), Some(1));
        game.handle(SequenceEvent::Start { at: 0 }).unwrap();
        assert!(game.handle(SequenceEvent::Select { option: 0, at: 0 }).is_err());
    }
}
