//! Scene association: memorize a handful of items, weave them into a story,
//! then pick them out from a list padded with distractors. Three rounds.

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::training_engine::{
    achievements::AchievementId,
    error::GameError,
    games::{
        check_index, invalid, AbilityNudge, AchievementSignal, DifficultyLevel, GameOutcome,
        GamePhase, Step, TrainingGame,
    },
    helpers::{make_rng, percent, sample, shuffled, whole_secs, Millis},
    models::{Ability, RecordDraft, TrainingType},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SceneItem {
    pub emoji: &'static str,
    pub name: &'static str,
}

const fn item(emoji: &'static str, name: &'static str) -> SceneItem {
    SceneItem { emoji, name }
}

pub const ITEMS: [SceneItem; 20] = [
    item("🍎", "apple"),
    item("🚗", "car"),
    item("📚", "books"),
    item("🌳", "tree"),
    item("🐕", "dog"),
    item("☀️", "sun"),
    item("🏠", "house"),
    item("⭐", "star"),
    item("🎈", "balloon"),
    item("🌊", "wave"),
    item("🎸", "guitar"),
    item("🍕", "pizza"),
    item("🦋", "butterfly"),
    item("🔑", "key"),
    item("⏰", "alarm clock"),
    item("🎭", "mask"),
    item("🌈", "rainbow"),
    item("🎪", "tent"),
    item("🔮", "crystal ball"),
    item("🎯", "bullseye"),
];

pub const ROUNDS: u32 = 3;
const DISTRACTORS: usize = 5;
const CORRECT_POINTS: u32 = 20;
const WRONG_PENALTY: u32 = 10;
const STORY_BONUS: u32 = 10;
/// Stories longer than this (in characters) earn the round bonus.
const STORY_BONUS_CHARS: usize = 50;
/// Stories longer than this earn the larger creativity gain.
const RICH_STORY_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneConfig {
    pub difficulty: DifficultyLevel,
}

impl SceneConfig {
    pub fn item_count(&self) -> usize {
        self.difficulty.pick(5, 7, 10)
    }

    /// Best possible total over all rounds.
    pub fn max_score(&self) -> u32 {
        self.item_count() as u32 * CORRECT_POINTS * ROUNDS + ROUNDS * STORY_BONUS
    }
}

/// Points for one recall round.
pub fn round_score(correct: usize, wrong: usize, story_chars: usize) -> u32 {
    let bonus = if story_chars > STORY_BONUS_CHARS { STORY_BONUS } else { 0 };
    (correct as u32 * CORRECT_POINTS + bonus).saturating_sub(wrong as u32 * WRONG_PENALTY)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneEvent {
    Start { at: Millis },
    /// Done memorizing; move on to writing the story.
    BeginStory,
    SubmitStory { story: String },
    /// Select or deselect a recall option.
    Toggle { option: usize },
    SubmitRecall,
    /// Leave the round review: next round, or finish after the third.
    Next { at: Millis },
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    Idle,
    Memorize,
    Create,
    Recall { options: Vec<SceneItem>, selected: Vec<bool> },
    Review { correct: usize, round_score: u32 },
    Finished,
}

pub struct SceneGame {
    config: SceneConfig,
    rng: StdRng,
    state: State,
    round: u32,
    items: Vec<SceneItem>,
    story: String,
    score: u32,
    started: Millis,
}

impl SceneGame {
    pub fn new(config: SceneConfig, rng_seed: Option<u64>) -> Self {
        SceneGame {
            config,
            rng: make_rng(rng_seed),
            state: State::Idle,
            round: 1,
            items: Vec::new(),
            story: String::new(),
            score: 0,
            started: 0,
        }
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Items to memorize this round; visible during memorize and story phases.
    pub fn items(&self) -> &[SceneItem] {
        match self.state {
            State::Memorize | State::Create => &self.items,
            _ => &[],
        }
    }

    pub fn options(&self) -> &[SceneItem] {
        match &self.state {
            State::Recall { options, .. } => options,
            _ => &[],
        }
    }

    pub fn is_selected(&self, option: usize) -> bool {
        match &self.state {
            State::Recall { selected, .. } => selected.get(option).copied().unwrap_or(false),
            _ => false,
        }
    }

    /// `(correct, round score)` while reviewing a round.
    pub fn review(&self) -> Option<(usize, u32)> {
        match self.state {
            State::Review { correct, round_score } => Some((correct, round_score)),
            _ => None,
        }
    }

    fn start_round(&mut self) {
        self.items = sample(&ITEMS, self.config.item_count(), &mut self.rng);
        self.story.clear();
        self.state = State::Memorize;
    }

    fn recall_options(&mut self) -> Vec<SceneItem> {
        let unused: Vec<SceneItem> = ITEMS
            .iter()
            .filter(|candidate| !self.items.contains(*candidate))
            .copied()
            .collect();
        let mut options = self.items.clone();
        options.extend(sample(&unused, DISTRACTORS, &mut self.rng));
        shuffled(&options, &mut self.rng)
    }

    fn outcome(&self, at: Millis) -> GameOutcome {
        let max_score = self.config.max_score();
        let accuracy = percent(self.score as f64, max_score as f64).round();
        let score = ((self.score as f64 / ROUNDS as f64).round() as u32).min(100);
        let creativity = if self.story.chars().count() > RICH_STORY_CHARS { 2.0 } else { 1.0 };

        let mut achievements = Vec::new();
        if self.score as f64 >= max_score as f64 * 0.9 {
            achievements.push(AchievementSignal::Progress(AchievementId::Storyteller, 1));
        }

        GameOutcome {
            draft: RecordDraft {
                training_type: TrainingType::Scene,
                score,
                accuracy,
                duration: whole_secs(self.started, at),
                difficulty: self.config.difficulty.tier(),
            },
            nudges: vec![
                AbilityNudge::from_score(Ability::Memory, score),
                AbilityNudge { ability: Ability::Creativity, gain: creativity },
            ],
            achievements,
        }
    }
}

impl TrainingGame for SceneGame {
    type Event = SceneEvent;

    fn training_type(&self) -> TrainingType {
        TrainingType::Scene
    }

    fn phase(&self) -> GamePhase {
        match self.state {
            State::Idle                          => GamePhase::Idle,
            State::Memorize | State::Review { .. } => GamePhase::Presenting,
            State::Create                        => GamePhase::Playing,
            State::Recall { .. }                 => GamePhase::Recalling,
            State::Finished                      => GamePhase::Finished,
        }
    }

    fn handle(&mut self, event: SceneEvent) -> Result<Step, GameError> {
        match event {
            SceneEvent::Start { at } => {
                if !matches!(self.state, State::Idle | State::Finished) {
                    return Err(invalid(self, "start"));
                }
                self.round = 1;
                self.score = 0;
                self.started = at;
                self.start_round();
                Ok(Step::Continue)
            }
            SceneEvent::BeginStory => {
                if self.state != State::Memorize {
                    return Err(invalid(self, "begin-story"));
                }
                self.state = State::Create;
                Ok(Step::Continue)
            }
            SceneEvent::SubmitStory { story } => {
                if self.state != State::Create {
                    return Err(invalid(self, "submit-story"));
                }
                self.story = story;
                let options = self.recall_options();
                self.state = State::Recall { selected: vec![false; options.len()], options };
                Ok(Step::Continue)
            }
            SceneEvent::Toggle { option } => {
                let State::Recall { selected, .. } = &mut self.state else {
                    return Err(invalid(self, "toggle"));
                };
                check_index("option", option, selected.len())?;
                selected[option] = !selected[option];
                Ok(Step::Continue)
            }
            SceneEvent::SubmitRecall => {
                let State::Recall { options, selected } = &self.state else {
                    return Err(invalid(self, "submit-recall"));
                };
                let picked: Vec<&SceneItem> = options
                    .iter()
                    .zip(selected)
                    .filter_map(|(option, on)| on.then_some(option))
                    .collect();
                let correct = picked.iter().filter(|o| self.items.contains(**o)).count();
                let wrong = picked.len() - correct;
                let round_score = round_score(correct, wrong, self.story.chars().count());
                self.score += round_score;
                self.state = State::Review { correct, round_score };
                Ok(Step::Continue)
            }
            SceneEvent::Next { at } => {
                if !matches!(self.state, State::Review { .. }) {
                    return Err(invalid(self, "next"));
                }
                if self.round < ROUNDS {
                    self.round += 1;
                    self.start_round();
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

    const LONG_STORY: &str = "The dog chased a balloon past the old house, under the rainbow, \
                              and all the way down to the waves by the shore.";

    /// Plays one round; picks every item plus `extra` distractors.
    fn play_round(game: &mut SceneGame, story: &str, extra: usize) -> (usize, u32) {
        let items = game.items().to_vec();
        game.handle(SceneEvent::BeginStory).unwrap();
        game.handle(SceneEvent::SubmitStory { story: story.to_string() }).unwrap();
        let options = game.options().to_vec();
        let mut distractors = 0;
        for (i, option) in options.iter().enumerate() {
            let is_item = items.contains(option);
            if is_item || distractors < extra {
                distractors += usize::from(!is_item);
                game.handle(SceneEvent::Toggle { option: i }).unwrap();
            }
        }
        game.handle(SceneEvent::SubmitRecall).unwrap();
        game.review().unwrap()
    }

    #[test]
    fn round_score_rules() {
        assert_eq!(round_score(5, 0, 60), 110);
        assert_eq!(round_score(5, 2, 10), 80);
        assert_eq!(round_score(0, 3, 0), 0);
    }

    #[test]
    fn recall_options_pad_with_five_distractors() {
        let config = SceneConfig { difficulty: DifficultyLevel::Hard };
        let mut game = SceneGame::new(config, Some(4));
        game.handle(SceneEvent::Start { at: 0 }).unwrap();
        assert_eq!(game.items().len(), 10);
        game.handle(SceneEvent::BeginStory).unwrap();
        game.handle(SceneEvent::SubmitStory { story: String::new() }).unwrap();
        assert_eq!(game.options().len(), 15);
        game.handle(SceneEvent::Toggle { option: 3 }).unwrap();
        assert!(game.is_selected(3));
        game.handle(SceneEvent::Toggle { option: 3 }).unwrap();
        assert!(!game.is_selected(3));
    }

    #[test]
    fn perfect_game_unlocks_storyteller() {
        let mut game = SceneGame::new(SceneConfig::default(), Some(9));
        game.handle(SceneEvent::Start { at: 0 }).unwrap();
        let mut outcome = None;
        for round in 1..=ROUNDS {
            assert_eq!(play_round(&mut game, LONG_STORY, 0), (5, 110));
            outcome = game.handle(SceneEvent::Next { at: round as u64 * 60_000 }).unwrap().outcome();
        }
        let outcome = outcome.unwrap();
        assert_eq!(game.score(), 330);
        assert_eq!(outcome.score(), 100);
        assert_eq!(outcome.draft.accuracy, 100.0);
        assert_eq!(outcome.draft.duration, 180);
        assert_eq!(outcome.nudges[1], AbilityNudge { ability: Ability::Creativity, gain: 2.0 });
        assert_eq!(
            outcome.achievements,
            vec![AchievementSignal::Progress(AchievementId::Storyteller, 1)]
        );
    }

    #[test]
    fn distractors_and_short_stories_cost_points() {
        let mut game = SceneGame::new(SceneConfig::default(), Some(2));
        game.handle(SceneEvent::Start { at: 0 }).unwrap();
        let mut last = Step::Continue;
        for _ in 0..ROUNDS {
            assert_eq!(play_round(&mut game, "short", 2), (5, 80));
            last = game.handle(SceneEvent::Next { at: 90_000 }).unwrap();
        }
        let outcome = last.outcome().unwrap();
        assert_eq!(outcome.score(), 80);
        // 240 / 330
        assert_eq!(outcome.draft.accuracy, 73.0);
        assert_eq!(outcome.nudges[1].gain, 1.0);
        assert!(outcome.achievements.is_empty());
    }

    #[test]
    fn out_of_order_events_are_rejected() {
        let mut game = SceneGame::new(SceneConfig::default(), None);
        assert!(game.handle(SceneEvent::BeginStory).is_err());
        game.handle(SceneEvent::Start { at: 0 }).unwrap();
        assert!(game.handle(SceneEvent::SubmitRecall).is_err());
        assert!(matches!(
            game.handle(SceneEvent::Toggle { option: 0 }),
            Err(GameError::InvalidEvent { phase: GamePhase::Presenting, .. })
        ));
    }
}
