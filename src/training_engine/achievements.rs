//! Fixed achievement catalogue, categories, and rarity.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::training_engine::bands::{self, Rarity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AchievementId {
    #[serde(rename = "first_training")]
    FirstTraining,
    #[serde(rename = "week_streak")]
    WeekStreak,
    #[serde(rename = "month_streak")]
    MonthStreak,
    #[serde(rename = "speed_demon")]
    SpeedDemon,
    #[serde(rename = "memory_master")]
    MemoryMaster,
    #[serde(rename = "focus_king")]
    FocusKing,
    #[serde(rename = "all_rounder")]
    AllRounder,
    #[serde(rename = "level_10")]
    Level10,
    #[serde(rename = "level_50")]
    Level50,
    #[serde(rename = "training_100")]
    Training100,
    #[serde(rename = "logic_master")]
    LogicMaster,
    #[serde(rename = "storyteller")]
    Storyteller,
}

/// Static description of one achievement.
struct Definition {
    id: AchievementId,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    target: u32,
}

static CATALOGUE: [Definition; 12] = [
    Definition { id: AchievementId::FirstTraining, name: "First Steps",       description: "Complete your first training session",       icon: "🚀", target: 1 },
    Definition { id: AchievementId::WeekStreak,    name: "One Week Strong",   description: "Train 7 days in a row",                      icon: "🔥", target: 7 },
    Definition { id: AchievementId::MonthStreak,   name: "Monthly Habit",     description: "Train 30 days in a row",                     icon: "💪", target: 30 },
    Definition { id: AchievementId::SpeedDemon,    name: "Speed Demon",       description: "Clear a 5x5 Schulte table in under 30 seconds", icon: "⚡", target: 1 },
    Definition { id: AchievementId::MemoryMaster,  name: "Memory Master",     description: "Reach 10 items in sequence memory",          icon: "🧠", target: 1 },
    Definition { id: AchievementId::FocusKing,     name: "Focus King",        description: "Answer 50 Stroop rounds correctly in a row", icon: "👑", target: 50 },
    Definition { id: AchievementId::AllRounder,    name: "All-Rounder",       description: "Complete every training module",             icon: "🌟", target: 7 },
    Definition { id: AchievementId::Level10,       name: "Junior Trainer",    description: "Reach level 10",                             icon: "🎖️", target: 10 },
    Definition { id: AchievementId::Level50,       name: "Senior Trainer",    description: "Reach level 50",                             icon: "🏆", target: 50 },
    Definition { id: AchievementId::Training100,   name: "Century",           description: "Complete 100 training sessions",             icon: "💯", target: 100 },
    Definition { id: AchievementId::LogicMaster,   name: "Logic Master",      description: "Adapt to 5 rule changes in one classification game", icon: "🔮", target: 1 },
    Definition { id: AchievementId::Storyteller,   name: "Storyteller",       description: "Score 90% in scene association",             icon: "📖", target: 1 },
];

impl AchievementId {
    pub const ALL: [AchievementId; 12] = [
        AchievementId::FirstTraining,
        AchievementId::WeekStreak,
        AchievementId::MonthStreak,
        AchievementId::SpeedDemon,
        AchievementId::MemoryMaster,
        AchievementId::FocusKing,
        AchievementId::AllRounder,
        AchievementId::Level10,
        AchievementId::Level50,
        AchievementId::Training100,
        AchievementId::LogicMaster,
        AchievementId::Storyteller,
    ];

    fn definition(self) -> &'static Definition {
        // CATALOGUE and ALL share an order.
        &CATALOGUE[self as usize]
    }

    /// Parse a persisted id; unknown ids yield `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.key() == key)
    }

    pub fn key(self) -> &'static str {
        match self {
            AchievementId::FirstTraining => "first_training",
            AchievementId::WeekStreak    => "week_streak",
            AchievementId::MonthStreak   => "month_streak",
            AchievementId::SpeedDemon    => "speed_demon",
            AchievementId::MemoryMaster  => "memory_master",
            AchievementId::FocusKing     => "focus_king",
            AchievementId::AllRounder    => "all_rounder",
            AchievementId::Level10       => "level_10",
            AchievementId::Level50       => "level_50",
            AchievementId::Training100   => "training_100",
            AchievementId::LogicMaster   => "logic_master",
            AchievementId::Storyteller   => "storyteller",
        }
    }

    pub fn category(self) -> AchievementCategory {
        match self {
            AchievementId::WeekStreak | AchievementId::MonthStreak => AchievementCategory::Streak,
            AchievementId::SpeedDemon
            | AchievementId::MemoryMaster
            | AchievementId::FocusKing
            | AchievementId::LogicMaster => AchievementCategory::Skill,
            AchievementId::FirstTraining
            | AchievementId::Level10
            | AchievementId::Level50
            | AchievementId::Training100 => AchievementCategory::Milestone,
            AchievementId::AllRounder | AchievementId::Storyteller => AchievementCategory::Special,
        }
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AchievementCategory {
    Streak,
    Skill,
    Milestone,
    Special,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: AchievementId,
    pub name: String,
    pub description: String,
    pub icon: String,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub unlocked_at: Option<DateTime<Utc>>,
    pub progress: u32,
    pub target: u32,
}

impl Achievement {
    pub fn new(id: AchievementId) -> Self {
        let def = id.definition();
        Achievement {
            id,
            name: def.name.to_string(),
            description: def.description.to_string(),
            icon: def.icon.to_string(),
            unlocked_at: None,
            progress: 0,
            target: def.target,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }

    pub fn rarity(&self) -> Rarity {
        bands::rarity_for(self.target)
    }

    /// Set progress (capped at target). Returns `true` when this call unlocked it.
    pub fn set_progress(&mut self, progress: u32, now: DateTime<Utc>) -> bool {
        self.progress = progress.min(self.target);
        if self.progress >= self.target && self.unlocked_at.is_none() {
            self.unlocked_at = Some(now);
            return true;
        }
        false
    }

    /// Force-unlock. Returns `true` when this call unlocked it.
    pub fn unlock(&mut self, now: DateTime<Utc>) -> bool {
        if self.unlocked_at.is_some() {
            return false;
        }
        self.unlocked_at = Some(now);
        self.progress = self.target;
        true
    }
}

/// Every achievement in catalogue order, locked.
pub fn default_achievements() -> Vec<Achievement> {
    AchievementId::ALL.into_iter().map(Achievement::new).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementSummary {
    pub unlocked: usize,
    pub total: usize,
    pub percentage: u32,
}

pub fn summarize(achievements: &[Achievement]) -> AchievementSummary {
    let unlocked = achievements.iter().filter(|a| a.is_unlocked()).count();
    let total = achievements.len();
    let percentage = if total == 0 {
        0
    } else {
        (unlocked as f64 / total as f64 * 100.0).round() as u32
    };
    AchievementSummary { unlocked, total, percentage }
}

/// Achievements grouped by category, catalogue order kept within a group.
pub fn by_category(achievements: &[Achievement], category: AchievementCategory) -> Vec<&Achievement> {
    achievements.iter().filter(|a| a.id.category() == category).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_order_matches_ids() {
        for id in AchievementId::ALL {
            assert_eq!(id.definition().id, id);
            assert_eq!(AchievementId::from_key(id.key()), Some(id));
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.key()));
        }
        assert_eq!(AchievementId::from_key("nope"), None);
    }

    #[test]
    fn progress_is_capped_and_unlocks_once() {
        let now = Utc::now();
        let mut ach = Achievement::new(AchievementId::WeekStreak);
        assert!(!ach.set_progress(3, now));
        assert!(ach.set_progress(12, now));
        assert_eq!(ach.progress, 7);
        assert!(!ach.set_progress(9, now));
        assert!(!ach.unlock(now));
    }

    #[test]
    fn summary_rounds_percentage() {
        let mut all = default_achievements();
        all[0].unlock(Utc::now());
        let s = summarize(&all);
        assert_eq!((s.unlocked, s.total, s.percentage), (1, 12, 8));
    }

    #[test]
    fn categories_cover_catalogue() {
        let all = default_achievements();
        let total: usize = [
            AchievementCategory::Streak,
            AchievementCategory::Skill,
            AchievementCategory::Milestone,
            AchievementCategory::Special,
        ]
        .into_iter()
        .map(|c| by_category(&all, c).len())
        .sum();
        assert_eq!(total, all.len());
        assert_eq!(Achievement::new(AchievementId::Training100).rarity(), Rarity::Legendary);
    }
}
