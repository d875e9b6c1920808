//! Structured multi-day training plans.
//!
//! The catalogue is static. Each plan lists a handful of scripted days; days
//! past the script repeat it from the top. Progress (which plan is active and
//! which day each plan has reached) is stored under its own key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::training_engine::{
    error::{PlanError, StoreResult},
    models::{Ability, TrainingType},
    persistence::StorageBackend,
};
use TrainingType::{Auditory, Logic, Mirror, Schulte, Scene, SequenceMemory, Stroop};

pub const PLAN_PROGRESS_KEY: &str = "trainingPlanProgress";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PlanLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl std::fmt::Display for PlanLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanLevel::Beginner     => write!(f, "beginner"),
            PlanLevel::Intermediate => write!(f, "intermediate"),
            PlanLevel::Advanced     => write!(f, "advanced"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSession {
    pub training_type: TrainingType,
    pub label: &'static str,
    /// Minutes.
    pub minutes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDay {
    pub day: u32,
    pub title: &'static str,
    pub sessions: &'static [PlanSession],
    pub tip: &'static str,
}

impl PlanDay {
    pub fn total_minutes(&self) -> u32 {
        self.sessions.iter().map(|s| s.minutes).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingPlan {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Length of the plan in days.
    pub duration: u32,
    pub daily_minutes: u32,
    pub target_ability: Ability,
    pub level: PlanLevel,
    pub icon: &'static str,
    pub days: &'static [PlanDay],
}

impl TrainingPlan {
    /// Scripted content for a one-based `day`; the script wraps around.
    pub fn day(&self, day: u32) -> Option<&'static PlanDay> {
        if day == 0 || day > self.duration || self.days.is_empty() {
            return None;
        }
        self.days.get((day as usize - 1) % self.days.len())
    }
}

const fn session(training_type: TrainingType, label: &'static str, minutes: u32) -> PlanSession {
    PlanSession { training_type, label, minutes }
}

static FOCUS_DAYS: [PlanDay; 7] = [
    PlanDay {
        day: 1,
        title: "Getting started",
        sessions: &[session(Schulte, "Schulte table", 5), session(Stroop, "Stroop", 5)],
        tip: "Stay relaxed and don't rush.",
    },
    PlanDay {
        day: 2,
        title: "Visual scanning",
        sessions: &[session(Schulte, "Schulte table", 8), session(Stroop, "Stroop", 7)],
        tip: "Try to take in the whole grid with peripheral vision.",
    },
    PlanDay {
        day: 3,
        title: "Resisting distraction",
        sessions: &[session(Stroop, "Stroop", 10), session(Auditory, "Auditory attention", 5)],
        tip: "Focus on the task and ignore the distracting cue.",
    },
    PlanDay {
        day: 4,
        title: "Mixed practice",
        sessions: &[
            session(Schulte, "Schulte table", 5),
            session(Stroop, "Stroop", 5),
            session(Auditory, "Auditory attention", 5),
        ],
        tip: "Keep a steady rhythm.",
    },
    PlanDay {
        day: 5,
        title: "Stepping up",
        sessions: &[session(Schulte, "Schulte table 4x4", 8), session(Stroop, "Stroop (medium)", 7)],
        tip: "Push past your comfort zone with a harder setting.",
    },
    PlanDay {
        day: 6,
        title: "Rest day",
        sessions: &[session(Scene, "Easy association", 10)],
        tip: "Rest is part of training too.",
    },
    PlanDay {
        day: 7,
        title: "Weekly review",
        sessions: &[
            session(Schulte, "Schulte table", 5),
            session(Stroop, "Stroop", 5),
            session(Auditory, "Auditory attention", 5),
        ],
        tip: "Look back at this week's progress before the next one.",
    },
];

static MEMORY_DAYS: [PlanDay; 3] = [
    PlanDay {
        day: 1,
        title: "Memory basics",
        sessions: &[session(SequenceMemory, "Sequence memory", 10), session(Scene, "Scene association", 10)],
        tip: "Try to picture the information.",
    },
    PlanDay {
        day: 2,
        title: "Number memory",
        sessions: &[session(SequenceMemory, "Sequence memory", 15), session(Auditory, "Auditory memory", 5)],
        tip: "Use a number-to-image code.",
    },
    PlanDay {
        day: 3,
        title: "Story memory",
        sessions: &[session(Scene, "Scene association", 15), session(SequenceMemory, "Sequence memory", 5)],
        tip: "Make the story vivid and funny.",
    },
];

static LOGIC_DAYS: [PlanDay; 2] = [
    PlanDay {
        day: 1,
        title: "Learning rules",
        sessions: &[session(Logic, "Rule sorting", 15)],
        tip: "Watch for the moment the rule changes.",
    },
    PlanDay {
        day: 2,
        title: "Pattern spotting",
        sessions: &[session(Logic, "Rule sorting", 10), session(SequenceMemory, "Sequence reasoning", 5)],
        tip: "Look for the hidden pattern.",
    },
];

static COORDINATION_DAYS: [PlanDay; 2] = [
    PlanDay {
        day: 1,
        title: "Basic coordination",
        sessions: &[session(Mirror, "Mirror drawing", 15)],
        tip: "Keep both hands in step.",
    },
    PlanDay {
        day: 2,
        title: "Further practice",
        sessions: &[session(Mirror, "Mirror drawing", 10), session(Schulte, "Visual tracking", 5)],
        tip: "Try a different pattern.",
    },
];

pub static PLANS: [TrainingPlan; 4] = [
    TrainingPlan {
        id: "focus-21",
        name: "21-Day Focus Builder",
        description: "Systematic attention drills to sharpen focus and resistance to distraction.",
        duration: 21,
        daily_minutes: 15,
        target_ability: Ability::Attention,
        level: PlanLevel::Beginner,
        icon: "🎯",
        days: &FOCUS_DAYS,
    },
    TrainingPlan {
        id: "memory-14",
        name: "14-Day Memory Boost",
        description: "Memory techniques for stronger short- and long-term recall.",
        duration: 14,
        daily_minutes: 20,
        target_ability: Ability::Memory,
        level: PlanLevel::Intermediate,
        icon: "🧠",
        days: &MEMORY_DAYS,
    },
    TrainingPlan {
        id: "logic-7",
        name: "7-Day Logic Sprint",
        description: "A quick course in reasoning and problem solving.",
        duration: 7,
        daily_minutes: 15,
        target_ability: Ability::Logic,
        level: PlanLevel::Advanced,
        icon: "🔮",
        days: &LOGIC_DAYS,
    },
    TrainingPlan {
        id: "coordination-10",
        name: "10-Day Coordination Course",
        description: "Left-right coordination and motor control.",
        duration: 10,
        daily_minutes: 15,
        target_ability: Ability::Coordination,
        level: PlanLevel::Beginner,
        icon: "🤹",
        days: &COORDINATION_DAYS,
    },
];

pub fn find_plan(id: &str) -> Option<&'static TrainingPlan> {
    PLANS.iter().find(|p| p.id == id)
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// What today's session of the active plan looks like.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanToday {
    pub plan: &'static TrainingPlan,
    pub day: u32,
    pub content: &'static PlanDay,
    /// Percent of the plan reached, `day / duration`.
    pub percent: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStep {
    Advanced { day: u32 },
    PlanFinished,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanProgress {
    #[serde(default)]
    pub active_plan: Option<String>,
    /// Current one-based day per plan id.
    #[serde(default)]
    pub days: BTreeMap<String, u32>,
    #[serde(default)]
    pub finished: Vec<String>,
}

impl PlanProgress {
    pub fn load<B: StorageBackend + ?Sized>(backend: &B) -> Self {
        match backend.read(PLAN_PROGRESS_KEY) {
            Ok(Some(payload)) => serde_json::from_str(&payload).unwrap_or_else(|err| {
                warn!(error = %err, "unreadable plan progress, starting empty");
                PlanProgress::default()
            }),
            Ok(None) => PlanProgress::default(),
            Err(err) => {
                warn!(error = %err, "failed to read plan progress");
                PlanProgress::default()
            }
        }
    }

    pub fn save<B: StorageBackend + ?Sized>(&self, backend: &mut B) -> StoreResult<()> {
        let payload = serde_json::to_string(self)?;
        backend.write(PLAN_PROGRESS_KEY, &payload)
    }

    /// Make `id` the active plan, restarting it at day 1.
    pub fn start_plan(&mut self, id: &str) -> Result<&'static TrainingPlan, PlanError> {
        let plan = find_plan(id).ok_or_else(|| PlanError::UnknownPlan(id.to_string()))?;
        self.active_plan = Some(plan.id.to_string());
        self.days.insert(plan.id.to_string(), 1);
        self.finished.retain(|f| f != plan.id);
        info!(plan = plan.id, "training plan started");
        Ok(plan)
    }

    pub fn active_plan(&self) -> Option<&'static TrainingPlan> {
        self.active_plan.as_deref().and_then(find_plan)
    }

    /// Day reached in `id`, zero if never started.
    pub fn day_of(&self, id: &str) -> u32 {
        self.days.get(id).copied().unwrap_or(0)
    }

    pub fn today(&self) -> Option<PlanToday> {
        let plan = self.active_plan()?;
        let day = self.day_of(plan.id).max(1);
        let content = plan.day(day)?;
        Some(PlanToday { plan, day, content, percent: day * 100 / plan.duration })
    }

    /// Mark the active plan's current day done. The last day clears the
    /// active plan and files it under `finished`.
    pub fn complete_day(&mut self) -> Result<DayStep, PlanError> {
        let plan = self.active_plan().ok_or(PlanError::NoActivePlan)?;
        let day = self.day_of(plan.id).max(1);
        if day >= plan.duration {
            self.active_plan = None;
            self.days.insert(plan.id.to_string(), plan.duration);
            if !self.finished.iter().any(|f| f == plan.id) {
                self.finished.push(plan.id.to_string());
            }
            info!(plan = plan.id, "training plan finished");
            return Ok(DayStep::PlanFinished);
        }
        self.days.insert(plan.id.to_string(), day + 1);
        Ok(DayStep::Advanced { day: day + 1 })
    }

    pub fn abandon(&mut self) {
        self.active_plan = None;
    }
}
