use thiserror::Error;

use crate::training_engine::{games::GamePhase, models::TrainingType};

/// Failures raised by storage backends. The [`TrainingStore`] facade logs and
/// absorbs these; only direct backend callers ever see them.
///
/// [`TrainingStore`]: crate::training_engine::store::TrainingStore
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage I/O failed for key '{key}'")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("stored payload is not valid JSON")]
    Json(#[from] serde_json::Error),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Illegal events fed to a game or assessment state machine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error("{game}: event '{event}' is not valid while {phase}")]
    InvalidEvent {
        game: GameKind,
        phase: GamePhase,
        event: &'static str,
    },

    #[error("{what} index {index} is out of range (len {len})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
}

/// Which state machine rejected an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameKind {
    Training(TrainingType),
    Assessment,
}

impl std::fmt::Display for GameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameKind::Training(t) => write!(f, "{}", t),
            GameKind::Assessment  => write!(f, "Assessment"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("unknown training plan '{0}'")]
    UnknownPlan(String),

    #[error("no plan is active")]
    NoActivePlan,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
