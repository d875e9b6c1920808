use std::{env, path::PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Store configuration. Every field has a default, so partial JSON loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    /// Key the user-data blob is stored under.
    pub storage_key: String,
    /// Maximum records retained, newest kept.
    pub history_limit: usize,
    /// Daily goal in minutes for fresh profiles.
    pub default_daily_goal: u32,
    /// Directory for [`FileBackend`](crate::training_engine::persistence::FileBackend).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

pub const DEFAULT_STORAGE_KEY: &str = "brain_training_user_data";
pub const DEFAULT_HISTORY_LIMIT: usize = 500;
pub const DEFAULT_DAILY_GOAL: u32 = 15;

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            default_daily_goal: DEFAULT_DAILY_GOAL,
            data_dir: None,
        }
    }
}

impl StoreConfig {
    /// Defaults overlaid with `BRAIN_DRILL_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().overlay(|name| env::var(name).ok())
    }

    fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup("BRAIN_DRILL_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = lookup("BRAIN_DRILL_HISTORY_LIMIT") {
            match raw.parse::<usize>() {
                Ok(limit) if limit > 0 => self.history_limit = limit,
                _ => warn!(value = %raw, "ignoring invalid BRAIN_DRILL_HISTORY_LIMIT"),
            }
        }
        if let Some(raw) = lookup("BRAIN_DRILL_DAILY_GOAL") {
            match raw.parse::<u32>() {
                Ok(goal) => self.default_daily_goal = goal,
                Err(_) => warn!(value = %raw, "ignoring invalid BRAIN_DRILL_DAILY_GOAL"),
            }
        }
        self
    }
}
