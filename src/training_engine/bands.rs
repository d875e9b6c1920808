//! Ordered boundary tables for every score-band decision.
//!
//! Each table is a list of `(edge, value)` pairs checked top to bottom; the
//! first edge the input falls under wins, otherwise the table's `top` value
//! applies. Keeping edges as data makes each boundary visible in one place and
//! testable on its own.

use serde::{Deserialize, Serialize};

use crate::training_engine::models::{DifficultyTier, Trend};

/// Upper edge of a band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Edge {
    /// `x < limit`
    Below(f64),
    /// `x <= limit`
    AtMost(f64),
}

impl Edge {
    fn contains(self, x: f64) -> bool {
        match self {
            Edge::Below(limit)  => x < limit,
            Edge::AtMost(limit) => x <= limit,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BandTable<T: Copy + 'static> {
    pub bands: &'static [(Edge, T)],
    pub top: T,
}

impl<T: Copy + 'static> BandTable<T> {
    pub fn lookup(&self, x: f64) -> T {
        self.bands
            .iter()
            .find(|(edge, _)| edge.contains(x))
            .map(|&(_, value)| value)
            .unwrap_or(self.top)
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Average score → base difficulty tier.
pub const DIFFICULTY_BANDS: BandTable<u8> = BandTable {
    bands: &[
        (Edge::Below(40.0), 1),
        (Edge::Below(55.0), 2),
        (Edge::Below(70.0), 3),
        (Edge::Below(85.0), 4),
    ],
    top: 5,
};

/// Recent-minus-older average → trend, with a ±5 deadband.
pub const TREND_BANDS: BandTable<Trend> = BandTable {
    bands: &[
        (Edge::Below(-5.0), Trend::Declining),
        (Edge::AtMost(5.0), Trend::Stable),
    ],
    top: Trend::Improving,
};

/// Final game score → ability points gained (`> 70` → 2, `> 50` → 1).
pub const GAIN_BANDS: BandTable<u8> = BandTable {
    bands: &[
        (Edge::AtMost(50.0), 0),
        (Edge::AtMost(70.0), 1),
    ],
    top: 2,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AbilityAdvice {
    TrainDaily,
    MaintainPace,
    TryHarder,
    MaintainExcellence,
}

impl AbilityAdvice {
    pub fn message(self) -> &'static str {
        match self {
            AbilityAdvice::TrainDaily =>
                "Train more often: aim for at least one session every day.",
            AbilityAdvice::MaintainPace =>
                "Keep your current pace and raise the difficulty step by step.",
            AbilityAdvice::TryHarder =>
                "Good results. Try a harder challenge.",
            AbilityAdvice::MaintainExcellence =>
                "Excellent! Keep training to stay at this level.",
        }
    }
}

/// Current ability score → advice.
pub const ADVICE_BANDS: BandTable<AbilityAdvice> = BandTable {
    bands: &[
        (Edge::Below(40.0), AbilityAdvice::TrainDaily),
        (Edge::Below(60.0), AbilityAdvice::MaintainPace),
        (Edge::Below(80.0), AbilityAdvice::TryHarder),
    ],
    top: AbilityAdvice::MaintainExcellence,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

/// Achievement target → rarity.
pub const RARITY_BANDS: BandTable<Rarity> = BandTable {
    bands: &[
        (Edge::Below(10.0), Rarity::Common),
        (Edge::Below(50.0), Rarity::Rare),
        (Edge::Below(100.0), Rarity::Epic),
    ],
    top: Rarity::Legendary,
};

/// Score below which a recommendation calls the ability weak.
pub const WEAK_ABILITY_BELOW: f64 = 40.0;

/// Whole days without practice before a module is flagged for review.
pub const REVIEW_AFTER_DAYS: i64 = 3;

pub fn base_difficulty(average: f64) -> DifficultyTier {
    DifficultyTier::new(DIFFICULTY_BANDS.lookup(average))
}

pub fn trend_for_delta(delta: f64) -> Trend {
    TREND_BANDS.lookup(delta)
}

/// Shared ability nudge after a game: `> 70` → +2, `> 50` → +1, else 0.
pub fn ability_gain(score: u32) -> f64 {
    GAIN_BANDS.lookup(score as f64) as f64
}

pub fn advice_for(score: f64) -> AbilityAdvice {
    ADVICE_BANDS.lookup(score)
}

pub fn rarity_for(target: u32) -> Rarity {
    RARITY_BANDS.lookup(target as f64)
}
