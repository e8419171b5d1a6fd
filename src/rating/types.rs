use serde::{Deserialize, Serialize};

/// Points each side of a match moves before per-player adjustments
///
/// Both values are magnitudes: winners gain `winner_gain`, losers lose `loser_loss`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideDeltas {
    pub winner_gain: i32,
    pub loser_loss: i32,
}

impl SideDeltas {
    pub fn symmetric(delta: i32) -> Self {
        Self {
            winner_gain: delta,
            loser_loss: delta,
        }
    }
}
