use serde::{Deserialize, Serialize};

use super::gains::Statgain;

/// A character level and what happened while the character was at it.
///
/// Only `level` and `turn_reached` come from the log; the rest is filled in
/// by the finalizer once all turns are known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub level: u32,
    pub turn_reached: u32,
    pub combat_turns: u32,
    pub noncombat_turns: u32,
    pub other_turns: u32,
    pub stats_at_level_reached: Statgain,
    pub stat_gain_per_turn: f64,
}

impl LevelData {
    /// # Panics
    /// If `level` is zero.
    pub fn new(level: u32, turn_reached: u32) -> Self {
        assert!(level >= 1, "levels start at 1");
        Self {
            level,
            turn_reached,
            combat_turns: 0,
            noncombat_turns: 0,
            other_turns: 0,
            stats_at_level_reached: Statgain::NONE,
            stat_gain_per_turn: 0.0,
        }
    }

    pub fn total_turns(&self) -> u32 {
        self.combat_turns + self.noncombat_turns + self.other_turns
    }
}
