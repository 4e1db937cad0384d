//! Level policy: score to level and level to spawn rate

use crate::consts::{LEVEL_SCORE_STEP, SPAWN_RATE_BASE, SPAWN_RATE_STEP};

/// `floor(score / 500) + 1`
pub fn level_for_score(score: u64) -> u32 {
    u32::try_from(score / LEVEL_SCORE_STEP)
        .unwrap_or(u32::MAX - 1)
        .saturating_add(1)
}

/// Spawn-rate multiplier for a level.
///
/// Level 1 spawns at the base interval. Each level-up sets the rate from the
/// level being left, `1.5 + (previous - 1) * 0.3`, so level 2 runs at 1.5.
pub fn spawn_rate_for_level(level: u32) -> f32 {
    if level <= 1 {
        1.0
    } else {
        SPAWN_RATE_BASE + (level - 2) as f32 * SPAWN_RATE_STEP
    }
}
