//! Data-driven game balance
//!
//! Defaults mirror [`crate::consts`]; any field missing from a JSON document
//! falls back to its default.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Tunable simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player_initial_size: f32,
    pub player_max_size: f32,
    /// Units moved per frame
    pub player_speed: f32,
    pub growth_factor: f32,
    pub contact_factor: f32,
    pub eat_ratio: f32,
    /// Off-screen margin in multiples of the rival's size
    pub offscreen_margin: f32,
    pub rival_spawn_interval_ms: f64,
    pub bubble_spawn_interval_ms: f64,
    pub max_rivals: usize,
    pub max_bubbles: usize,
    pub seaweed_count: usize,
    pub initial_bubbles: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_initial_size: PLAYER_INITIAL_SIZE,
            player_max_size: PLAYER_MAX_SIZE,
            player_speed: PLAYER_SPEED,
            growth_factor: GROWTH_FACTOR,
            contact_factor: CONTACT_FACTOR,
            eat_ratio: EAT_RATIO,
            offscreen_margin: OFFSCREEN_MARGIN,
            rival_spawn_interval_ms: RIVAL_SPAWN_INTERVAL_MS,
            bubble_spawn_interval_ms: BUBBLE_SPAWN_INTERVAL_MS,
            max_rivals: MAX_RIVALS,
            max_bubbles: MAX_BUBBLES,
            seaweed_count: SEAWEED_COUNT,
            initial_bubbles: INITIAL_BUBBLES,
        }
    }
}

impl Tuning {
    /// Parse tuning overrides from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Self = serde_json::from_str(json)?;
        log::info!("Loaded tuning overrides");
        Ok(tuning)
    }

    /// Enemy-timer threshold for a given spawn-rate multiplier
    pub fn rival_interval(&self, spawn_rate: f32) -> f64 {
        self.rival_spawn_interval_ms / f64::from(spawn_rate.max(f32::EPSILON))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "max_rivals": 3, "player_speed": 7.5 }"#).unwrap();
        assert_eq!(tuning.max_rivals, 3);
        assert_eq!(tuning.player_speed, 7.5);
        assert_eq!(tuning.max_bubbles, MAX_BUBBLES);
        assert_eq!(tuning.eat_ratio, EAT_RATIO);
    }

    #[test]
    fn test_bad_json_is_rejected() {
        assert!(Tuning::from_json("{ not json").is_err());
    }

    #[test]
    fn test_rival_interval_scales_with_rate() {
        let tuning = Tuning::default();
        assert_eq!(tuning.rival_interval(1.0), 2000.0);
        assert!((tuning.rival_interval(1.5) - 2000.0 / 1.5).abs() < 1e-6);
    }
}
