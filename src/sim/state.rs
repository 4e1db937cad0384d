//! Session state and core simulation types

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Bubble, Player, Rival, Seaweed};
use super::spawn::{BubbleKind, SpawnDirector};
use crate::tuning::Tuning;

/// Playfield size in canvas units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Finite and non-empty
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Things that happened during a frame, consumed by the game loop
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Player ate a rival
    RivalEaten { rival_size: f32, score: u64 },
    /// Level strictly increased
    LevelUp { level: u32, spawn_rate: f32 },
    /// A rival ate the player; the session is over
    PlayerEaten { final_score: u64 },
}

/// Everything owned by one play session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub score: u64,
    /// Never decreases within a session
    pub level: u32,
    /// Rival spawn-rate multiplier for the current level
    pub spawn_rate: f32,
    pub running: bool,
    /// Timestamp of the previous frame (ms)
    pub last_time: f64,
    /// Accumulated ms since the last rival spawn attempt
    pub rival_timer: f64,
    /// Accumulated ms since the last bubble spawn attempt
    pub bubble_timer: f64,
    pub player: Player,
    pub rivals: Vec<Rival>,
    pub bubbles: Vec<Bubble>,
    pub seaweeds: Vec<Seaweed>,
}

impl SessionState {
    /// Fresh session with the player centred in `bounds` and the sea decorated
    pub fn new(bounds: Bounds, now: f64, tuning: &Tuning, director: &mut SpawnDirector) -> Self {
        let player = Player::new(
            bounds.center(),
            tuning.player_initial_size,
            tuning.player_max_size,
            tuning.player_speed,
        );
        let seaweeds = (0..tuning.seaweed_count)
            .map(|_| director.spawn_seaweed(bounds))
            .collect();
        let bubbles = (0..tuning.initial_bubbles.min(tuning.max_bubbles))
            .map(|_| director.spawn_bubble(bounds, BubbleKind::Initial))
            .collect();

        Self {
            score: 0,
            level: 1,
            spawn_rate: 1.0,
            running: true,
            last_time: now,
            rival_timer: 0.0,
            bubble_timer: 0.0,
            player,
            rivals: Vec::new(),
            bubbles,
            seaweeds,
        }
    }

    /// Stop the session; further frames are not simulated
    pub fn end(&mut self) {
        self.running = false;
    }
}
