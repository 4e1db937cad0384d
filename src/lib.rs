//! Fish Frenzy - a big-fish-eats-small-fish arcade game
//!
//! Core modules:
//! - `sim`: Frame simulation (entities, spawning, collisions, levels)
//! - `audio`: Procedural sound effects and background music
//! - `renderer`: Vector drawing of entities onto a 2D surface
//! - `platform`: Ports the host implements (pointer, bounds, sinks, scheduler)
//! - `tuning`: Data-driven game balance
//! - `game`: Frame loop tying the simulation to audio, rendering and the host

pub mod audio;
pub mod game;
pub mod leaderboard;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game::Game;
pub use leaderboard::Leaderboard;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Player starting size (also the smallest size the player can have)
    pub const PLAYER_INITIAL_SIZE: f32 = 20.0;
    /// Player growth stops here
    pub const PLAYER_MAX_SIZE: f32 = 100.0;
    /// Player movement per frame (not scaled by frame time)
    pub const PLAYER_SPEED: f32 = 5.0;
    /// Fraction of an eaten rival's size added to the player
    pub const GROWTH_FACTOR: f32 = 0.1;

    /// Contact when distance < CONTACT_FACTOR * (player + rival)
    pub const CONTACT_FACTOR: f32 = 0.8;
    /// One fish must be this many times bigger than the other to eat it
    pub const EAT_RATIO: f32 = 1.2;
    /// Rivals are culled once this many sizes past the playfield edge
    pub const OFFSCREEN_MARGIN: f32 = 2.0;

    /// Rival spawn interval at spawn-rate 1.0 (ms)
    pub const RIVAL_SPAWN_INTERVAL_MS: f64 = 2000.0;
    /// Bubble spawn interval (ms)
    pub const BUBBLE_SPAWN_INTERVAL_MS: f64 = 1000.0;
    pub const MAX_RIVALS: usize = 10;
    pub const MAX_BUBBLES: usize = 20;
    pub const SEAWEED_COUNT: usize = 5;
    pub const INITIAL_BUBBLES: usize = 5;

    /// Score needed per level
    pub const LEVEL_SCORE_STEP: u64 = 500;
    /// Spawn-rate multiplier reached at level 2
    pub const SPAWN_RATE_BASE: f32 = 1.5;
    /// Additional spawn-rate multiplier per level after 2
    pub const SPAWN_RATE_STEP: f32 = 0.3;
}

/// Heading angle of a direction vector, 0 when the vector is zero
#[inline]
pub fn heading(dir: glam::Vec2) -> f32 {
    dir.y.atan2(dir.x)
}

/// Semitone offset to frequency relative to `base` (equal temperament)
#[inline]
pub fn semitones_to_hz(base: f32, semitones: i32) -> f32 {
    base * 2f32.powf(semitones as f32 / 12.0)
}
