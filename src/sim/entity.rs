//! Entity model: player, rivals and decorative particles
//!
//! Pure data plus per-entity update rules. Drawing lives in `renderer`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Bounds;

/// The player's fish
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: f32,
    pub max_size: f32,
    /// Units moved per frame
    pub speed: f32,
    /// Last pointer target the player swam toward
    pub target: Vec2,
}

impl Player {
    pub fn new(pos: Vec2, size: f32, max_size: f32, speed: f32) -> Self {
        Self {
            pos,
            size,
            max_size,
            speed,
            target: pos,
        }
    }

    /// Step toward `target` by a fixed distance, landing on it when closer than one step
    pub fn move_toward(&mut self, target: Vec2) {
        self.target = target;
        let delta = target - self.pos;
        let distance = delta.length();
        if distance <= f32::EPSILON {
            return;
        }
        if distance <= self.speed {
            self.pos = target;
        } else {
            self.pos += delta / distance * self.speed;
        }
    }

    /// Keep the whole body inside the playfield
    pub fn check_bounds(&mut self, bounds: Bounds) {
        // max/min rather than clamp: a playfield narrower than the fish must not panic
        self.pos.x = self.size.max((bounds.width - self.size).min(self.pos.x));
        self.pos.y = self.size.max((bounds.height - self.size).min(self.pos.y));
    }

    /// Grow by `amount`, never past `max_size`
    pub fn grow(&mut self, amount: f32) {
        self.size = (self.size + amount.max(0.0)).min(self.max_size).max(self.size);
    }

    /// Facing angle, recomputed from the current position every call
    pub fn heading(&self) -> f32 {
        crate::heading(self.target - self.pos)
    }
}

/// A non-player fish that can be eaten or eat the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rival {
    pub id: u32,
    pub pos: Vec2,
    /// Fixed at spawn
    pub size: f32,
    /// Movement per frame
    pub vel: Vec2,
    /// HSL hue in degrees, fixed at spawn
    pub hue: f32,
}

impl Rival {
    pub fn update(&mut self) {
        self.pos += self.vel;
    }

    pub fn heading(&self) -> f32 {
        crate::heading(self.vel)
    }

    /// True once the rival is more than `margin` sizes past any playfield edge
    pub fn is_offscreen(&self, bounds: Bounds, margin: f32) -> bool {
        let m = self.size * margin;
        self.pos.x < -m
            || self.pos.x > bounds.width + m
            || self.pos.y < -m
            || self.pos.y > bounds.height + m
    }
}

/// A rising bubble
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bubble {
    pub pos: Vec2,
    pub radius: f32,
    /// Rise per frame
    pub rise_speed: f32,
    pub wobble_phase: f32,
    pub wobble_speed: f32,
}

/// Horizontal wobble amplitude per frame
const BUBBLE_WOBBLE: f32 = 0.5;

impl Bubble {
    pub fn update(&mut self) {
        self.pos.y -= self.rise_speed;
        self.wobble_phase += self.wobble_speed * 0.02;
        self.pos.x += self.wobble_phase.sin() * BUBBLE_WOBBLE;
    }

    /// Still (partly) inside the visible area
    pub fn is_visible(&self) -> bool {
        self.pos.y > -self.radius
    }
}

/// A seaweed stalk anchored to the sea floor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seaweed {
    pub anchor: Vec2,
    pub width: f32,
    pub height: f32,
    pub segments: u32,
    pub sway_phase: f32,
    pub sway_speed: f32,
}

/// Horizontal sway amplitude of each segment
pub const SEAWEED_SWAY: f32 = 15.0;

impl Seaweed {
    pub fn update(&mut self) {
        self.sway_phase += 0.02 * self.sway_speed;
    }

    /// Segment joints from the anchor upward
    pub fn joints(&self) -> Vec<Vec2> {
        (0..=self.segments)
            .map(|i| {
                let t = i as f32 / self.segments.max(1) as f32;
                let sway = (self.sway_phase + i as f32 * 0.3).sin() * SEAWEED_SWAY;
                Vec2::new(self.anchor.x + sway, self.anchor.y - self.height * t)
            })
            .collect()
    }
}
