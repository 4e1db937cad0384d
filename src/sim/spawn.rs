//! Spawn director: where, how big and how fast new rivals and particles appear
//!
//! All randomness comes from a seeded PCG stream so a session replays
//! identically for the same seed and inputs.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::entity::{Bubble, Rival, Seaweed};
use super::state::Bounds;

/// Size brackets as (cumulative probability, min ratio, max ratio) of player size
const SIZE_BRACKETS: [(f32, f32, f32); 3] = [
    (0.6, 0.3, 0.9), // edible
    (0.9, 1.1, 1.6), // slightly bigger
    (1.0, 1.6, 2.8), // much bigger
];

/// Slowest a rival may swim (units per frame)
pub const MIN_RIVAL_SPEED: f32 = 0.5;

/// Which bubble population a new bubble belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleKind {
    /// Seeded at session start, radius in [2, 8]
    Initial,
    /// Spawned by the bubble timer, radius in [2, 6]
    Periodic,
}

/// Randomised spawning policy
#[derive(Debug, Clone)]
pub struct SpawnDirector {
    rng: Pcg32,
    next_rival_id: u32,
}

impl SpawnDirector {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            next_rival_id: 1,
        }
    }

    /// Create a rival just outside the playfield, sized relative to the player
    pub fn spawn_rival(&mut self, player_size: f32, bounds: Bounds) -> Rival {
        let roll: f32 = self.rng.random();
        let (_, lo, hi) = SIZE_BRACKETS
            .iter()
            .copied()
            .find(|(p, _, _)| roll < *p)
            .unwrap_or(SIZE_BRACKETS[SIZE_BRACKETS.len() - 1]);
        let size = player_size * self.rng.random_range(lo..=hi);

        let pos = if self.rng.random_bool(0.5) {
            // Left or right edge
            let x = if self.rng.random_bool(0.5) {
                -size * 2.0
            } else {
                bounds.width + size * 2.0
            };
            Vec2::new(x, self.rng.random::<f32>() * bounds.height)
        } else {
            // Top or bottom edge
            let y = if self.rng.random_bool(0.5) {
                -size * 2.0
            } else {
                bounds.height + size * 2.0
            };
            Vec2::new(self.rng.random::<f32>() * bounds.width, y)
        };

        let ratio = size / player_size;
        let angle = crate::heading(bounds.center() - pos);
        let speed = rival_speed(ratio);

        let id = self.next_rival_id;
        self.next_rival_id = self.next_rival_id.wrapping_add(1);

        Rival {
            id,
            pos,
            size,
            vel: Vec2::from_angle(angle) * speed,
            hue: rival_hue(ratio),
        }
    }

    /// Create a bubble at or below the bottom edge
    pub fn spawn_bubble(&mut self, bounds: Bounds, kind: BubbleKind) -> Bubble {
        let (radius, y) = match kind {
            BubbleKind::Initial => (
                self.rng.random_range(2.0..=8.0),
                bounds.height + self.rng.random::<f32>() * 20.0,
            ),
            BubbleKind::Periodic => (self.rng.random_range(2.0..=6.0), bounds.height + 10.0),
        };
        Bubble {
            pos: Vec2::new(self.rng.random::<f32>() * bounds.width, y),
            radius,
            rise_speed: self.rng.random_range(1.0..=3.0),
            wobble_phase: self.rng.random::<f32>() * std::f32::consts::TAU,
            wobble_speed: self.rng.random_range(1.0..=3.0),
        }
    }

    /// Create a seaweed stalk anchored to the bottom edge
    pub fn spawn_seaweed(&mut self, bounds: Bounds) -> Seaweed {
        Seaweed {
            anchor: Vec2::new(self.rng.random::<f32>() * bounds.width, bounds.height),
            width: self.rng.random_range(10.0..=20.0),
            height: self.rng.random_range(100.0..=200.0),
            segments: 10,
            sway_phase: self.rng.random::<f32>() * std::f32::consts::TAU,
            sway_speed: self.rng.random_range(1.0..=2.0),
        }
    }
}

/// Bigger rivals swim slower, never below [`MIN_RIVAL_SPEED`]
pub fn rival_speed(size_ratio: f32) -> f32 {
    (2.0 - size_ratio * 0.5).max(MIN_RIVAL_SPEED)
}

/// Continuous danger hue: small rivals land in the green/blue band
/// (180-240), big ones in the red/violet band (300-360)
pub fn rival_hue(size_ratio: f32) -> f32 {
    if size_ratio < 1.0 {
        180.0 + 60.0 * (1.0 - size_ratio)
    } else {
        360.0 - 60.0 * (size_ratio - 1.0).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Bounds {
        Bounds::new(800.0, 600.0)
    }

    #[test]
    fn test_rival_size_distribution() {
        let mut director = SpawnDirector::new(7);
        let (mut small, mut bigger, mut huge) = (0, 0, 0);
        for _ in 0..5000 {
            let rival = director.spawn_rival(20.0, bounds());
            let ratio = rival.size / 20.0;
            assert!(ratio > 0.3 - 1e-4 && ratio < 2.8 + 1e-4, "ratio {ratio}");
            // Nothing spawns in the (0.9, 1.1) standoff gap
            assert!(ratio < 0.9 + 1e-4 || ratio > 1.1 - 1e-4, "ratio {ratio}");
            if ratio < 1.0 {
                small += 1;
            } else if ratio < 1.6 {
                bigger += 1;
            } else {
                huge += 1;
            }
        }
        // 60/30/10 within sampling noise
        assert!((2700..3300).contains(&small), "small {small}");
        assert!((1250..1750).contains(&bigger), "bigger {bigger}");
        assert!((300..700).contains(&huge), "huge {huge}");
    }

    #[test]
    fn test_rival_spawns_fully_offscreen() {
        let mut director = SpawnDirector::new(11);
        for _ in 0..500 {
            let rival = director.spawn_rival(20.0, bounds());
            let m = rival.size * 2.0;
            let on_vertical_edge = rival.pos.x == -m || rival.pos.x == 800.0 + m;
            let on_horizontal_edge = rival.pos.y == -m || rival.pos.y == 600.0 + m;
            assert!(on_vertical_edge || on_horizontal_edge);
            // Exactly on the margin is not yet culled
            assert!(!rival.is_offscreen(bounds(), 2.0));
        }
    }

    #[test]
    fn test_rival_heads_toward_center() {
        let mut director = SpawnDirector::new(3);
        for _ in 0..200 {
            let rival = director.spawn_rival(20.0, bounds());
            let to_center = (bounds().center() - rival.pos).normalize();
            assert!(rival.vel.normalize().dot(to_center) > 0.999);
            assert!(rival.vel.length() >= MIN_RIVAL_SPEED - 1e-4);
        }
    }

    #[test]
    fn test_rival_ids_increase() {
        let mut director = SpawnDirector::new(1);
        let a = director.spawn_rival(20.0, bounds());
        let b = director.spawn_rival(20.0, bounds());
        assert!(b.id > a.id);
    }

    #[test]
    fn test_speed_and_hue_curves() {
        assert_eq!(rival_speed(0.5), 1.75);
        assert!((rival_speed(2.8) - 0.6).abs() < 1e-6);
        assert_eq!(rival_speed(10.0), MIN_RIVAL_SPEED);
        assert_eq!(rival_hue(1.0), 360.0);
        assert_eq!(rival_hue(0.5), 210.0);
        assert_eq!(rival_hue(2.0), 300.0);
        assert_eq!(rival_hue(2.8), 300.0);
        assert!(rival_hue(0.3) > rival_hue(0.9));
    }

    #[test]
    fn test_bubble_ranges() {
        let mut director = SpawnDirector::new(5);
        for _ in 0..300 {
            let b = director.spawn_bubble(bounds(), BubbleKind::Initial);
            assert!((2.0..=8.0).contains(&b.radius));
            assert!(b.pos.y >= 600.0 && b.pos.y <= 620.0);
            assert!((1.0..=3.0).contains(&b.rise_speed));
            let p = director.spawn_bubble(bounds(), BubbleKind::Periodic);
            assert!((2.0..=6.0).contains(&p.radius));
            assert_eq!(p.pos.y, 610.0);
            assert!(p.pos.x >= 0.0 && p.pos.x <= 800.0);
        }
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let mut a = SpawnDirector::new(42);
        let mut b = SpawnDirector::new(42);
        for _ in 0..20 {
            let ra = a.spawn_rival(25.0, bounds());
            let rb = b.spawn_rival(25.0, bounds());
            assert_eq!(ra.pos, rb.pos);
            assert_eq!(ra.size, rb.size);
        }
    }
}
