//! Circle contact test and eat/eaten resolution between two fish

use glam::Vec2;

/// Outcome of a contact between the player and a rival
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Player is big enough to eat the rival
    PlayerEats,
    /// Rival is big enough to eat the player
    RivalEats,
    /// Sizes too close; both survive
    Standoff,
}

/// Two fish touch when their centres are closer than `factor * (r1 + r2)`
#[inline]
pub fn fish_overlap(a: Vec2, size_a: f32, b: Vec2, size_b: f32, factor: f32) -> bool {
    a.distance(b) < (size_a + size_b) * factor
}

/// Decide who eats whom. The first matching branch wins, so a rival can
/// never both be eaten and eat in the same contact.
pub fn resolve_contact(player_size: f32, rival_size: f32, eat_ratio: f32) -> Contact {
    if player_size > rival_size * eat_ratio {
        Contact::PlayerEats
    } else if rival_size > player_size * eat_ratio {
        Contact::RivalEats
    } else {
        Contact::Standoff
    }
}
