//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Timing comes in through the frame timestamp only
//! - Seeded RNG only
//! - Stable iteration order (collection order)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod entity;
pub mod level;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Contact, fish_overlap, resolve_contact};
pub use entity::{Bubble, Player, Rival, Seaweed};
pub use level::{level_for_score, spawn_rate_for_level};
pub use spawn::{BubbleKind, SpawnDirector};
pub use state::{Bounds, GameEvent, SessionState};
pub use tick::{FrameError, FrameInput, tick};
