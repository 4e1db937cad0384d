//! Per-frame simulation step
//!
//! Advances timers, spawns, movement, collisions and levels for one display
//! frame. Rendering and frame scheduling are the caller's job.

use glam::Vec2;
use thiserror::Error;

use super::collision::{Contact, fish_overlap, resolve_contact};
use super::level::{level_for_score, spawn_rate_for_level};
use super::spawn::{BubbleKind, SpawnDirector};
use super::state::{Bounds, GameEvent, SessionState};
use crate::tuning::Tuning;

/// Inputs sampled once at the start of a frame
#[derive(Debug, Clone, Copy)]
pub struct FrameInput {
    /// Frame timestamp (ms)
    pub now: f64,
    /// Pointer position in canvas space, `None` until the pointer has moved
    pub target: Option<Vec2>,
    pub bounds: Bounds,
}

/// Why a frame body was skipped
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    #[error("playfield bounds unusable: {width}x{height}")]
    InvalidBounds { width: f32, height: f32 },
    #[error("frame timestamp is not finite: {0}")]
    InvalidTimestamp(f64),
}

/// Advance the session by one frame, returning what happened
pub fn tick(
    state: &mut SessionState,
    director: &mut SpawnDirector,
    input: &FrameInput,
    tuning: &Tuning,
) -> Result<Vec<GameEvent>, FrameError> {
    let mut events = Vec::new();
    if !state.running {
        return Ok(events);
    }

    let bounds = input.bounds;
    if !bounds.is_usable() {
        return Err(FrameError::InvalidBounds {
            width: bounds.width,
            height: bounds.height,
        });
    }
    if !input.now.is_finite() {
        return Err(FrameError::InvalidTimestamp(input.now));
    }

    // A clock that steps backwards yields an empty frame rather than negative time
    let dt = (input.now - state.last_time).max(0.0);
    state.last_time = input.now;

    update_particles(state, director, bounds, dt, tuning);

    state.rival_timer += dt;
    if state.rival_timer > tuning.rival_interval(state.spawn_rate) {
        state.rival_timer = 0.0;
        if state.rivals.len() < tuning.max_rivals {
            let rival = director.spawn_rival(state.player.size, bounds);
            state.rivals.push(rival);
        }
    }

    // Fixed step per frame, deliberately not scaled by dt
    if let Some(target) = input.target.filter(|t| t.is_finite()) {
        state.player.move_toward(target);
    }
    state.player.check_bounds(bounds);

    for rival in &mut state.rivals {
        rival.update();
    }

    resolve_collisions(state, tuning, &mut events);

    let margin = tuning.offscreen_margin;
    state.rivals.retain(|r| !r.is_offscreen(bounds, margin));

    if state.running {
        update_level(state, &mut events);
    }

    Ok(events)
}

fn update_particles(
    state: &mut SessionState,
    director: &mut SpawnDirector,
    bounds: Bounds,
    dt: f64,
    tuning: &Tuning,
) {
    for seaweed in &mut state.seaweeds {
        seaweed.update();
    }

    state.bubble_timer += dt;
    if state.bubble_timer > tuning.bubble_spawn_interval_ms {
        state.bubble_timer = 0.0;
        if state.bubbles.len() < tuning.max_bubbles {
            state
                .bubbles
                .push(director.spawn_bubble(bounds, BubbleKind::Periodic));
        }
    }

    state.bubbles.retain_mut(|bubble| {
        bubble.update();
        bubble.is_visible()
    });
}

/// Test every rival against the player in collection order. Once the player
/// is eaten the remaining rivals are left untouched.
fn resolve_collisions(state: &mut SessionState, tuning: &Tuning, events: &mut Vec<GameEvent>) {
    let SessionState {
        rivals,
        player,
        score,
        ..
    } = &mut *state;
    let mut player_eaten = false;

    rivals.retain(|rival| {
        if player_eaten
            || !fish_overlap(
                player.pos,
                player.size,
                rival.pos,
                rival.size,
                tuning.contact_factor,
            )
        {
            return true;
        }

        match resolve_contact(player.size, rival.size, tuning.eat_ratio) {
            Contact::PlayerEats => {
                *score += rival.size.floor() as u64;
                player.grow(rival.size * tuning.growth_factor);
                events.push(GameEvent::RivalEaten {
                    rival_size: rival.size,
                    score: *score,
                });
                false
            }
            Contact::RivalEats => {
                player_eaten = true;
                events.push(GameEvent::PlayerEaten {
                    final_score: *score,
                });
                false
            }
            Contact::Standoff => true,
        }
    });

    if player_eaten {
        state.end();
    }
}

/// Recomputed every frame; only a strict increase has side effects
fn update_level(state: &mut SessionState, events: &mut Vec<GameEvent>) {
    let level = level_for_score(state.score);
    if level > state.level {
        state.level = level;
        state.spawn_rate = spawn_rate_for_level(level);
        events.push(GameEvent::LevelUp {
            level,
            spawn_rate: state.spawn_rate,
        });
    }
}
