//! Platform ports
//!
//! What the game needs from its host: pointer input, playfield size, places
//! to report score and session end, and a way to ask for the next frame.
//! The browser entry point implements these over the DOM; tests use fakes.

use glam::Vec2;

use crate::sim::Bounds;

/// Where the player is steering, in canvas coordinates
pub trait PointerSource {
    /// `None` until the first pointer event arrives
    fn target(&self) -> Option<Vec2>;
}

/// Current playfield size; may change between frames
pub trait BoundsProvider {
    fn bounds(&self) -> Bounds;
}

pub trait ScoreSink {
    fn on_score_changed(&mut self, score: u64);
    fn on_level_changed(&mut self, level: u32);
}

pub trait SessionEndSink {
    /// Called exactly once per session
    fn on_game_over(&mut self, final_score: u64);
}

pub trait FrameScheduler {
    /// Ask for one more frame callback
    fn request_frame(&mut self);
}

/// Everything a running session talks to
pub trait Host: PointerSource + BoundsProvider + ScoreSink + SessionEndSink + FrameScheduler {}

impl<T> Host for T where
    T: PointerSource + BoundsProvider + ScoreSink + SessionEndSink + FrameScheduler
{
}
