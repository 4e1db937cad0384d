//! Scene drawing: background, decorations and fish

use glam::Vec2;

use super::{Color, Surface, palette};
use crate::sim::{Bounds, Bubble, Player, Rival, Seaweed, SessionState};

/// Size of the fish that swims across the start screen
pub const IDLE_FISH_SIZE: f32 = 30.0;

pub fn draw_background<S: Surface + ?Sized>(surface: &mut S, bounds: Bounds) {
    surface.clear(bounds);
    surface.fill_vertical_gradient(bounds, palette::SEA_TOP, palette::SEA_BOTTOM);
}

pub fn draw_seaweed<S: Surface + ?Sized>(surface: &mut S, seaweed: &Seaweed) {
    surface.stroke_polyline(&seaweed.joints(), seaweed.width, palette::SEAWEED);
}

pub fn draw_bubble<S: Surface + ?Sized>(surface: &mut S, bubble: &Bubble) {
    surface.fill_circle(bubble.pos, bubble.radius, palette::BUBBLE);
}

/// Ellipse body, triangular tail and an eye, facing `heading`
pub fn draw_fish<S: Surface + ?Sized>(
    surface: &mut S,
    pos: Vec2,
    size: f32,
    heading: f32,
    color: Color,
) {
    let facing = Vec2::from_angle(heading);
    let place = |local: Vec2| pos + facing.rotate(local * size);

    surface.fill_ellipse(pos, Vec2::new(size, size * 0.6), heading, color);
    surface.fill_polygon(
        &[
            place(Vec2::new(-0.8, 0.0)),
            place(Vec2::new(-1.5, -0.4)),
            place(Vec2::new(-1.5, 0.4)),
        ],
        color,
    );
    surface.fill_circle(place(Vec2::new(0.3, -0.1)), size * 0.1, palette::EYE);
}

pub fn draw_player<S: Surface + ?Sized>(surface: &mut S, player: &Player) {
    draw_fish(surface, player.pos, player.size, player.heading(), palette::PLAYER);
}

pub fn draw_rival<S: Surface + ?Sized>(surface: &mut S, rival: &Rival) {
    let color = Color::hsl(
        rival.hue,
        palette::RIVAL_SATURATION,
        palette::RIVAL_LIGHTNESS,
    );
    draw_fish(surface, rival.pos, rival.size, rival.heading(), color);
}

/// One full frame: background, seaweed, bubbles, player, then rivals
pub fn draw_session<S: Surface + ?Sized>(surface: &mut S, state: &SessionState, bounds: Bounds) {
    draw_background(surface, bounds);
    for seaweed in &state.seaweeds {
        draw_seaweed(surface, seaweed);
    }
    for bubble in &state.bubbles {
        draw_bubble(surface, bubble);
    }
    draw_player(surface, &state.player);
    for rival in &state.rivals {
        draw_rival(surface, rival);
    }
}

/// Start-screen frame: a lone fish tracing a slow Lissajous loop.
/// `seconds` is wall-clock time.
pub fn draw_idle_frame<S: Surface + ?Sized>(surface: &mut S, bounds: Bounds, seconds: f64) {
    draw_background(surface, bounds);
    let fish = idle_fish(bounds, seconds);
    draw_player(surface, &fish);
}

/// Where the start-screen fish is and which way it faces at `seconds`
pub fn idle_fish(bounds: Bounds, seconds: f64) -> Player {
    let (w, h) = (bounds.width, bounds.height);
    let a = (seconds * 0.5) as f32;
    let b = (seconds * 0.3) as f32;
    let pos = Vec2::new(w * 0.5 + a.sin() * w * 0.3, h * 0.5 + b.cos() * h * 0.2);

    let mut fish = Player::new(pos, IDLE_FISH_SIZE, IDLE_FISH_SIZE, 0.0);
    fish.target = Vec2::new(pos.x + a.cos() * w * 0.3, pos.y - b.sin() * h * 0.2);
    fish
}
