//! 2D vector rendering
//!
//! Scene code draws through the [`Surface`] trait so it runs the same against
//! a browser canvas or a recording surface in tests.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod scene;

use glam::Vec2;

use crate::sim::Bounds;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use scene::{draw_idle_frame, draw_session};

/// sRGB colour with straight alpha
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// `0xRRGGBB`
    pub const fn hex(rgb: u32) -> Self {
        Self::rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Hue in degrees (wrapped), saturation and lightness in [0, 1]
    pub fn hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        let to_u8 = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::rgb(to_u8(r), to_u8(g), to_u8(b))
    }

    /// CSS colour string
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

/// Scene colours
pub mod palette {
    use super::Color;

    pub const SEA_TOP: Color = Color::hex(0x104978);
    pub const SEA_BOTTOM: Color = Color::hex(0x052442);
    pub const SEAWEED: Color = Color::hex(0x0D5B3C);
    pub const BUBBLE: Color = Color::rgba(255, 255, 255, 0.3);
    pub const PLAYER: Color = Color::hex(0xFF6B6B);
    pub const EYE: Color = Color::rgb(0, 0, 0);
    pub const RIVAL_SATURATION: f32 = 0.8;
    pub const RIVAL_LIGHTNESS: f32 = 0.6;
}

/// Minimal immediate-mode 2D drawing target
pub trait Surface {
    /// Wipe the whole playfield
    fn clear(&mut self, bounds: Bounds);

    fn fill_vertical_gradient(&mut self, bounds: Bounds, top: Color, bottom: Color);

    /// Ellipse with `radii` along its own axes, rotated by `rotation` radians
    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, color: Color);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);

    /// Closed polygon
    fn fill_polygon(&mut self, points: &[Vec2], color: Color);

    /// Open polyline with round caps
    fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Color);
}
