//! Canvas 2D surface

use std::f64::consts::TAU;

use glam::Vec2;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::{Color, Surface};
use crate::sim::Bounds;

/// [`Surface`] over a `CanvasRenderingContext2d`
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    #[allow(deprecated)]
    fn set_fill(&self, color: Color) {
        self.ctx.set_fill_style(&JsValue::from_str(&color.to_css()));
    }

    fn trace(&self, points: &[Vec2]) -> bool {
        let Some((first, rest)) = points.split_first() else {
            return false;
        };
        self.ctx.begin_path();
        self.ctx.move_to(f64::from(first.x), f64::from(first.y));
        for p in rest {
            self.ctx.line_to(f64::from(p.x), f64::from(p.y));
        }
        true
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self, bounds: Bounds) {
        self.ctx
            .clear_rect(0.0, 0.0, f64::from(bounds.width), f64::from(bounds.height));
    }

    #[allow(deprecated)]
    fn fill_vertical_gradient(&mut self, bounds: Bounds, top: Color, bottom: Color) {
        let (w, h) = (f64::from(bounds.width), f64::from(bounds.height));
        let gradient = self.ctx.create_linear_gradient(0.0, 0.0, 0.0, h);
        if gradient.add_color_stop(0.0, &top.to_css()).is_err()
            || gradient.add_color_stop(1.0, &bottom.to_css()).is_err()
        {
            self.set_fill(bottom);
        } else {
            self.ctx.set_fill_style(&gradient);
        }
        self.ctx.fill_rect(0.0, 0.0, w, h);
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, color: Color) {
        self.ctx.begin_path();
        self.set_fill(color);
        if self
            .ctx
            .ellipse(
                f64::from(center.x),
                f64::from(center.y),
                f64::from(radii.x.max(0.0)),
                f64::from(radii.y.max(0.0)),
                f64::from(rotation),
                0.0,
                TAU,
            )
            .is_ok()
        {
            self.ctx.fill();
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.ctx.begin_path();
        self.set_fill(color);
        if self
            .ctx
            .arc(
                f64::from(center.x),
                f64::from(center.y),
                f64::from(radius.max(0.0)),
                0.0,
                TAU,
            )
            .is_ok()
        {
            self.ctx.fill();
        }
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        if self.trace(points) {
            self.ctx.close_path();
            self.set_fill(color);
            self.ctx.fill();
        }
    }

    #[allow(deprecated)]
    fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Color) {
        if self.trace(points) {
            self.ctx
                .set_stroke_style(&JsValue::from_str(&color.to_css()));
            self.ctx.set_line_width(f64::from(width));
            self.ctx.set_line_cap("round");
            self.ctx.stroke();
        }
    }
}
