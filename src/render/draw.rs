use image::{Rgba, RgbaImage};
use imageproc::drawing::{Blend, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use super::ScaledBox;

const GLOW_RADIUS: u32 = 6;
const GLOW_ALPHA: f32 = 0.5;

pub(super) fn with_alpha(color: Rgba<u8>, alpha: f32) -> Rgba<u8> {
    let Rgba([r, g, b, a]) = color;
    Rgba([r, g, b, (a as f32 * alpha).round() as u8])
}

/// Outline `bbox` grown (positive) or shrunk (negative) by `offset` pixels.
fn outline(canvas: &mut Blend<RgbaImage>, bbox: &ScaledBox, offset: i32, color: Rgba<u8>) {
    let (x, y) = bbox.origin();
    let (w, h) = bbox.size();
    let w = w as i32 + 2 * offset;
    let h = h as i32 + 2 * offset;
    if w <= 0 || h <= 0 {
        return;
    }
    let rect = Rect::at(x - offset, y - offset).of_size(w as u32, h as u32);
    draw_hollow_rect_mut(canvas, rect, color);
}

/// Stroke centered on the box edge.
pub(super) fn stroke(canvas: &mut Blend<RgbaImage>, bbox: &ScaledBox, width: u32, color: Rgba<u8>) {
    let outer = (width / 2) as i32;
    let inner = outer - width as i32;
    for offset in (inner + 1)..=outer {
        outline(canvas, bbox, offset, color);
    }
}

/// Fading halo just outside a stroke of `stroke_width`.
pub(super) fn glow(canvas: &mut Blend<RgbaImage>, bbox: &ScaledBox, stroke_width: u32, color: Rgba<u8>) {
    let base = (stroke_width / 2) as i32;
    for step in 1..=GLOW_RADIUS {
        let fade = 1.0 - step as f32 / (GLOW_RADIUS + 1) as f32;
        outline(canvas, bbox, base + step as i32, with_alpha(color, GLOW_ALPHA * fade));
    }
}
