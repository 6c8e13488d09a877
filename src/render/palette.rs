use std::collections::HashMap;

use image::Rgba;

const HUE_STEP: u32 = 57;
const SATURATION: f32 = 0.85;
const LIGHTNESS: f32 = 0.55;

/// Per-class box colors, memoized for the lifetime of one renderer.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    colors: HashMap<u32, Rgba<u8>>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color(&mut self, class: u32) -> Rgba<u8> {
        *self.colors.entry(class).or_insert_with(|| class_color(class))
    }

    /// Color for a class that has already been drawn.
    pub fn get(&self, class: u32) -> Option<Rgba<u8>> {
        self.colors.get(&class).copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Position of a class on the hue wheel, in degrees.
pub fn class_hue(class: u32) -> u32 {
    ((class as u64 * HUE_STEP as u64) % 360) as u32
}

pub fn class_color(class: u32) -> Rgba<u8> {
    let [r, g, b] = hsl_to_rgb(class_hue(class) as f32, SATURATION, LIGHTNESS);
    Rgba([r, g, b, 255])
}

fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [u8; 3] {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    let to_u8 = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_u8(r), to_u8(g), to_u8(b)]
}
