//! Draws detection boxes and label chips over a scaled copy of the source
//! image.

mod draw;
pub mod palette;

use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use anyhow::Context;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{Blend, draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::config::Settings;
use crate::models::Detection;

pub use palette::{Palette, class_color, class_hue};

pub const DEFAULT_MAX_DISPLAY_WIDTH: u32 = 1100;
/// Every export overwrites the same file name.
pub const EXPORT_FILE_NAME: &str = "detection_result.png";

pub const STROKE_WIDTH: u32 = 2;
pub const ACTIVE_STROKE_WIDTH: u32 = 4;
pub const LABEL_HEIGHT: u32 = 20;
const LABEL_PADDING: u32 = 10;
const LABEL_ALPHA: f32 = 0.9;
const FONT_SIZE: f32 = 13.0;
const TEXT_INSET_X: i32 = 5;
const TEXT_INSET_Y: i32 = 3;
/// Glyph advance used to size chips when no font is loaded.
const FALLBACK_GLYPH_WIDTH: u32 = 7;

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/noto/NotoSansThai-Regular.ttf",
    "/usr/share/fonts/truetype/tlwg/Garuda.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
    "C:\\Windows\\Fonts\\tahoma.ttf",
];

/// Factor mapping source pixels to display pixels. Never upscales.
pub fn display_scale(natural_width: u32, max_display_width: u32) -> f32 {
    if natural_width > max_display_width {
        max_display_width as f32 / natural_width as f32
    } else {
        1.0
    }
}

/// `0.873` → `"87.3%"`.
pub fn format_confidence(confidence: f32) -> String {
    format!("{:.1}%", confidence * 100.0)
}

pub fn label_text(detection: &Detection) -> String {
    format!("{} {}", detection.class_name, format_confidence(detection.confidence))
}

/// Top edge of a label chip: above the box, or inside it when above would
/// leave the canvas.
pub fn label_top(box_y: i32) -> i32 {
    let above = box_y - LABEL_HEIGHT as i32;
    if above < 0 { box_y } else { above }
}

/// A detection's box in display space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScaledBox {
    pub fn new(detection: &Detection, scale: f32) -> Self {
        let [x1, y1, _, _] = detection.bbox;
        Self {
            x: x1 * scale,
            y: y1 * scale,
            width: detection.width() * scale,
            height: detection.height() * scale,
        }
    }

    fn origin(&self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }

    fn size(&self) -> (u32, u32) {
        (
            self.width.round().max(1.0) as u32,
            self.height.round().max(1.0) as u32,
        )
    }
}

pub struct OverlayRenderer {
    max_display_width: u32,
    palette: Palette,
    font: Option<FontVec>,
}

impl OverlayRenderer {
    pub fn new(max_display_width: u32) -> Self {
        Self {
            max_display_width,
            palette: Palette::new(),
            font: None,
        }
    }

    pub fn with_font(mut self, font: FontVec) -> Self {
        self.font = Some(font);
        self
    }

    /// Renderer with the configured display width and the first usable font.
    pub fn from_settings(settings: &Settings) -> Self {
        let renderer = Self::new(settings.max_display_width);
        match find_font(settings.font_path.as_deref()) {
            Some(font) => renderer.with_font(font),
            None => {
                tracing::warn!("no label font found, boxes will be drawn without text");
                renderer
            }
        }
    }

    pub fn max_display_width(&self) -> u32 {
        self.max_display_width
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Render `detections` over `source`, highlighting the `hover` index.
    ///
    /// Always starts from the source pixels, so repeated calls never stack
    /// strokes from earlier frames.
    pub fn render(
        &mut self,
        source: &DynamicImage,
        detections: &[Detection],
        hover: Option<usize>,
    ) -> RgbaImage {
        let (natural_w, natural_h) = source.dimensions();
        let scale = display_scale(natural_w, self.max_display_width);
        let base = if scale < 1.0 {
            let w = ((natural_w as f32 * scale).round() as u32).max(1);
            let h = ((natural_h as f32 * scale).round() as u32).max(1);
            imageops::resize(&source.to_rgba8(), w, h, FilterType::Triangle)
        } else {
            source.to_rgba8()
        };

        let mut canvas = Blend(base);
        for (index, detection) in detections.iter().enumerate() {
            let color = self.palette.color(detection.class);
            let bbox = ScaledBox::new(detection, scale);
            if hover == Some(index) {
                draw::glow(&mut canvas, &bbox, ACTIVE_STROKE_WIDTH, color);
                draw::stroke(&mut canvas, &bbox, ACTIVE_STROKE_WIDTH, color);
            } else {
                draw::stroke(&mut canvas, &bbox, STROKE_WIDTH, color);
            }
            self.draw_label(&mut canvas, &bbox, detection, color);
        }
        canvas.0
    }

    fn draw_label(
        &self,
        canvas: &mut Blend<RgbaImage>,
        bbox: &ScaledBox,
        detection: &Detection,
        color: Rgba<u8>,
    ) {
        let text = label_text(detection);
        let scale = PxScale::from(FONT_SIZE);
        let text_width = match &self.font {
            Some(font) => text_size(scale, font, &text).0,
            None => text.chars().count() as u32 * FALLBACK_GLYPH_WIDTH,
        };

        let (x, y) = bbox.origin();
        let top = label_top(y);
        let chip = Rect::at(x, top).of_size(text_width + LABEL_PADDING, LABEL_HEIGHT);
        draw_filled_rect_mut(canvas, chip, draw::with_alpha(color, LABEL_ALPHA));

        if let Some(font) = &self.font {
            draw_text_mut(
                canvas,
                Rgba([255, 255, 255, 255]),
                x + TEXT_INSET_X,
                top + TEXT_INSET_Y,
                scale,
                font,
                &text,
            );
        }
    }
}

/// Load the configured font, or the first system font that parses.
pub fn find_font(configured: Option<&Path>) -> Option<FontVec> {
    if let Some(path) = configured {
        match load_font(path) {
            Ok(font) => return Some(font),
            Err(e) => tracing::warn!("{e:#}"),
        }
    }
    SYSTEM_FONTS
        .iter()
        .map(Path::new)
        .filter(|p| p.is_file())
        .find_map(|p| load_font(p).ok())
}

pub fn load_font(path: &Path) -> anyhow::Result<FontVec> {
    let data = std::fs::read(path).with_context(|| format!("Failed to read font {:?}", path))?;
    let font = FontVec::try_from_vec(data)
        .map_err(|e| anyhow::anyhow!("Failed to parse font {:?}: {}", path, e))?;
    tracing::debug!(?path, "loaded label font");
    Ok(font)
}

pub fn save_png(raster: &RgbaImage, path: &Path) -> anyhow::Result<()> {
    raster
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("Failed to write {:?}", path))
}

/// Write `raster` to `dir/detection_result.png`.
pub fn export_png(raster: &RgbaImage, dir: &Path) -> anyhow::Result<PathBuf> {
    let path = dir.join(EXPORT_FILE_NAME);
    save_png(raster, &path)?;
    tracing::info!(?path, "exported annotated image");
    Ok(path)
}
