//! What an overlay looks like. The windowing layer supplies a [`DrawContext`]
//! when it wants a frame and the engine issues the calls.

use serde::{Deserialize, Serialize};

use super::{OverlayRecord, Rgb};

/// Corner radius of the filled rectangle.
pub const CORNER_RADIUS: f64 = 10.0;

pub const LABEL_FONT_FAMILY: &str = "Arial";
pub const LABEL_FONT_SIZE: u32 = 12;

/// Surface-local rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub size: u32,
    pub bold: bool,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: LABEL_FONT_FAMILY.to_string(),
            size: LABEL_FONT_SIZE,
            bold: true,
        }
    }
}

pub trait DrawContext {
    fn rounded_rect(&mut self, rect: Rect, radius: f64, fill: Rgb, stroke: Rgb, stroke_width: u32);

    /// Draw `text` centered inside `rect`.
    fn centered_text(&mut self, rect: Rect, text: &str, color: Rgb, font: &Font);
}

/// Black on light fills, white on dark ones.
pub fn contrast_text_color(fill: Rgb) -> Rgb {
    if fill.luminance() > 128.0 {
        Rgb::BLACK
    } else {
        Rgb::WHITE
    }
}

pub fn label(display_index: usize) -> String {
    format!("ID: {display_index}")
}

/// Paint one overlay of `width` × `height` into `ctx`.
///
/// The rectangle is inset by the border width on every side before the
/// stroke is drawn. Opacity is not applied here; it belongs to the surface.
pub fn paint(
    ctx: &mut dyn DrawContext,
    record: &OverlayRecord,
    width: i32,
    height: i32,
    display_index: usize,
) {
    let inset = f64::from(record.border);
    let rect = Rect {
        x: inset,
        y: inset,
        width: (f64::from(width) - 2.0 * inset).max(0.0),
        height: (f64::from(height) - 2.0 * inset).max(0.0),
    };

    ctx.rounded_rect(rect, CORNER_RADIUS, record.color, record.color, record.border);
    ctx.centered_text(
        rect,
        &label(display_index),
        contrast_text_color(record.color),
        &Font::default(),
    );
}

/// A recorded frame, serializable so it can be shipped to a renderer in
/// another process or webview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum PaintOp {
    RoundedRect {
        rect: Rect,
        radius: f64,
        fill: Rgb,
        stroke: Rgb,
        stroke_width: u32,
    },
    Text {
        rect: Rect,
        text: String,
        color: Rgb,
        font: Font,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayList {
    pub ops: Vec<PaintOp>,
}

impl DrawContext for DisplayList {
    fn rounded_rect(&mut self, rect: Rect, radius: f64, fill: Rgb, stroke: Rgb, stroke_width: u32) {
        self.ops.push(PaintOp::RoundedRect {
            rect,
            radius,
            fill,
            stroke,
            stroke_width,
        });
    }

    fn centered_text(&mut self, rect: Rect, text: &str, color: Rgb, font: &Font) {
        self.ops.push(PaintOp::Text {
            rect,
            text: text.to_string(),
            color,
            font: font.clone(),
        });
    }
}
