//! Glyph-stretch layout
//!
//! The one real piece of geometry in the crate. Given a string and a
//! target cell, every character shares a single horizontal scale
//! `cell.width / natural_width(text)` and a single vertical scale
//! `cell.height / line_height`; the cursor advances by each character's
//! natural width times the shared scale, so the scaled sequence tiles
//! the cell width exactly, with cumulative rounding error bounded by one
//! character. The two axes scale independently; aspect ratio is not
//! preserved, the text fills the box.
//!
//! Offsets are absolute: each glyph carries its own final x position
//! rather than a delta from the previous one, so the writer never
//! accumulates transform state between characters.

use crate::font::FontMetrics;

/// Target rectangle for one item, in page points. `x` is the left edge,
/// `y` the text baseline at the bottom of the cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One character with its absolute horizontal offset on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedGlyph {
    pub ch: char,
    pub x: f32,
}

/// Draw plan for one stretched string.
#[derive(Debug, Clone, PartialEq)]
pub struct StretchPlan {
    /// Horizontal scale shared by every character.
    pub scale_x: f32,
    /// Vertical scale, independent of `scale_x`.
    pub scale_y: f32,
    /// Baseline y of the cell.
    pub baseline: f32,
    pub glyphs: Vec<PlannedGlyph>,
}

/// Lay out `text` so its characters exactly span `cell`.
///
/// `line_height` is the natural (unscaled) line height in points; the
/// vertical scale is `cell.height / line_height` regardless of the text.
/// Text with no measurable width (the empty string) yields `None`: a
/// no-draw no-op, not an error.
pub fn stretch_text(
    text: &str,
    metrics: &FontMetrics,
    font_size: f32,
    line_height: f32,
    cell: Cell,
) -> Option<StretchPlan> {
    let natural_width = metrics.text_width(text, font_size);
    if natural_width <= 0.0 {
        return None;
    }

    let scale_x = cell.width / natural_width;
    let scale_y = cell.height / line_height;

    let mut glyphs = Vec::with_capacity(text.len());
    let mut advanced = 0.0_f32;
    for ch in text.chars() {
        glyphs.push(PlannedGlyph {
            ch,
            x: cell.x + advanced * scale_x,
        });
        advanced += metrics.char_width(ch, font_size);
    }

    Some(StretchPlan {
        scale_x,
        scale_y,
        baseline: cell.y,
        glyphs,
    })
}
