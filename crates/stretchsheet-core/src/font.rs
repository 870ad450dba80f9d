//! Sheet font loading and process-wide registration
//!
//! All text in both documents is set in a single externally supplied
//! TrueType face. The server loads it exactly once at startup and
//! installs it with [`install`]; a missing or unparsable font file is a
//! fatal configuration error, never a per-request one.
//!
//! [`FontMetrics`] is the measurement half: a plain width table in em
//! units covering the ASCII printable range, with an average-width
//! fallback for everything else. The layout primitive only ever touches
//! the metrics, so it stays testable without real font bytes.

use std::path::Path;
use std::sync::OnceLock;

use ttf_parser::Face;

use crate::error::FontError;

/// First codepoint covered by the metric table (space).
const FIRST_CHAR: u8 = 0x20;
/// Last codepoint covered by the metric table (tilde).
const LAST_CHAR: u8 = 0x7E;
/// Number of covered codepoints.
const TABLE_LEN: usize = (LAST_CHAR - FIRST_CHAR + 1) as usize;

/// Replacement for characters the embedded encoding cannot represent.
pub const REPLACEMENT: char = '?';

static SHEET_FONT: OnceLock<SheetFont> = OnceLock::new();

/// Install the process-wide sheet font. The first call wins; later calls
/// return the already-installed font unchanged.
pub fn install(font: SheetFont) -> &'static SheetFont {
    SHEET_FONT.get_or_init(|| font)
}

/// The installed process-wide font, if any.
pub fn installed() -> Option<&'static SheetFont> {
    SHEET_FONT.get()
}

/// Character-width table measured from a loaded face.
///
/// Widths are in em units (relative to font size). `widths[i]` is the
/// advance of ASCII character `i + 32`, covering 0x20 (space) through
/// 0x7E (~); anything outside that range falls back to `fallback_width`.
#[derive(Debug, Clone)]
pub struct FontMetrics {
    widths: [f32; TABLE_LEN],
    fallback_width: f32,
}

impl FontMetrics {
    /// Advance width of a single character at `font_size` points.
    pub fn char_width(&self, c: char, font_size: f32) -> f32 {
        let code = c as usize;
        let em = if (FIRST_CHAR as usize..=LAST_CHAR as usize).contains(&code) {
            self.widths[code - FIRST_CHAR as usize]
        } else {
            self.fallback_width
        };
        em * font_size
    }

    /// Natural (unscaled) width of `text` at `font_size` points.
    pub fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().map(|c| self.char_width(c, font_size)).sum()
    }
}

/// A loaded TrueType face: the raw bytes for embedding plus the numbers
/// the PDF writer and the layout primitive need. Descriptor values are
/// pre-scaled to the PDF glyph space (thousandths of the em).
#[derive(Debug, Clone)]
pub struct SheetFont {
    data: Vec<u8>,
    postscript_name: String,
    metrics: FontMetrics,
    pub(crate) ascent: i64,
    pub(crate) descent: i64,
    pub(crate) cap_height: i64,
    pub(crate) bbox: [i64; 4],
}

impl SheetFont {
    /// Read and parse a TrueType font file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FontError> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(data)
    }

    /// Parse an in-memory TrueType face.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, FontError> {
        let face = Face::parse(&data, 0).map_err(|e| FontError::Parse(e.to_string()))?;
        let upem = f32::from(face.units_per_em());
        if upem <= 0.0 {
            return Err(FontError::UnsupportedFace("units per em is zero"));
        }

        let mut widths = [0.0_f32; TABLE_LEN];
        for (i, slot) in widths.iter_mut().enumerate() {
            let c = (FIRST_CHAR + i as u8) as char;
            *slot = face
                .glyph_index(c)
                .and_then(|gid| face.glyph_hor_advance(gid))
                .map(|advance| f32::from(advance) / upem)
                .unwrap_or(0.0);
        }

        // Fallback is the mean over characters the face actually maps.
        let mapped: Vec<f32> = widths.iter().copied().filter(|w| *w > 0.0).collect();
        if mapped.is_empty() {
            return Err(FontError::UnsupportedFace("no ASCII glyphs in face"));
        }
        let fallback_width = mapped.iter().sum::<f32>() / mapped.len() as f32;

        let to_milli = |units: i16| (f32::from(units) * 1000.0 / upem).round() as i64;
        let bbox = face.global_bounding_box();
        let ascent = to_milli(face.ascender());
        let descent = to_milli(face.descender());
        let cap_height = face.capital_height().map(to_milli).unwrap_or(ascent);

        let postscript_name = face
            .names()
            .into_iter()
            .filter(|name| name.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
            .find_map(|name| name.to_string())
            .map(|name| sanitize_ps_name(&name))
            .unwrap_or_else(|| "SheetFont".to_string());

        Ok(Self {
            data,
            postscript_name,
            metrics: FontMetrics {
                widths,
                fallback_width,
            },
            ascent,
            descent,
            cap_height,
            bbox: [
                to_milli(bbox.x_min),
                to_milli(bbox.y_min),
                to_milli(bbox.x_max),
                to_milli(bbox.y_max),
            ],
        })
    }

    /// PostScript name used as the PDF /BaseFont.
    pub fn postscript_name(&self) -> &str {
        &self.postscript_name
    }

    /// Measurement table for this face.
    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    /// Raw font program bytes, embedded verbatim as /FontFile2.
    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }

    /// PDF /Widths entries for the covered range, in thousandths of em.
    pub(crate) fn widths_milli(&self) -> Vec<i64> {
        self.metrics
            .widths
            .iter()
            .map(|w| (w * 1000.0).round() as i64)
            .collect()
    }
}

/// A PDF name must not contain whitespace or delimiters; PostScript
/// names read from the wild occasionally do.
fn sanitize_ps_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.'))
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A synthetic face for layout and writer tests: every covered
    /// character is exactly half an em wide. The byte payload is inert;
    /// nothing re-parses it after construction.
    pub(crate) fn fixed_width_font() -> SheetFont {
        SheetFont {
            data: b"not a real font program".to_vec(),
            postscript_name: "Test-Mono".to_string(),
            metrics: fixed_width_metrics(),
            ascent: 800,
            descent: -200,
            cap_height: 700,
            bbox: [-100, -250, 1100, 950],
        }
    }

    pub(crate) fn fixed_width_metrics() -> FontMetrics {
        FontMetrics {
            widths: [0.5; TABLE_LEN],
            fallback_width: 0.5,
        }
    }
}
