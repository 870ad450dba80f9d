//! Error types for sheet rendering

use thiserror::Error;

/// Errors surfaced while turning an uploaded table into PDF sheets.
///
/// Input-shaped failures (`MissingColumn`, `InvalidNumber`, `Csv`) are
/// raised before any page is built; there is no partial output to clean
/// up and no retry anywhere.
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("row {row}: '{value}' is not a number")]
    InvalidNumber { row: usize, value: String },

    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("PDF generation failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("PDF serialization failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading the sheet font.
///
/// The font is loaded once at process start; any of these is a fatal
/// configuration error for the caller, never a per-request one.
#[derive(Error, Debug)]
pub enum FontError {
    #[error("failed to read font file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse font face: {0}")]
    Parse(String),

    #[error("font face is unusable: {0}")]
    UnsupportedFace(&'static str),
}
