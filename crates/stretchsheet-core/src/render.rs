//! The two sheet renderers
//!
//! Both walk the same path: sanitize the items, paginate them with a
//! [`SheetSpec`], stretch each into its cell, and hand the operations to
//! the document writer. The first error aborts the whole build; there
//! is no partial-page recovery and nothing to retry.

use lopdf::content::Operation;
use tracing::debug;

use crate::error::SheetError;
use crate::font::{SheetFont, REPLACEMENT};
use crate::layout::stretch_text;
use crate::pdf::{plan_operations, DocumentBuilder};
use crate::sheet::SheetSpec;

/// A finished, fully in-memory document.
#[derive(Debug, Clone)]
pub struct RenderedSheet {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Render the name sheet: uppercased names, four stacked cells per page.
pub fn render_names<S: AsRef<str>>(
    names: &[S],
    font: &SheetFont,
) -> Result<RenderedSheet, SheetError> {
    let items: Vec<String> = names
        .iter()
        .map(|name| sanitize(&name.as_ref().to_uppercase()))
        .collect();
    render_sheet(&items, &SheetSpec::names(), font)
}

/// Render the number sheet: decimal strings, two cells side by side.
pub fn render_numbers(numbers: &[i64], font: &SheetFont) -> Result<RenderedSheet, SheetError> {
    let items: Vec<String> = numbers.iter().map(|n| n.to_string()).collect();
    render_sheet(&items, &SheetSpec::numbers(), font)
}

fn render_sheet(
    items: &[String],
    spec: &SheetSpec,
    font: &SheetFont,
) -> Result<RenderedSheet, SheetError> {
    let mut builder = DocumentBuilder::new(font, spec.page_width, spec.page_height);

    // A document with no pages is not a valid PDF; an empty upload still
    // produces one blank page.
    let page_count = spec.page_count(items.len()).max(1);

    for page in 0..page_count {
        let start = page * spec.per_page;
        let end = (start + spec.per_page).min(items.len());

        let mut operations: Vec<Operation> = Vec::new();
        for (slot, item) in items[start.min(end)..end].iter().enumerate() {
            let cell = spec.cell(slot);
            if let Some(plan) =
                stretch_text(item, font.metrics(), spec.font_size, spec.line_height, cell)
            {
                operations.extend(plan_operations(&plan, spec.font_size));
            }
        }
        builder.push_page(operations)?;
    }

    let bytes = builder.finish()?;
    debug!(pages = page_count, bytes = bytes.len(), "sheet rendered");
    Ok(RenderedSheet { bytes, page_count })
}

/// Map anything the embedded encoding cannot show to the replacement
/// character, so measurement and drawing agree on every width.
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_graphic() || c == ' ' {
                c
            } else {
                REPLACEMENT
            }
        })
        .collect()
}
