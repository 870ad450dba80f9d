//! PDF document assembly
//!
//! Builds the output document object by object with lopdf: one embedded
//! TrueType font shared by every page, one content stream per page. Each
//! planned glyph is shown under its own absolute text matrix. `Tm`
//! replaces the matrix rather than composing with it, so no transform
//! state survives from one character to the next.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::error::SheetError;
use crate::font::{SheetFont, REPLACEMENT};
use crate::layout::StretchPlan;

/// Resource name the content streams use for the embedded font.
const FONT_RESOURCE: &str = "F1";

/// Incrementally assembled output document.
pub(crate) struct DocumentBuilder {
    doc: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
    page_width: f32,
    page_height: f32,
}

impl DocumentBuilder {
    pub(crate) fn new(font: &SheetFont, page_width: f32, page_height: f32) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_file_id = doc.add_object(Stream::new(
            dictionary! { "Length1" => font.data().len() as i64 },
            font.data().to_vec(),
        ));
        let base_font = Object::Name(font.postscript_name().as_bytes().to_vec());
        let descriptor_id = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => base_font.clone(),
            "Flags" => 32,
            "FontBBox" => font.bbox.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>(),
            "ItalicAngle" => 0,
            "Ascent" => font.ascent,
            "Descent" => font.descent,
            "CapHeight" => font.cap_height,
            "StemV" => 80,
            "FontFile2" => font_file_id,
        });
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => base_font,
            "FirstChar" => 32,
            "LastChar" => 126,
            "Widths" => font.widths_milli().into_iter().map(Object::Integer).collect::<Vec<_>>(),
            "FontDescriptor" => descriptor_id,
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { FONT_RESOURCE => font_id },
        });

        Self {
            doc,
            pages_id,
            resources_id,
            page_ids: Vec::new(),
            page_width,
            page_height,
        }
    }

    /// Append a page holding the given content operations.
    pub(crate) fn push_page(&mut self, operations: Vec<Operation>) -> Result<(), SheetError> {
        let content = Content { operations };
        let stream_id = self
            .doc
            .add_object(Stream::new(lopdf::Dictionary::new(), content.encode()?));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(self.page_width),
                Object::Real(self.page_height),
            ],
            "Contents" => stream_id,
            "Resources" => self.resources_id,
        });
        self.page_ids.push(page_id);
        Ok(())
    }

    /// Close the page tree and serialize the document.
    pub(crate) fn finish(mut self) -> Result<Vec<u8>, SheetError> {
        let kids: Vec<Object> = self.page_ids.iter().map(|id| (*id).into()).collect();
        let count = self.page_ids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();

        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

/// Content-stream operations for one stretched item.
pub(crate) fn plan_operations(plan: &StretchPlan, font_size: f32) -> Vec<Operation> {
    let mut ops = Vec::with_capacity(2 * plan.glyphs.len() + 3);
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![Object::Name(FONT_RESOURCE.into()), Object::Real(font_size)],
    ));
    for glyph in &plan.glyphs {
        ops.push(Operation::new(
            "Tm",
            vec![
                Object::Real(plan.scale_x),
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(plan.scale_y),
                Object::Real(glyph.x),
                Object::Real(plan.baseline),
            ],
        ));
        ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(vec![encode_char(glyph.ch)])],
        ));
    }
    ops.push(Operation::new("ET", vec![]));
    ops
}

/// Byte shown for `ch` under the embedded WinAnsi encoding. The
/// renderers substitute before layout, so anything still outside the
/// covered range maps to the replacement byte.
pub(crate) fn encode_char(ch: char) -> u8 {
    if ch.is_ascii_graphic() || ch == ' ' {
        ch as u8
    } else {
        REPLACEMENT as u8
    }
}

#[cfg(test)]
mod tests {
    use lopdf::Document;

    use super::*;
    use crate::font::test_support::fixed_width_font;
    use crate::layout::{stretch_text, Cell};

    fn sample_plan() -> StretchPlan {
        let font = fixed_width_font();
        stretch_text(
            "HI",
            font.metrics(),
            12.0,
            12.0,
            Cell {
                x: 7.2,
                y: 100.0,
                width: 240.0,
                height: 60.0,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_builder_produces_a_loadable_document() {
        let font = fixed_width_font();
        let mut builder = DocumentBuilder::new(&font, 841.89, 595.28);
        builder
            .push_page(plan_operations(&sample_plan(), 12.0))
            .unwrap();
        let bytes = builder.finish().unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_font_program_is_embedded_once() {
        let font = fixed_width_font();
        let mut builder = DocumentBuilder::new(&font, 841.89, 595.28);
        for _ in 0..3 {
            builder
                .push_page(plan_operations(&sample_plan(), 12.0))
                .unwrap();
        }
        let bytes = builder.finish().unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        let font_files = doc
            .objects
            .values()
            .filter(|obj| {
                matches!(obj, Object::Stream(s) if s.dict.has(b"Length1"))
            })
            .count();
        assert_eq!(font_files, 1);
    }

    #[test]
    fn test_plan_operations_one_matrix_per_glyph() {
        let plan = sample_plan();
        let ops = plan_operations(&plan, 12.0);

        let matrices = ops.iter().filter(|op| op.operator == "Tm").count();
        let shows = ops.iter().filter(|op| op.operator == "Tj").count();
        assert_eq!(matrices, plan.glyphs.len());
        assert_eq!(shows, plan.glyphs.len());
        assert_eq!(ops.first().unwrap().operator, "BT");
        assert_eq!(ops.last().unwrap().operator, "ET");
    }

    #[test]
    fn test_encode_char_replaces_unencodable() {
        assert_eq!(encode_char('A'), b'A');
        assert_eq!(encode_char(' '), b' ');
        assert_eq!(encode_char('É'), b'?');
    }
}
