//! Fixed-layout PDF sink.
//!
//! Implements [`PageSink`] over `lopdf`: a pages tree, the two base-14
//! Helvetica font resources (no embedding needed), buffered per-page content
//! operations, and link annotations. `finish` writes the file in one shot —
//! on any earlier failure no output file exists.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::errors::AppError;
use crate::layout::engine::{PageSink, SinkResult};
use crate::layout::font_metrics::{Font, Geometry};

/// Resource names of the two fonts in every page's font dictionary.
fn font_resource_name(font: Font) -> &'static str {
    match font {
        Font::Helvetica => "F1",
        Font::HelveticaBold => "F2",
    }
}

pub struct PdfSink {
    doc: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    geom: Geometry,
    /// Content operations of the page currently being drawn.
    ops: Vec<Operation>,
    /// Link annotations of the current page.
    annots: Vec<ObjectId>,
    page_ids: Vec<ObjectId>,
    page_open: bool,
}

impl PdfSink {
    pub fn new(geom: Geometry) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => Font::Helvetica.base_name(),
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => Font::HelveticaBold.base_name(),
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                font_resource_name(Font::Helvetica) => Object::Reference(regular_id),
                font_resource_name(Font::HelveticaBold) => Object::Reference(bold_id),
            },
        });

        Self {
            doc,
            pages_id,
            resources_id,
            geom,
            ops: Vec::new(),
            annots: Vec::new(),
            page_ids: Vec::new(),
            page_open: false,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len() + usize::from(self.page_open)
    }

    /// Encodes the buffered operations into a content stream and appends the
    /// finished page to the pages tree.
    fn flush_page(&mut self) -> Result<(), AppError> {
        let content = Content {
            operations: std::mem::take(&mut self.ops),
        };
        let stream_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), content.encode()?));

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => stream_id,
            "Resources" => self.resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                self.geom.page_width.into(),
                self.geom.page_height.into(),
            ],
        };
        if !self.annots.is_empty() {
            let refs: Vec<Object> = self
                .annots
                .drain(..)
                .map(Object::Reference)
                .collect();
            page.set("Annots", refs);
        }

        let page_id = self.doc.add_object(page);
        self.page_ids.push(page_id);
        self.page_open = false;
        Ok(())
    }

    /// Finalizes the last page, assembles the pages tree and catalog, and
    /// saves the document.
    pub fn finish(mut self, path: &Path) -> Result<(), AppError> {
        if self.page_open {
            self.flush_page()?;
        }

        let kids: Vec<Object> = self.page_ids.iter().copied().map(Object::Reference).collect();
        let count = kids.len() as i64;
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
        self.doc.save(path)?;
        Ok(())
    }
}

impl PageSink for PdfSink {
    fn begin_page(&mut self) -> SinkResult {
        if self.page_open {
            self.flush_page()?;
        }
        self.page_open = true;
        Ok(())
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str, font: Font, size: f32) -> SinkResult {
        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new(
            "Tf",
            vec![font_resource_name(font).into(), size.into()],
        ));
        self.ops
            .push(Operation::new("Td", vec![x.into(), y.into()]));
        self.ops
            .push(Operation::new("Tj", vec![Object::string_literal(text)]));
        self.ops.push(Operation::new("ET", vec![]));
        Ok(())
    }

    fn draw_rule(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> SinkResult {
        self.ops
            .push(Operation::new("m", vec![x1.into(), y1.into()]));
        self.ops
            .push(Operation::new("l", vec![x2.into(), y2.into()]));
        self.ops.push(Operation::new("S", vec![]));
        Ok(())
    }

    fn draw_link(
        &mut self,
        x: f32,
        y: f32,
        text: &str,
        font: Font,
        size: f32,
        uri: &str,
    ) -> SinkResult {
        // Link text in blue, then restore black fill.
        self.ops.push(Operation::new(
            "rg",
            vec![Object::Real(0.0), Object::Real(0.0), Object::Real(1.0)],
        ));
        self.draw_text(x, y, text, font, size)?;
        self.ops.push(Operation::new(
            "rg",
            vec![Object::Real(0.0), Object::Real(0.0), Object::Real(0.0)],
        ));

        let width = self.measure(text, font, size);
        let annot_id = self.doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => vec![
                x.into(),
                (y - 2.0).into(),
                (x + width).into(),
                (y + size).into(),
            ],
            "Border" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(0)],
            "A" => dictionary! {
                "S" => "URI",
                "URI" => Object::string_literal(uri),
            },
        });
        self.annots.push(annot_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count_tracks_open_and_flushed_pages() {
        let mut sink = PdfSink::new(Geometry::letter());
        assert_eq!(sink.page_count(), 0);
        sink.begin_page().unwrap();
        assert_eq!(sink.page_count(), 1);
        sink.begin_page().unwrap();
        sink.begin_page().unwrap();
        assert_eq!(sink.page_count(), 3);
    }

    #[test]
    fn test_finish_writes_loadable_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");

        let mut sink = PdfSink::new(Geometry::letter());
        sink.begin_page().unwrap();
        sink.draw_text(50.0, 700.0, "Hello", Font::HelveticaBold, 16.0)
            .unwrap();
        sink.draw_rule(50.0, 690.0, 562.0, 690.0).unwrap();
        sink.draw_link(
            50.0,
            698.0,
            "Example",
            Font::Helvetica,
            10.0,
            "https://example.com",
        )
        .unwrap();
        sink.begin_page().unwrap();
        sink.draw_text(50.0, 742.0, "Page two", Font::Helvetica, 10.0)
            .unwrap();
        sink.finish(&path).unwrap();

        let reloaded = Document::load(&path).expect("saved pdf must parse");
        assert_eq!(reloaded.get_pages().len(), 2);
    }

    #[test]
    fn test_no_file_without_finish() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never.pdf");
        let mut sink = PdfSink::new(Geometry::letter());
        sink.begin_page().unwrap();
        sink.draw_text(50.0, 700.0, "drops on the floor", Font::Helvetica, 10.0)
            .unwrap();
        drop(sink);
        assert!(!path.exists());
    }
}
