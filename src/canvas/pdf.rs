//! One-page PDF assembly with lopdf.
//!
//! The object graph is built in a fixed order and carries no Info dictionary,
//! dates or file IDs, so the same operations always serialize to the same bytes.

use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};

use crate::errors::CanvasError;
use crate::types::Color;

pub(crate) const PDF_VERSION: &str = "1.5";

/// Real operand (PDF content streams use single precision)
pub(crate) fn real(v: f64) -> Object {
    Object::Real(v as f32)
}

pub(crate) fn name(n: &str) -> Object {
    Object::Name(n.as_bytes().to_vec())
}

pub(crate) fn op(operator: &str, operands: Vec<Object>) -> Operation {
    Operation::new(operator, operands)
}

/// Named page resources referenced from the content stream
#[derive(Debug, Default)]
pub(crate) struct PageResources {
    /// Base font → resource name (`F1`, `F2`, ... in order of first use)
    fonts: BTreeMap<&'static str, String>,
    /// Transparency byte → ExtGState resource name and its opacity
    opacities: BTreeMap<u32, (String, f64)>,
}

impl PageResources {
    pub(crate) fn font(&mut self, base_font: &'static str) -> String {
        let next = format!("F{}", self.fonts.len() + 1);
        self.fonts.entry(base_font).or_insert(next).clone()
    }

    pub(crate) fn opacity(&mut self, color: Color) -> String {
        let next = format!("GS{}", self.opacities.len() + 1);
        let (resource, _) = self
            .opacities
            .entry(color.0 >> 24)
            .or_insert_with(|| (next, color.alpha()));
        resource.clone()
    }

    fn into_dictionary(self, doc: &mut Document) -> Dictionary {
        let mut resources = Dictionary::new();

        if !self.fonts.is_empty() {
            let mut fonts = Dictionary::new();
            for (base_font, resource) in self.fonts {
                let font_id = doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => base_font,
                    "Encoding" => "WinAnsiEncoding",
                });
                fonts.set(resource.as_str(), font_id);
            }
            resources.set("Font", fonts);
        }

        if !self.opacities.is_empty() {
            let mut states = Dictionary::new();
            for (resource, alpha) in self.opacities.into_values() {
                states.set(
                    resource.as_str(),
                    dictionary! {
                        "Type" => "ExtGState",
                        "CA" => real(alpha),
                        "ca" => real(alpha),
                    },
                );
            }
            resources.set("ExtGState", states);
        }

        resources
    }
}

/// Assemble a single-page document of `width` x `height` points.
pub(crate) fn build_document(
    width: f64,
    height: f64,
    operations: Vec<Operation>,
    resources: PageResources,
) -> Result<Document, CanvasError> {
    let mut doc = Document::with_version(PDF_VERSION);
    let pages_id = doc.new_object_id();

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));
    let resources = resources.into_dictionary(&mut doc);

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![Object::Integer(0), Object::Integer(0), real(width), real(height)],
        "Contents" => content_id,
        "Resources" => resources,
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => Object::Integer(1),
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    Ok(doc)
}
