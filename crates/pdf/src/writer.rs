//! Serialization of a laid-out document to PDF bytes.
//!
//! Output is fully deterministic: objects are numbered in page order, no
//! creation dates or document IDs are written, and content streams are
//! stored uncompressed.

use crate::encoding::encode_str;
use deck_core::layout::{LayoutConfig, MM_PER_PT};
use deck_core::{CompositionError, OutputDocument, Page, PlacedText, TextStyle};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use std::fmt::Display;

/// PDF version written in the header.
const PDF_VERSION: &str = "1.5";

/// Resource name of the body font.
const FONT_NAME: &str = "F1";

const PRODUCER: &str = "deckprint";

/// RGB fill for grey annotation text.
const GREY: (f64, f64, f64) = (150.0 / 255.0, 150.0 / 255.0, 150.0 / 255.0);
const BLACK: (f64, f64, f64) = (0.0, 0.0, 0.0);

/// Write `document` as a PDF using page geometry and font sizes from `config`.
pub fn write_pdf(
    document: &OutputDocument,
    config: &LayoutConfig,
) -> Result<Vec<u8>, CompositionError> {
    config.validate()?;
    if document.pages.is_empty() {
        return Err(CompositionError::RenderError(
            "document has no pages".to_string(),
        ));
    }

    let mut doc = Document::with_version(PDF_VERSION);
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_NAME => font_id,
        },
    });

    let page_height_pt = mm_to_pt(config.page_height());
    let mut kids: Vec<Object> = Vec::with_capacity(document.pages.len());

    for page in &document.pages {
        let content = page_content(page, config, page_height_pt);
        let encoded = content.encode().map_err(render_error)?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::from(mm_to_pt(config.page_width())),
            Object::from(page_height_pt),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Producer" => Object::string_literal(PRODUCER),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(render_error)?;
    log::debug!(
        "wrote PDF with {} page(s), {} bytes",
        page_count,
        bytes.len()
    );

    Ok(bytes)
}

fn page_content(page: &Page, config: &LayoutConfig, page_height_pt: f64) -> Content {
    let mut operations = Vec::new();
    for text in page.all_text() {
        push_text(&mut operations, text, config, page_height_pt);
    }
    Content { operations }
}

fn push_text(
    operations: &mut Vec<Operation>,
    text: &PlacedText,
    config: &LayoutConfig,
    page_height_pt: f64,
) {
    let (size, colour) = match text.style {
        TextStyle::Header => (config.header_font_size, BLACK),
        TextStyle::Body => (config.body_font_size, BLACK),
        TextStyle::Placeholder => (config.placeholder_font_size, GREY),
        TextStyle::Footer => (config.footer_font_size, GREY),
    };

    operations.push(Operation::new("BT", vec![]));
    operations.push(Operation::new(
        "Tf",
        vec![FONT_NAME.into(), Object::from(size)],
    ));
    operations.push(Operation::new(
        "rg",
        vec![
            Object::from(round(colour.0)),
            Object::from(round(colour.1)),
            Object::from(round(colour.2)),
        ],
    ));
    operations.push(Operation::new(
        "Td",
        vec![
            Object::from(mm_to_pt(text.x)),
            Object::from(round(page_height_pt - mm_to_pt(text.y))),
        ],
    ));
    operations.push(Operation::new(
        "Tj",
        vec![Object::String(encode_str(&text.text), StringFormat::Literal)],
    ));
    operations.push(Operation::new("ET", vec![]));
}

/// Millimetres to points, rounded to two decimals.
fn mm_to_pt(mm: f64) -> f64 {
    round(mm / MM_PER_PT)
}

fn round(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn render_error(err: impl Display) -> CompositionError {
    CompositionError::RenderError(err.to_string())
}
