//! Text-only PDF composition for PPTX presentations.
//!
//! [`convert`] runs the whole pipeline: the container is validated and its
//! slide parts extracted by [`deck_pptx::ContainerExtractor`], then the
//! [`DocumentComposer`] reads each slide's text, lays it out and writes
//! the PDF.

pub mod composer;
pub mod encoding;
pub mod metrics;
pub mod writer;

pub use composer::{ComposedDocument, ComposerOptions, DocumentComposer, MalformedSlidePolicy};
pub use metrics::HelveticaMetrics;
pub use writer::write_pdf;

use deck_pptx::ContainerExtractor;

/// MIME type of the generated document.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Convert a PPTX byte buffer into a PDF document.
pub fn convert(bytes: &[u8], options: &ComposerOptions) -> deck_core::Result<ComposedDocument> {
    let slides = ContainerExtractor::new().extract(bytes)?;
    let composer = DocumentComposer::with_options(options.clone());
    Ok(composer.compose_document(slides)?)
}

/// Convert with default options, returning only the PDF bytes.
pub fn convert_to_pdf(bytes: &[u8]) -> deck_core::Result<Vec<u8>> {
    Ok(convert(bytes, &ComposerOptions::default())?.bytes)
}
