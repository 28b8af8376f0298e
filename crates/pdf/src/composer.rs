//! Composition of slide payloads into a paginated PDF.

use crate::metrics::HelveticaMetrics;
use crate::writer::write_pdf;
use deck_core::layout::{layout_document, LayoutConfig};
use deck_core::{
    CompositionError, OutputDocument, SlideBody, SlidePayload, SlideText, TextNormalizer,
};
use deck_pptx::extract_slide_text;

/// What to do when one slide's markup is not well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedSlidePolicy {
    /// Abort the whole conversion with `MalformedMarkup`.
    #[default]
    Abort,
    /// Render an error placeholder page for that slide and continue.
    Placeholder,
}

/// Options controlling composition.
#[derive(Debug, Clone, Default)]
pub struct ComposerOptions {
    pub layout: LayoutConfig,
    pub malformed_policy: MalformedSlidePolicy,
}

impl ComposerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_malformed_policy(mut self, policy: MalformedSlidePolicy) -> Self {
        self.malformed_policy = policy;
        self
    }
}

/// A finished conversion: the PDF bytes plus the layout they were drawn from.
#[derive(Debug, Clone)]
pub struct ComposedDocument {
    pub bytes: Vec<u8>,
    pub document: OutputDocument,
    pub slide_count: usize,
    /// Slides rendered as error placeholders under
    /// [`MalformedSlidePolicy::Placeholder`].
    pub unreadable_slides: Vec<usize>,
}

impl ComposedDocument {
    pub fn page_count(&self) -> usize {
        self.document.page_count()
    }
}

/// Turns ordered slide payloads into a text-only PDF, one slide per page
/// (plus continuation pages for long slides).
#[derive(Debug, Clone, Default)]
pub struct DocumentComposer {
    options: ComposerOptions,
    normalizer: TextNormalizer,
    metrics: HelveticaMetrics,
}

impl DocumentComposer {
    /// Create a composer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a composer with the given options.
    pub fn with_options(options: ComposerOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &ComposerOptions {
        &self.options
    }

    /// Compose `slides` into PDF bytes.
    pub fn compose(&self, slides: Vec<SlidePayload>) -> Result<Vec<u8>, CompositionError> {
        Ok(self.compose_document(slides)?.bytes)
    }

    /// Compose `slides`, keeping the intermediate layout alongside the bytes.
    pub fn compose_document(
        &self,
        slides: Vec<SlidePayload>,
    ) -> Result<ComposedDocument, CompositionError> {
        let slide_count = slides.len();
        let mut bodies = Vec::with_capacity(slide_count);
        let mut unreadable_slides = Vec::new();

        for (i, payload) in slides.into_iter().enumerate() {
            let body = self.slide_body(i + 1, payload)?;
            if body == SlideBody::Unreadable {
                unreadable_slides.push(i + 1);
            }
            bodies.push(body);
        }

        let document = layout_document(&bodies, &self.options.layout, &self.metrics)?;
        let bytes = write_pdf(&document, &self.options.layout)?;

        log::debug!(
            "composed {} slide(s) into {} page(s)",
            slide_count,
            document.page_count()
        );

        Ok(ComposedDocument {
            bytes,
            document,
            slide_count,
            unreadable_slides,
        })
    }

    /// Extract and normalize the text of one slide.
    fn slide_body(
        &self,
        position: usize,
        payload: SlidePayload,
    ) -> Result<SlideBody, CompositionError> {
        match extract_slide_text(&payload.raw_xml) {
            Ok(text) => {
                let paragraphs = self.normalizer.normalize_paragraphs(&text.paragraphs);
                let body = SlideBody::from(SlideText {
                    paragraphs,
                    source: text.source,
                });
                if body == SlideBody::Empty {
                    log::debug!("slide {} ({}) has no text", position, payload.path);
                }
                Ok(body)
            }
            Err(e) => match self.options.malformed_policy {
                MalformedSlidePolicy::Abort => Err(CompositionError::MalformedMarkup {
                    slide: position,
                    path: payload.path,
                    reason: e.to_string(),
                }),
                MalformedSlidePolicy::Placeholder => {
                    log::warn!(
                        "slide {} ({}) could not be parsed, rendering placeholder: {}",
                        position,
                        payload.path,
                        e
                    );
                    Ok(SlideBody::Unreadable)
                }
            },
        }
    }
}
