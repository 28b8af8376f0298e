//! Text cleanup applied to extracted paragraphs before layout.
//!
//! Slide text frequently carries tabs, vertical tabs (soft line breaks),
//! stray control characters and decomposed accents. The PDF text primitive
//! draws none of those sensibly, so they are folded away here.

use crate::types::ParagraphText;
use unicode_normalization::UnicodeNormalization;

/// Normalizer for paragraph text.
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer {
    _private: (),
}

impl TextNormalizer {
    /// Create a new normalizer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a single piece of text.
    ///
    /// - Applies Unicode NFC composition.
    /// - Replaces control characters (tabs, line breaks, etc.) with spaces.
    /// - Collapses runs of whitespace and trims the ends.
    pub fn normalize(&self, text: &str) -> String {
        let composed: String = text
            .nfc()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();

        composed.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Normalize a paragraph, dropping it if nothing visible remains.
    pub fn normalize_paragraph(&self, paragraph: &ParagraphText) -> Option<ParagraphText> {
        ParagraphText::new(&self.normalize(paragraph.as_str()))
    }

    /// Normalize every paragraph of a slide, keeping order.
    pub fn normalize_paragraphs(&self, paragraphs: &[ParagraphText]) -> Vec<ParagraphText> {
        paragraphs
            .iter()
            .filter_map(|p| self.normalize_paragraph(p))
            .collect()
    }
}
