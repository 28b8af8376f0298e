//! Plain-text extraction from slide markup.

use crate::markup::{MarkupError, MarkupTree, NodeKind};
use deck_core::{ParagraphText, SlideText, TextSource};

/// Extract the readable text of one slide.
///
/// Paragraph nodes are tried first: each one contributes the concatenation
/// of its text nodes. When no paragraph yields anything, every text node
/// in the document is joined with single spaces into one paragraph
/// instead, which recovers text from unusual nesting at the cost of
/// paragraph breaks.
pub fn extract_slide_text(xml: &str) -> Result<SlideText, MarkupError> {
    let tree = MarkupTree::parse(xml)?;

    let paragraphs = paragraph_texts(&tree);
    if !paragraphs.is_empty() {
        return Ok(SlideText {
            paragraphs,
            source: TextSource::Paragraphs,
        });
    }

    if let Some(flat) = flat_text(&tree) {
        log::debug!("no paragraph text found, using flat text-node fallback");
        return Ok(SlideText {
            paragraphs: vec![flat],
            source: TextSource::FlatRuns,
        });
    }

    Ok(SlideText::empty())
}

/// One entry per paragraph node that has non-whitespace text, in order.
fn paragraph_texts(tree: &MarkupTree) -> Vec<ParagraphText> {
    tree.descendants_of_kind(NodeKind::Paragraph)
        .into_iter()
        .filter_map(|paragraph| {
            let text: String = paragraph
                .descendants_of_kind(NodeKind::Text)
                .into_iter()
                .map(|t| t.text_content())
                .collect();
            ParagraphText::new(&text)
        })
        .collect()
}

/// Every text node in the document, space-joined.
fn flat_text(tree: &MarkupTree) -> Option<ParagraphText> {
    let parts: Vec<String> = tree
        .descendants_of_kind(NodeKind::Text)
        .into_iter()
        .map(|t| t.text_content())
        .collect();
    ParagraphText::new(&parts.join(" "))
}
