//! Domain types flowing between pipeline stages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The XML of one slide part, tagged with the number parsed from its path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlidePayload {
    /// Numeric suffix of `ppt/slides/slideN.xml`; 0 if it failed to parse.
    pub index: u64,

    /// Archive path the payload was read from.
    pub path: String,

    /// Decoded slide markup.
    pub raw_xml: String,
}

impl SlidePayload {
    /// Create a new payload.
    pub fn new(index: u64, path: impl Into<String>, raw_xml: impl Into<String>) -> Self {
        Self {
            index,
            path: path.into(),
            raw_xml: raw_xml.into(),
        }
    }
}

/// Text of one paragraph node. Never empty, never padded with whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphText(String);

impl ParagraphText {
    /// Trim `text` and wrap it, or return `None` if nothing is left.
    pub fn new(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParagraphText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ParagraphText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Which extraction branch produced a slide's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextSource {
    /// Grouped by paragraph nodes.
    Paragraphs,
    /// Flat join of every text node; paragraph breaks are lost.
    FlatRuns,
    /// Nothing extractable.
    Empty,
}

/// Text extracted from one slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideText {
    pub paragraphs: Vec<ParagraphText>,
    pub source: TextSource,
}

impl SlideText {
    /// A slide with no extractable text.
    pub fn empty() -> Self {
        Self {
            paragraphs: Vec::new(),
            source: TextSource::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }
}

/// What the layout engine renders for one slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlideBody {
    /// Paragraphs to wrap and paginate.
    Paragraphs(Vec<ParagraphText>),
    /// No text was found; render the sentinel placeholder.
    Empty,
    /// The markup could not be parsed; render the error placeholder.
    Unreadable,
}

impl From<SlideText> for SlideBody {
    fn from(text: SlideText) -> Self {
        if text.paragraphs.is_empty() {
            SlideBody::Empty
        } else {
            SlideBody::Paragraphs(text.paragraphs)
        }
    }
}

/// Visual role of a piece of placed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextStyle {
    /// Slide number label at the top of a slide's first page.
    Header,
    /// Wrapped paragraph line.
    Body,
    /// Sentinel or error placeholder line.
    Placeholder,
    /// Generator attribution at the bottom of every page.
    Footer,
}

/// A line of text at a fixed position. Coordinates are in millimetres from
/// the top-left corner of the page; `y` is the text baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedText {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub style: TextStyle,
}

impl PlacedText {
    pub fn new(text: impl Into<String>, x: f64, y: f64, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            style,
        }
    }
}

/// One output page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based slide number this page belongs to.
    pub slide_number: usize,

    /// Slide label; only present on the slide's first page.
    pub header: Option<PlacedText>,

    /// Body and placeholder lines, top to bottom.
    pub lines: Vec<PlacedText>,

    /// Attribution line, present on every page.
    pub footer: PlacedText,
}

impl Page {
    /// Text of every body/placeholder line on the page.
    pub fn line_texts(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }

    /// Header, lines and footer in drawing order.
    pub fn all_text(&self) -> impl Iterator<Item = &PlacedText> {
        self.header
            .iter()
            .chain(self.lines.iter())
            .chain(std::iter::once(&self.footer))
    }
}

/// The finished, paginated document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputDocument {
    pub pages: Vec<Page>,
}

impl OutputDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}
