//! Page layout: greedy word-wrap and pagination.
//!
//! Everything here is a pure function of its inputs. The vertical position
//! on the page is carried in a [`LayoutCursor`] value that each call takes
//! and returns, so pagination can be tested without any PDF backend.
//!
//! All lengths are millimetres measured from the top-left page corner;
//! font sizes are points.

use crate::error::CompositionError;
use crate::types::{OutputDocument, Page, PlacedText, SlideBody, TextStyle};

/// Millimetres per PostScript point.
pub const MM_PER_PT: f64 = 25.4 / 72.0;

/// Font metrics used for line breaking.
pub trait TextMeasure {
    /// Advance width of `text` in millimetres at `font_size` points.
    fn text_width(&self, text: &str, font_size: f64) -> f64;
}

/// Every character has the same advance, independent of font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasure {
    /// Advance of one character in millimetres.
    pub char_width: f64,
}

impl MonospaceMeasure {
    pub fn new(char_width: f64) -> Self {
        Self { char_width }
    }
}

impl TextMeasure for MonospaceMeasure {
    fn text_width(&self, text: &str, _font_size: f64) -> f64 {
        text.chars().count() as f64 * self.char_width
    }
}

/// Paper size, given in portrait orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageSize {
    A4,
    Letter,
    Custom { width: f64, height: f64 },
}

impl PageSize {
    /// Portrait (width, height) in millimetres.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Page geometry, typography and fixed annotation strings.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub page_size: PageSize,
    pub orientation: Orientation,

    /// Left and right margin; content width is page width minus both.
    pub margin: f64,

    /// Baseline of the slide label on a slide's first page.
    pub header_y: f64,
    pub header_font_size: f64,

    /// Baseline of the first body line on a slide's first page.
    pub body_top: f64,
    pub body_font_size: f64,
    pub line_height: f64,
    pub paragraph_gap: f64,

    /// Baseline of the first body line on a continuation page.
    pub continuation_top: f64,

    /// Body lines may not extend below `page height - bottom_margin`.
    pub bottom_margin: f64,

    /// Distance of the footer baseline from the bottom edge.
    pub footer_offset: f64,
    pub footer_font_size: f64,

    pub placeholder_font_size: f64,

    /// Slide label; `{n}` is replaced by the 1-based slide number.
    pub header_template: String,
    /// Line shown for a slide without extractable text.
    pub empty_placeholder: String,
    /// Line shown for a slide whose markup could not be parsed.
    pub unreadable_placeholder: String,
    pub footer_text: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            orientation: Orientation::Landscape,
            margin: 10.0,
            header_y: 15.0,
            header_font_size: 16.0,
            body_top: 30.0,
            body_font_size: 12.0,
            line_height: 6.0,
            paragraph_gap: 2.0,
            continuation_top: 20.0,
            bottom_margin: 10.0,
            footer_offset: 5.0,
            footer_font_size: 8.0,
            placeholder_font_size: 10.0,
            header_template: "Slide {n} (Extracted Text)".to_string(),
            empty_placeholder: "[No textual content detected on this slide]".to_string(),
            unreadable_placeholder: "[Slide content could not be read]".to_string(),
            footer_text: "Generated from PPTX by SmartSlide Reviewer".to_string(),
        }
    }
}

impl LayoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_footer_text(mut self, footer: impl Into<String>) -> Self {
        self.footer_text = footer.into();
        self
    }

    pub fn page_width(&self) -> f64 {
        let (w, h) = self.page_size.dimensions();
        match self.orientation {
            Orientation::Portrait => w,
            Orientation::Landscape => h,
        }
    }

    pub fn page_height(&self) -> f64 {
        let (w, h) = self.page_size.dimensions();
        match self.orientation {
            Orientation::Portrait => h,
            Orientation::Landscape => w,
        }
    }

    pub fn content_width(&self) -> f64 {
        self.page_width() - self.margin * 2.0
    }

    /// Lowest baseline a body line may occupy.
    pub fn printable_bottom(&self) -> f64 {
        self.page_height() - self.bottom_margin
    }

    pub fn footer_y(&self) -> f64 {
        self.page_height() - self.footer_offset
    }

    pub fn header_label(&self, slide_number: usize) -> String {
        self.header_template.replace("{n}", &slide_number.to_string())
    }

    /// Reject geometry no page can be written with.
    pub fn validate(&self) -> Result<(), CompositionError> {
        let (w, h) = self.page_size.dimensions();
        if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            return Err(CompositionError::RenderError(format!(
                "unsupported page size {}x{} mm",
                w, h
            )));
        }
        let lengths = [
            ("margin", self.margin),
            ("line height", self.line_height),
            ("paragraph gap", self.paragraph_gap),
            ("bottom margin", self.bottom_margin),
            ("header font size", self.header_font_size),
            ("body font size", self.body_font_size),
            ("footer font size", self.footer_font_size),
            ("placeholder font size", self.placeholder_font_size),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value < 0.0 {
                return Err(CompositionError::RenderError(format!(
                    "invalid {}: {}",
                    name, value
                )));
            }
        }
        if self.content_width() <= 0.0 {
            return Err(CompositionError::RenderError(format!(
                "margins of {} mm leave no content width on a {} mm wide page",
                self.margin,
                self.page_width()
            )));
        }
        if self.line_height <= 0.0 || self.body_font_size <= 0.0 {
            return Err(CompositionError::RenderError(
                "line height and body font size must be positive".to_string(),
            ));
        }
        let bottom = self.printable_bottom();
        if self.body_top + self.line_height > bottom
            || self.continuation_top + self.line_height > bottom
        {
            return Err(CompositionError::RenderError(format!(
                "page height of {} mm cannot hold a single body line",
                self.page_height()
            )));
        }
        Ok(())
    }
}

/// Position of the next line to be written.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutCursor {
    /// 0-based page index in the whole document.
    pub page_index: usize,
    /// Baseline of the next line, in millimetres from the top edge.
    pub y_offset: f64,
}

impl LayoutCursor {
    /// Cursor at the top of the first page of the document.
    pub fn start(config: &LayoutConfig) -> Self {
        Self {
            page_index: 0,
            y_offset: config.body_top,
        }
    }

    /// Cursor at the top of the following page.
    pub fn next_page(self, y_offset: f64) -> Self {
        Self {
            page_index: self.page_index + 1,
            y_offset,
        }
    }
}

/// A line assigned to a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub page_index: usize,
    pub text: PlacedText,
}

/// Greedy word-wrap of `text` into lines no wider than `max_width`.
///
/// Whitespace runs collapse to single spaces. A word wider than a whole
/// line is broken between characters.
pub fn wrap_text(
    text: &str,
    max_width: f64,
    font_size: f64,
    measure: &dyn TextMeasure,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() {
            let candidate = format!("{} {}", current, word);
            if measure.text_width(&candidate, font_size) <= max_width {
                current = candidate;
                continue;
            }
            lines.push(std::mem::take(&mut current));
        }

        if measure.text_width(word, font_size) <= max_width {
            current.push_str(word);
        } else {
            let mut pieces = split_word(word, max_width, font_size, measure);
            current = pieces.pop().unwrap_or_default();
            lines.extend(pieces);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Break a single word into pieces that each fit `max_width`. Every piece
/// holds at least one character.
fn split_word(word: &str, max_width: f64, font_size: f64, measure: &dyn TextMeasure) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    for ch in word.chars() {
        current.push(ch);
        if current.chars().count() > 1 && measure.text_width(&current, font_size) > max_width {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(ch);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Place the wrapped lines of one paragraph starting at `cursor`.
///
/// If the lines would run past the printable bottom, a continuation page
/// is started first. A paragraph taller than a whole continuation page is
/// split across as many pages as it needs. The returned cursor sits one
/// paragraph gap below the last line.
pub fn place_paragraph(
    cursor: LayoutCursor,
    lines: &[String],
    style: TextStyle,
    config: &LayoutConfig,
) -> (LayoutCursor, Vec<Placement>) {
    let limit = config.printable_bottom();
    let line_height = config.line_height;
    let mut cursor = cursor;
    let mut placements = Vec::with_capacity(lines.len());
    let mut remaining = lines;

    while !remaining.is_empty() {
        let needed = remaining.len() as f64 * line_height;
        if cursor.y_offset + needed <= limit {
            emit_lines(&mut placements, cursor, remaining, style, config);
            cursor.y_offset += needed + config.paragraph_gap;
            break;
        }

        if cursor.y_offset > config.continuation_top {
            cursor = cursor.next_page(config.continuation_top);
            continue;
        }

        // Even a fresh continuation page is too short: fill it and carry on.
        let capacity = (((limit - cursor.y_offset) / line_height).floor() as usize)
            .max(1)
            .min(remaining.len());
        let (now, rest) = remaining.split_at(capacity);
        emit_lines(&mut placements, cursor, now, style, config);
        remaining = rest;
        if !remaining.is_empty() {
            cursor = cursor.next_page(config.continuation_top);
        } else {
            cursor.y_offset += capacity as f64 * line_height + config.paragraph_gap;
        }
    }

    (cursor, placements)
}

fn emit_lines(
    out: &mut Vec<Placement>,
    cursor: LayoutCursor,
    lines: &[String],
    style: TextStyle,
    config: &LayoutConfig,
) {
    for (i, line) in lines.iter().enumerate() {
        out.push(Placement {
            page_index: cursor.page_index,
            text: PlacedText::new(
                line.clone(),
                config.margin,
                cursor.y_offset + i as f64 * config.line_height,
                style,
            ),
        });
    }
}

/// Lay out one slide starting on a fresh page at `cursor.page_index`.
///
/// Returns the cursor for the next slide's first page and every page this
/// slide produced. Only the first page carries the slide label; all of
/// them carry the footer.
pub fn layout_slide(
    cursor: LayoutCursor,
    slide_number: usize,
    body: &SlideBody,
    config: &LayoutConfig,
    measure: &dyn TextMeasure,
) -> (LayoutCursor, Vec<Page>) {
    let first_page = cursor.page_index;
    let mut cursor = LayoutCursor {
        page_index: first_page,
        y_offset: config.body_top,
    };
    let mut placements = Vec::new();

    match body {
        SlideBody::Paragraphs(paragraphs) => {
            for paragraph in paragraphs {
                let lines = wrap_text(
                    paragraph.as_str(),
                    config.content_width(),
                    config.body_font_size,
                    measure,
                );
                let (next, emitted) = place_paragraph(cursor, &lines, TextStyle::Body, config);
                cursor = next;
                placements.extend(emitted);
            }
        }
        SlideBody::Empty => {
            placements.push(placeholder(cursor, &config.empty_placeholder, config));
        }
        SlideBody::Unreadable => {
            placements.push(placeholder(cursor, &config.unreadable_placeholder, config));
        }
    }

    let last_page = cursor.page_index;
    let mut pages: Vec<Page> = (first_page..=last_page)
        .map(|index| Page {
            slide_number,
            header: (index == first_page).then(|| {
                PlacedText::new(
                    config.header_label(slide_number),
                    config.margin,
                    config.header_y,
                    TextStyle::Header,
                )
            }),
            lines: Vec::new(),
            footer: PlacedText::new(
                config.footer_text.clone(),
                config.margin,
                config.footer_y(),
                TextStyle::Footer,
            ),
        })
        .collect();

    for placement in placements {
        pages[placement.page_index - first_page].lines.push(placement.text);
    }

    log::debug!(
        "slide {} laid out on {} page(s) starting at page {}",
        slide_number,
        pages.len(),
        first_page + 1
    );

    (cursor.next_page(config.body_top), pages)
}

fn placeholder(cursor: LayoutCursor, text: &str, config: &LayoutConfig) -> Placement {
    Placement {
        page_index: cursor.page_index,
        text: PlacedText::new(text, config.margin, cursor.y_offset, TextStyle::Placeholder),
    }
}

/// Lay out every slide, one after another, into a single document.
pub fn layout_document(
    slides: &[SlideBody],
    config: &LayoutConfig,
    measure: &dyn TextMeasure,
) -> Result<OutputDocument, CompositionError> {
    config.validate()?;
    if slides.is_empty() {
        return Err(CompositionError::RenderError(
            "document has no slides to render".to_string(),
        ));
    }

    let mut cursor = LayoutCursor::start(config);
    let mut document = OutputDocument::default();
    for (i, body) in slides.iter().enumerate() {
        let (next, pages) = layout_slide(cursor, i + 1, body, config, measure);
        cursor = next;
        document.pages.extend(pages);
    }

    Ok(document)
}
