//! Core domain types, error taxonomy, text normalization, and page layout
//! for PPTX to PDF conversion.

pub mod error;
pub mod layout;
pub mod normalize;
pub mod types;

pub use error::{CompositionError, Error, ExtractionError, LegacyDetail, Result};
pub use layout::{
    LayoutConfig, LayoutCursor, MonospaceMeasure, Orientation, PageSize, TextMeasure,
};
pub use normalize::TextNormalizer;
pub use types::{
    OutputDocument, Page, ParagraphText, PlacedText, SlideBody, SlidePayload, SlideText,
    TextSource, TextStyle,
};
