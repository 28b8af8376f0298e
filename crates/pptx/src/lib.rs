//! PPTX (Office Open XML) container extraction and slide text parsing.
//!
//! A .pptx file is a ZIP archive; each slide is an XML part under
//! `ppt/slides/`. This crate validates the container, pulls out the slide
//! parts in order, and reads the text out of their markup.

pub mod container;
pub mod legacy;
pub mod markup;
pub mod text;

pub use container::ContainerExtractor;
pub use markup::{Element, MarkupError, MarkupTree, Node, NodeKind};
pub use text::extract_slide_text;
