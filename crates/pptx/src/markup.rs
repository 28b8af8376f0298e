//! Typed element tree for slide markup.
//!
//! Slide XML is parsed into a small tree where every element is tagged
//! with a [`NodeKind`] resolved from its namespace, so extraction code asks
//! for "paragraphs" and "text nodes" instead of matching tag strings.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use thiserror::Error;

/// DrawingML main namespace, home of `a:p`, `a:r` and `a:t`.
pub const DRAWINGML_NS: &[u8] = b"http://schemas.openxmlformats.org/drawingml/2006/main";

/// Conventional prefix for DrawingML, used when a document forgets to
/// declare the namespace.
const DRAWINGML_PREFIX: &[u8] = b"a";

/// Deepest element nesting accepted. Tree walks are recursive, so this
/// also bounds their stack use.
pub const MAX_DEPTH: usize = 512;

/// Errors raised for markup that is not well-formed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    /// The XML tokenizer rejected the input.
    #[error("XML syntax error: {0}")]
    Syntax(String),

    /// The document ended while elements were still open.
    #[error("unexpected end of document inside <{0}>")]
    UnclosedElement(String),

    /// There is no root element at all.
    #[error("document has no root element")]
    NoRootElement,

    /// A second top-level element or text follows the root.
    #[error("content outside the root element")]
    ContentOutsideRoot,

    /// An element or attribute name is not a valid XML name.
    #[error("invalid name '{0}'")]
    InvalidName(String),

    /// Elements are nested deeper than [`MAX_DEPTH`].
    #[error("elements nested deeper than {0} levels")]
    TooDeep(usize),
}

/// Structural role of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// `a:p`, a block of text.
    Paragraph,
    /// `a:r` or `a:fld`, an inline span inside a paragraph.
    Run,
    /// `a:t`, character data of a run.
    Text,
    /// Anything else.
    Other,
}

impl NodeKind {
    fn from_drawingml_local(local: &[u8]) -> Self {
        match local {
            b"p" => NodeKind::Paragraph,
            b"r" | b"fld" => NodeKind::Run,
            b"t" => NodeKind::Text,
            _ => NodeKind::Other,
        }
    }

    fn resolve(ns: &ResolveResult, prefix: Option<&[u8]>, local: &[u8]) -> Self {
        match ns {
            ResolveResult::Bound(namespace) if namespace.0 == DRAWINGML_NS => {
                Self::from_drawingml_local(local)
            }
            ResolveResult::Unknown(_) if prefix == Some(DRAWINGML_PREFIX) => {
                Self::from_drawingml_local(local)
            }
            _ => NodeKind::Other,
        }
    }
}

/// A node of the markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element and its children in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub kind: NodeKind,
    /// Qualified name as written, e.g. `a:p`.
    pub name: String,
    pub children: Vec<Node>,
}

impl Element {
    fn new(kind: NodeKind, name: String) -> Self {
        Self {
            kind,
            name,
            children: Vec::new(),
        }
    }

    /// Direct child elements of the given kind.
    pub fn children_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(move |node| match node {
            Node::Element(e) if e.kind == kind => Some(e),
            _ => None,
        })
    }

    /// All descendant elements of the given kind in document order,
    /// nested matches included, `self` excluded.
    pub fn descendants_of_kind(&self, kind: NodeKind) -> Vec<&Element> {
        let mut found = Vec::new();
        collect_descendants(self, kind, &mut found);
        found
    }

    /// Concatenated character data of every descendant.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        append_text(self, &mut out);
        out
    }
}

fn collect_descendants<'a>(element: &'a Element, kind: NodeKind, found: &mut Vec<&'a Element>) {
    for node in &element.children {
        if let Node::Element(child) = node {
            if child.kind == kind {
                found.push(child);
            }
            collect_descendants(child, kind, found);
        }
    }
}

fn append_text(element: &Element, out: &mut String) {
    for node in &element.children {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(child) => append_text(child, out),
        }
    }
}

/// A parsed, well-formed XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupTree {
    root: Element,
}

impl MarkupTree {
    /// Parse `xml`, failing on anything that is not well-formed.
    pub fn parse(xml: &str) -> Result<Self, MarkupError> {
        let mut reader = NsReader::from_str(xml);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let (kind, event) = match reader.read_resolved_event() {
                Ok((ns, event)) => {
                    let kind = match &event {
                        Event::Start(e) | Event::Empty(e) => {
                            let name = e.name();
                            NodeKind::resolve(
                                &ns,
                                name.prefix().map(|p| p.into_inner()),
                                name.local_name().into_inner(),
                            )
                        }
                        _ => NodeKind::Other,
                    };
                    (kind, event)
                }
                Err(e) => return Err(MarkupError::Syntax(e.to_string())),
            };

            match event {
                Event::Start(e) => {
                    let name = checked_name(&e)?;
                    if stack.len() >= MAX_DEPTH {
                        return Err(MarkupError::TooDeep(MAX_DEPTH));
                    }
                    stack.push(Element::new(kind, name));
                }
                Event::Empty(e) => {
                    let name = checked_name(&e)?;
                    attach(&mut stack, &mut root, Element::new(kind, name))?;
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or(MarkupError::ContentOutsideRoot)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(e) => {
                    let text = e
                        .unescape()
                        .map_err(|err| MarkupError::Syntax(err.to_string()))?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(Node::Text(text.into_owned())),
                        None if text.trim().is_empty() => {}
                        None => return Err(MarkupError::ContentOutsideRoot),
                    }
                }
                Event::CData(e) => {
                    let bytes = e.into_inner();
                    match stack.last_mut() {
                        Some(parent) => parent
                            .children
                            .push(Node::Text(String::from_utf8_lossy(&bytes).into_owned())),
                        None => return Err(MarkupError::ContentOutsideRoot),
                    }
                }
                Event::Eof => {
                    if let Some(open) = stack.last() {
                        return Err(MarkupError::UnclosedElement(open.name.clone()));
                    }
                    break;
                }
                _ => {}
            }
        }

        root.map(|root| Self { root })
            .ok_or(MarkupError::NoRootElement)
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// All elements of the given kind in the document, root included.
    pub fn descendants_of_kind(&self, kind: NodeKind) -> Vec<&Element> {
        let mut found = Vec::new();
        if self.root.kind == kind {
            found.push(&self.root);
        }
        collect_descendants(&self.root, kind, &mut found);
        found
    }
}

/// Validate the tag name and every attribute, returning the name.
fn checked_name(start: &BytesStart) -> Result<String, MarkupError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    if !is_xml_name(&name) {
        return Err(MarkupError::InvalidName(name));
    }
    for attr in start.attributes() {
        let attr = attr.map_err(|e| MarkupError::Syntax(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if !is_xml_name(&key) {
            return Err(MarkupError::InvalidName(key));
        }
    }
    Ok(name)
}

/// XML `Name` production, with every non-ASCII character accepted.
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_well = match chars.next() {
        Some(c) => c.is_ascii_alphabetic() || c == '_' || c == ':' || !c.is_ascii(),
        None => false,
    };
    starts_well
        && chars.all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '-' | '.') || !c.is_ascii()
        })
}

/// Hang a finished element under its parent, or make it the root.
fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), MarkupError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(element));
        Ok(())
    } else if root.is_some() {
        Err(MarkupError::ContentOutsideRoot)
    } else {
        *root = Some(element);
        Ok(())
    }
}
