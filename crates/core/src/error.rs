//! Error types for PPTX to PDF conversion.

use std::fmt;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// What a compound-file (OLE/CFB) container turned out to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyDetail {
    /// A PowerPoint 97-2003 binary presentation.
    BinaryPresentation,
    /// A password-protected OOXML package wrapped in a compound file.
    EncryptedPackage,
    /// A compound file we could not classify further.
    Unknown,
}

impl fmt::Display for LegacyDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LegacyDetail::BinaryPresentation => "legacy binary presentation",
            LegacyDetail::EncryptedPackage => "encrypted package",
            LegacyDetail::Unknown => "compound file",
        };
        f.write_str(name)
    }
}

/// Errors raised while validating and opening the presentation container.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The input buffer has zero length.
    #[error("Input is empty")]
    EmptyInput,

    /// The input is too short to carry a file signature.
    #[error("Input is too small to be a presentation ({len} bytes)")]
    TooSmall { len: usize },

    /// The input is an OLE/CFB compound file rather than a ZIP package.
    #[error("Compound-file container detected ({detail})")]
    LegacyFormat { detail: LegacyDetail },

    /// The input does not start with a ZIP local-file-header marker.
    #[error("Invalid file signature")]
    InvalidSignature,

    /// The signature is fine but the archive structure is unreadable.
    #[error("Corrupt archive: {0}")]
    CorruptArchive(String),

    /// No `ppt/slides/slideN.xml` part was found.
    #[error("No slide parts found in archive")]
    NoSlidesFound,
}

impl ExtractionError {
    /// One actionable sentence suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            ExtractionError::EmptyInput => "The uploaded file is empty.".to_string(),
            ExtractionError::TooSmall { .. } => {
                "File is too small to be a valid presentation.".to_string()
            }
            ExtractionError::LegacyFormat {
                detail: LegacyDetail::EncryptedPackage,
            } => "This presentation is password-protected. Remove the password and save it \
                  again as .pptx before uploading."
                .to_string(),
            ExtractionError::LegacyFormat { .. } => {
                "This appears to be a legacy PowerPoint (.ppt) file. Please save it as a modern \
                 PowerPoint (.pptx) or PDF before uploading."
                    .to_string()
            }
            ExtractionError::InvalidSignature => {
                "Invalid file format. Please ensure you are uploading a valid .pptx file, not a \
                 renamed .ppt."
                    .to_string()
            }
            ExtractionError::CorruptArchive(_) => {
                "Corrupted or invalid PPTX file structure.".to_string()
            }
            ExtractionError::NoSlidesFound => {
                "No slides found in this PPTX. It might be encrypted or empty.".to_string()
            }
        }
    }
}

/// Errors raised while turning slide payloads into a PDF document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompositionError {
    /// A slide's XML is not well-formed.
    #[error("Malformed markup in slide {slide} ({path}): {reason}")]
    MalformedMarkup {
        /// 1-based position of the slide in the deck.
        slide: usize,
        /// Archive path of the slide part.
        path: String,
        reason: String,
    },

    /// The page-writing backend rejected the content or configuration.
    #[error("Render error: {0}")]
    RenderError(String),
}

impl CompositionError {
    /// One actionable sentence suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            CompositionError::MalformedMarkup { slide, .. } => format!(
                "Slide {} could not be read because its content is damaged. Try re-saving the \
                 presentation in PowerPoint.",
                slide
            ),
            CompositionError::RenderError(_) => {
                "Failed to generate the PDF document for this presentation.".to_string()
            }
        }
    }
}

/// Top-level error for a full conversion.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read the input or write the output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The container could not be opened.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The document could not be composed.
    #[error(transparent)]
    Composition(#[from] CompositionError),
}

impl Error {
    /// One actionable sentence suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            Error::Io(_) => "Failed to read the file. Please try again.".to_string(),
            Error::Extraction(e) => e.user_message(),
            Error::Composition(e) => e.user_message(),
        }
    }
}
