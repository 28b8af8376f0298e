//! Classification of OLE/CFB compound files.
//!
//! A buffer starting with the compound-file signature is never converted,
//! but it can be one of two very different things for the user: an old
//! PowerPoint 97-2003 deck, or a password-protected `.pptx` (Office wraps
//! encrypted OOXML packages in a compound file). Peeking at the stream
//! names tells them apart.

use cfb::CompoundFile;
use deck_core::LegacyDetail;
use std::io::Cursor;

/// Leading bytes of an OLE/CFB compound file.
pub const CFB_SIGNATURE: [u8; 4] = [0xD0, 0xCF, 0x11, 0xE0];

/// Stream holding a binary PowerPoint document.
const POWERPOINT_STREAM: &str = "PowerPoint Document";

/// Streams present in an encrypted OOXML package.
const ENCRYPTION_STREAMS: [&str; 2] = ["EncryptionInfo", "EncryptedPackage"];

/// Whether `bytes` start with the compound-file signature.
pub fn has_cfb_signature(bytes: &[u8]) -> bool {
    bytes.starts_with(&CFB_SIGNATURE)
}

/// Inspect a compound file's stream names. Never fails: anything that
/// cannot be opened is reported as [`LegacyDetail::Unknown`].
pub fn classify(bytes: &[u8]) -> LegacyDetail {
    let cfb = match CompoundFile::open(Cursor::new(bytes)) {
        Ok(cfb) => cfb,
        Err(e) => {
            log::debug!("compound file could not be opened for inspection: {}", e);
            return LegacyDetail::Unknown;
        }
    };

    let names: Vec<String> = cfb
        .walk()
        .map(|entry| entry.name().to_string())
        .collect();

    if ENCRYPTION_STREAMS
        .iter()
        .any(|stream| names.iter().any(|n| n == stream))
    {
        LegacyDetail::EncryptedPackage
    } else if names.iter().any(|n| n == POWERPOINT_STREAM) {
        LegacyDetail::BinaryPresentation
    } else {
        LegacyDetail::Unknown
    }
}
