//! Opening a PPTX container and collecting its slide parts.

use crate::legacy;
use deck_core::{ExtractionError, SlidePayload};
use regex::Regex;
use std::collections::HashSet;
use std::io::{Cursor, Read};
use std::sync::LazyLock;
use zip::result::ZipError;
use zip::ZipArchive;

/// Slide parts live at `ppt/slides/slideN.xml`.
static SLIDE_PART_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ppt/slides/slide(\d+)\.xml$").unwrap());

/// ZIP local-file-header marker (`PK`).
const ZIP_MARKER: [u8; 2] = [0x50, 0x4B];

/// Shortest input that can carry a signature.
const MIN_INPUT_LEN: usize = 4;

/// Validates a PPTX byte buffer and yields its slides in numeric order.
#[derive(Debug, Clone, Default)]
pub struct ContainerExtractor;

impl ContainerExtractor {
    /// Create a new extractor.
    pub fn new() -> Self {
        Self
    }

    /// Check the signature, open the archive and return every slide part
    /// sorted by the number in its file name.
    pub fn extract(&self, bytes: &[u8]) -> Result<Vec<SlidePayload>, ExtractionError> {
        check_signature(bytes)?;

        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(corrupt)?;
        log::debug!("opened archive with {} entries", archive.len());

        let mut seen = HashSet::new();
        let mut slides = Vec::new();

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(corrupt)?;
            if entry.is_dir() {
                continue;
            }

            let name = entry.name().to_string();
            let Some(index) = slide_index(&name) else {
                continue;
            };

            if !seen.insert(name.clone()) {
                log::warn!("duplicate archive entry '{}' ignored", name);
                continue;
            }

            // The declared size comes from the archive and is not trusted.
            let mut content = Vec::new();
            entry.read_to_end(&mut content).map_err(|e| {
                ExtractionError::CorruptArchive(format!("failed to read '{}': {}", name, e))
            })?;

            slides.push(SlidePayload::new(index, name, decode_text(&content)));
        }

        if slides.is_empty() {
            return Err(ExtractionError::NoSlidesFound);
        }

        slides.sort_by_key(|s| s.index);
        log::debug!("found {} slide parts", slides.len());

        Ok(slides)
    }
}

/// Reject inputs that cannot be a ZIP package before touching the archive.
fn check_signature(bytes: &[u8]) -> Result<(), ExtractionError> {
    if bytes.is_empty() {
        return Err(ExtractionError::EmptyInput);
    }
    if bytes.len() < MIN_INPUT_LEN {
        return Err(ExtractionError::TooSmall { len: bytes.len() });
    }
    if legacy::has_cfb_signature(bytes) {
        return Err(ExtractionError::LegacyFormat {
            detail: legacy::classify(bytes),
        });
    }
    if !bytes.starts_with(&ZIP_MARKER) {
        return Err(ExtractionError::InvalidSignature);
    }
    Ok(())
}

fn corrupt(err: ZipError) -> ExtractionError {
    ExtractionError::CorruptArchive(err.to_string())
}

/// Numeric suffix of a slide part path, or `None` if the path is not a
/// slide part. A suffix too large to parse counts as 0.
fn slide_index(path: &str) -> Option<u64> {
    let captures = SLIDE_PART_REGEX.captures(path)?;
    let digits = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
    match digits.parse::<u64>() {
        Ok(n) => Some(n),
        Err(e) => {
            log::warn!("slide part '{}' has unusable number ({}); ordering it first", path, e);
            Some(0)
        }
    }
}

/// Decode part content: honour a UTF-8 or UTF-16 byte-order mark,
/// otherwise read as UTF-8 replacing invalid sequences.
fn decode_text(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(rest).into_owned();
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return fix_utf16_declaration(decode_utf16(rest, u16::from_le_bytes));
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return fix_utf16_declaration(decode_utf16(rest, u16::from_be_bytes));
    }
    String::from_utf8_lossy(bytes).into_owned()
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// The decoded string is UTF-8 now; make the XML declaration agree.
fn fix_utf16_declaration(content: String) -> String {
    if !content.starts_with("<?xml") {
        return content;
    }
    match content.find("?>") {
        Some(end) => {
            let decl = content[..end]
                .replace("\"UTF-16\"", "\"UTF-8\"")
                .replace("'UTF-16'", "'UTF-8'")
                .replace("\"utf-16\"", "\"UTF-8\"")
                .replace("'utf-16'", "'UTF-8'");
            format!("{}{}", decl, &content[end..])
        }
        None => content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn archive(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(
            ContainerExtractor::new().extract(&[]),
            Err(ExtractionError::EmptyInput)
        );
    }

    #[test]
    fn test_too_small() {
        let extractor = ContainerExtractor::new();
        for input in [&[0x50u8][..], &[0x50u8, 0x4B][..], &[0xD0u8, 0xCF, 0x11][..]] {
            assert_eq!(
                extractor.extract(input),
                Err(ExtractionError::TooSmall { len: input.len() })
            );
        }
    }

    #[test]
    fn test_legacy_signature() {
        let mut input = vec![0xD0, 0xCF, 0x11, 0xE0];
        input.extend_from_slice(&[0u8; 60]);
        let err = ContainerExtractor::new().extract(&input).unwrap_err();
        assert!(matches!(err, ExtractionError::LegacyFormat { .. }));
    }

    #[test]
    fn test_invalid_signature() {
        let err = ContainerExtractor::new()
            .extract(b"%PDF-1.7 not a zip")
            .unwrap_err();
        assert_eq!(err, ExtractionError::InvalidSignature);
    }

    #[test]
    fn test_corrupt_archive() {
        let err = ContainerExtractor::new()
            .extract(b"PK\x03\x04 truncated garbage")
            .unwrap_err();
        assert!(matches!(err, ExtractionError::CorruptArchive(_)));
    }

    /// A single stored entry written by hand, so header fields can lie.
    struct RawEntry<'a> {
        name: &'a str,
        data: &'a [u8],
        crc: u32,
        flags: u16,
        /// Uncompressed size recorded in a zip64 extra field.
        zip64_size: Option<u64>,
    }

    impl<'a> RawEntry<'a> {
        fn stored(name: &'a str, data: &'a [u8]) -> Self {
            Self {
                name,
                data,
                crc: crc32(data),
                flags: 0,
                zip64_size: None,
            }
        }
    }

    fn crc32(data: &[u8]) -> u32 {
        let mut crc = 0xFFFF_FFFFu32;
        for &byte in data {
            crc ^= u32::from(byte);
            for _ in 0..8 {
                crc = if crc & 1 == 1 { (crc >> 1) ^ 0xEDB8_8320 } else { crc >> 1 };
            }
        }
        !crc
    }

    fn raw_archive(entry: &RawEntry) -> Vec<u8> {
        let name = entry.name.as_bytes();
        let size = entry.data.len() as u32;
        let mut out = Vec::new();

        // Local file header
        out.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes());
        out.extend_from_slice(&entry.flags.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // stored
        out.extend_from_slice(&[0u8; 4]); // time, date
        out.extend_from_slice(&entry.crc.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(name);
        out.extend_from_slice(entry.data);

        let mut extra = Vec::new();
        let declared = match entry.zip64_size {
            Some(huge) => {
                extra.extend_from_slice(&0x0001u16.to_le_bytes());
                extra.extend_from_slice(&8u16.to_le_bytes());
                extra.extend_from_slice(&huge.to_le_bytes());
                0xFFFF_FFFF
            }
            None => size,
        };

        // Central directory
        let cd_start = out.len() as u32;
        out.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes());
        out.extend_from_slice(&entry.flags.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&[0u8; 4]);
        out.extend_from_slice(&entry.crc.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&declared.to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&(extra.len() as u16).to_le_bytes());
        out.extend_from_slice(&[0u8; 6]); // comment len, disk, internal attrs
        out.extend_from_slice(&[0u8; 4]); // external attrs
        out.extend_from_slice(&0u32.to_le_bytes()); // local header offset
        out.extend_from_slice(name);
        out.extend_from_slice(&extra);
        let cd_size = out.len() as u32 - cd_start;

        // End of central directory
        out.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
        out.extend_from_slice(&[0u8; 4]);
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&cd_size.to_le_bytes());
        out.extend_from_slice(&cd_start.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out
    }

    #[test]
    fn test_raw_archive_reads_back() {
        let bytes = raw_archive(&RawEntry::stored("ppt/slides/slide1.xml", b"<one/>"));
        let slides = ContainerExtractor::new().extract(&bytes).unwrap();
        assert_eq!(slides[0].raw_xml, "<one/>");
    }

    #[test]
    fn test_huge_declared_size_is_not_preallocated() {
        let entry = RawEntry {
            zip64_size: Some(1 << 63),
            ..RawEntry::stored("ppt/slides/slide1.xml", b"<one/>")
        };
        match ContainerExtractor::new().extract(&raw_archive(&entry)) {
            Ok(slides) => assert_eq!(slides[0].raw_xml, "<one/>"),
            Err(err) => assert!(matches!(err, ExtractionError::CorruptArchive(_))),
        }
    }

    #[test]
    fn test_checksum_mismatch_is_corrupt() {
        let entry = RawEntry {
            crc: 0xDEAD_BEEF,
            ..RawEntry::stored("ppt/slides/slide1.xml", b"<one/>")
        };
        let err = ContainerExtractor::new()
            .extract(&raw_archive(&entry))
            .unwrap_err();
        match err {
            ExtractionError::CorruptArchive(reason) => {
                assert!(reason.contains("ppt/slides/slide1.xml"), "{}", reason)
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_encrypted_entry_is_corrupt() {
        let entry = RawEntry {
            flags: 1,
            ..RawEntry::stored("ppt/slides/slide1.xml", b"<one/>")
        };
        let err = ContainerExtractor::new()
            .extract(&raw_archive(&entry))
            .unwrap_err();
        assert!(matches!(err, ExtractionError::CorruptArchive(_)));
    }

    #[test]
    fn test_no_slides_found() {
        let bytes = archive(&[
            ("[Content_Types].xml", "<Types/>"),
            ("ppt/presentation.xml", "<p:presentation/>"),
            ("ppt/slides/_rels/slide1.xml.rels", "<Relationships/>"),
            ("ppt/slideLayouts/slideLayout1.xml", "<p:sldLayout/>"),
        ]);
        assert_eq!(
            ContainerExtractor::new().extract(&bytes),
            Err(ExtractionError::NoSlidesFound)
        );
    }

    #[test]
    fn test_numeric_ordering() {
        let bytes = archive(&[
            ("ppt/slides/slide2.xml", "<two/>"),
            ("ppt/slides/slide1.xml", "<one/>"),
            ("ppt/slides/slide10.xml", "<ten/>"),
            ("ppt/notesSlides/notesSlide1.xml", "<notes/>"),
        ]);
        let slides = ContainerExtractor::new().extract(&bytes).unwrap();

        let indices: Vec<u64> = slides.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 2, 10]);
        assert_eq!(slides[0].raw_xml, "<one/>");
        assert_eq!(slides[2].path, "ppt/slides/slide10.xml");
    }

    #[test]
    fn test_overflowing_suffix_sorts_first() {
        let bytes = archive(&[
            ("ppt/slides/slide1.xml", "<one/>"),
            ("ppt/slides/slide99999999999999999999999.xml", "<huge/>"),
        ]);
        let slides = ContainerExtractor::new().extract(&bytes).unwrap();
        assert_eq!(slides[0].index, 0);
        assert_eq!(slides[0].raw_xml, "<huge/>");
        assert_eq!(slides[1].index, 1);
    }

    #[test]
    fn test_slide_index() {
        assert_eq!(slide_index("ppt/slides/slide1.xml"), Some(1));
        assert_eq!(slide_index("ppt/slides/slide123.xml"), Some(123));
        assert_eq!(slide_index("ppt/slides/slide.xml"), None);
        assert_eq!(slide_index("ppt/slides/slide1.xml.rels"), None);
        assert_eq!(slide_index("ppt/slides/_rels/slide1.xml.rels"), None);
        assert_eq!(slide_index("xppt/slides/slide1.xml"), None);
        assert_eq!(slide_index("ppt/slides/slideA.xml"), None);
    }

    #[test]
    fn test_decode_text_boms() {
        assert_eq!(decode_text(b"\xEF\xBB\xBF<a/>"), "<a/>");
        assert_eq!(decode_text(b"\xFF\xFE<\x00a\x00/\x00>\x00"), "<a/>");
        assert_eq!(decode_text(b"\xFE\xFF\x00<\x00a\x00/\x00>"), "<a/>");
        assert_eq!(decode_text(b"plain"), "plain");
    }

    #[test]
    fn test_decode_utf16_fixes_declaration() {
        let xml = "<?xml version=\"1.0\" encoding=\"UTF-16\"?><a/>";
        let mut bytes = vec![0xFF, 0xFE];
        for unit in xml.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(
            decode_text(&bytes),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><a/>"
        );
    }
}
