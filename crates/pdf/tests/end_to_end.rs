use deck_core::{Error, ExtractionError};
use deck_pdf::{convert, convert_to_pdf, ComposerOptions};
use lopdf::content::Content;
use lopdf::{Document, Object};
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

const FOOTER: &str = "Generated from PPTX by SmartSlide Reviewer";
const PLACEHOLDER: &str = "[No textual content detected on this slide]";

fn slide_xml(paragraphs: &[&str]) -> String {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<a:p><a:r><a:rPr lang=\"en-US\" dirty=\"0\"/><a:t>{}</a:t></a:r></a:p>", p))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld>
    <p:spTree>
      <p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
      <p:sp>
        <p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>
        <p:spPr/>
        <p:txBody><a:bodyPr/><a:lstStyle/>{}</p:txBody>
      </p:sp>
    </p:spTree>
  </p:cSld>
</p:sld>"#,
        body
    )
}

fn pptx(slides: &[(&str, String)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();

    writer.start_file("[Content_Types].xml", options).unwrap();
    writer
        .write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
        .unwrap();
    writer.start_file("ppt/presentation.xml", options).unwrap();
    writer.write_all(b"<p:presentation/>").unwrap();

    for (name, xml) in slides {
        writer.start_file(*name, options).unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Every string drawn with `Tj` on each page, in page order.
fn drawn_text(pdf: &[u8]) -> Vec<Vec<String>> {
    let doc = Document::load_mem(pdf).unwrap();
    doc.get_pages()
        .values()
        .map(|page_id| {
            let data = doc.get_page_content(*page_id).unwrap();
            Content::decode(&data)
                .unwrap()
                .operations
                .into_iter()
                .filter(|op| op.operator == "Tj")
                .filter_map(|op| match op.operands.into_iter().next() {
                    Some(Object::String(bytes, _)) => {
                        Some(String::from_utf8_lossy(&bytes).into_owned())
                    }
                    _ => None,
                })
                .collect()
        })
        .collect()
}

#[test]
fn two_slide_deck_becomes_two_pages() {
    let bytes = pptx(&[
        ("ppt/slides/slide2.xml", slide_xml(&[])),
        ("ppt/slides/slide1.xml", slide_xml(&["Hello", "World"])),
    ]);

    let pdf = convert_to_pdf(&bytes).unwrap();
    let pages = drawn_text(&pdf);

    assert_eq!(pages.len(), 2);
    assert_eq!(
        pages[0],
        vec!["Slide 1 (Extracted Text)", "Hello", "World", FOOTER]
    );
    assert_eq!(pages[1], vec!["Slide 2 (Extracted Text)", PLACEHOLDER, FOOTER]);
}

#[test]
fn slides_follow_numeric_order() {
    let bytes = pptx(&[
        ("ppt/slides/slide10.xml", slide_xml(&["ten"])),
        ("ppt/slides/slide2.xml", slide_xml(&["two"])),
        ("ppt/slides/slide1.xml", slide_xml(&["one"])),
    ]);

    let composed = convert(&bytes, &ComposerOptions::default()).unwrap();
    let bodies: Vec<Vec<&str>> = composed
        .document
        .pages
        .iter()
        .map(|p| p.line_texts())
        .collect();
    assert_eq!(bodies, vec![vec!["one"], vec!["two"], vec!["ten"]]);
}

#[test]
fn conversion_is_deterministic() {
    let bytes = pptx(&[
        ("ppt/slides/slide1.xml", slide_xml(&["Caf\u{e9} &amp; cr\u{e8}me", "R&amp;D"])),
        ("ppt/slides/slide2.xml", slide_xml(&["Second"])),
    ]);
    assert_eq!(convert_to_pdf(&bytes).unwrap(), convert_to_pdf(&bytes).unwrap());
}

#[test]
fn overflow_page_has_footer_but_no_header() {
    let paragraphs: Vec<String> = (1..=30).map(|i| format!("Bullet point number {}", i)).collect();
    let refs: Vec<&str> = paragraphs.iter().map(String::as_str).collect();
    let bytes = pptx(&[("ppt/slides/slide1.xml", slide_xml(&refs))]);

    let pages = drawn_text(&convert_to_pdf(&bytes).unwrap());

    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0][0], "Slide 1 (Extracted Text)");
    assert!(pages[1].iter().all(|t| !t.starts_with("Slide ")));
    assert_eq!(pages[0].last().unwrap(), FOOTER);
    assert_eq!(pages[1].last().unwrap(), FOOTER);
}

#[test]
fn legacy_file_is_rejected_before_parsing() {
    let mut bytes = vec![0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
    bytes.extend_from_slice(&[0u8; 504]);

    let err = convert_to_pdf(&bytes).unwrap_err();
    assert!(matches!(
        err,
        Error::Extraction(ExtractionError::LegacyFormat { .. })
    ));
    assert!(err.user_message().contains(".pptx"));
}

#[test]
fn archive_without_slides_is_rejected() {
    let bytes = pptx(&[]);
    let err = convert_to_pdf(&bytes).unwrap_err();
    assert!(matches!(err, Error::Extraction(ExtractionError::NoSlidesFound)));
}
