//! WASM-compatible wrapper for PPTX to PDF conversion.
//!
//! This crate exposes the conversion pipeline to JavaScript for use in
//! Cloudflare Workers. The PDF crosses the boundary as Base64 text.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use deck_pdf::{ComposerOptions, MalformedSlidePolicy, PDF_MIME_TYPE};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Result of converting a presentation.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConversionResult {
    /// The generated PDF, Base64-encoded.
    pub pdf_base64: String,
    /// Always `application/pdf`.
    pub mime_type: String,
    /// Number of slides found in the source.
    pub slide_count: usize,
    /// Number of pages in the generated PDF.
    pub page_count: usize,
    /// Warning message if some slides were rendered as placeholders.
    pub warning: Option<String>,
}

/// Convert a PowerPoint file into a text-only PDF.
///
/// # Arguments
/// * `data` - The raw bytes of the PPTX file
///
/// # Returns
/// A JavaScript object with the conversion result, or throws the
/// user-facing error message.
#[wasm_bindgen]
pub fn convert_presentation(data: &[u8]) -> Result<JsValue, JsValue> {
    let result = convert_presentation_impl(data, &ComposerOptions::default())
        .map_err(|e| JsValue::from_str(&e))?;

    serde_wasm_bindgen::to_value(&result)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Like [`convert_presentation`], but renders unreadable slides as
/// placeholder pages instead of failing.
#[wasm_bindgen]
pub fn convert_presentation_lenient(data: &[u8]) -> Result<JsValue, JsValue> {
    let options = ComposerOptions::new().with_malformed_policy(MalformedSlidePolicy::Placeholder);
    let result = convert_presentation_impl(data, &options).map_err(|e| JsValue::from_str(&e))?;

    serde_wasm_bindgen::to_value(&result)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Convert a PowerPoint file, returning the raw PDF bytes.
#[wasm_bindgen]
pub fn convert_presentation_bytes(data: &[u8]) -> Result<js_sys::Uint8Array, JsValue> {
    let composed = deck_pdf::convert(data, &ComposerOptions::default())
        .map_err(|e| JsValue::from_str(&e.user_message()))?;
    Ok(js_sys::Uint8Array::from(composed.bytes.as_slice()))
}

fn convert_presentation_impl(
    data: &[u8],
    options: &ComposerOptions,
) -> Result<ConversionResult, String> {
    let composed = deck_pdf::convert(data, options).map_err(|e| e.user_message())?;

    let warning = if composed.unreadable_slides.is_empty() {
        None
    } else {
        let slides: Vec<String> = composed
            .unreadable_slides
            .iter()
            .map(|n| n.to_string())
            .collect();
        Some(format!("Slides could not be read: {}", slides.join(", ")))
    };

    Ok(ConversionResult {
        pdf_base64: BASE64_STANDARD.encode(&composed.bytes),
        mime_type: PDF_MIME_TYPE.to_string(),
        slide_count: composed.slide_count,
        page_count: composed.page_count(),
        warning,
    })
}
