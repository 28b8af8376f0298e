//! Advance widths of the standard Helvetica font.

use crate::encoding::encode_char;
use deck_core::layout::{TextMeasure, MM_PER_PT};

/// Helvetica widths in 1/1000 em for WinAnsi codes 32..=126.
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48-63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80-95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96-111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112-126
];

/// Width used for codes outside the ASCII table.
const DEFAULT_WIDTH: u16 = 556;

/// Width lookup for the built-in Helvetica Type1 font.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelveticaMetrics;

impl HelveticaMetrics {
    pub fn new() -> Self {
        Self
    }

    /// Width of one WinAnsi code in 1/1000 em.
    pub fn code_width(code: u8) -> u16 {
        match code {
            32..=126 => HELVETICA_ASCII[(code - 32) as usize],
            _ => DEFAULT_WIDTH,
        }
    }
}

impl TextMeasure for HelveticaMetrics {
    fn text_width(&self, text: &str, font_size: f64) -> f64 {
        let units: u32 = text
            .chars()
            .filter_map(encode_char)
            .map(|code| u32::from(Self::code_width(code)))
            .sum();
        f64::from(units) / 1000.0 * font_size * MM_PER_PT
    }
}
