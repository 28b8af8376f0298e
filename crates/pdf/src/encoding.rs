//! WinAnsiEncoding for text drawn with the standard Type1 fonts.

/// Code written for characters the encoding cannot represent.
pub const REPLACEMENT: u8 = b'?';

/// Map a character to its WinAnsi code.
///
/// Control characters map to `None` and are dropped. Characters with no
/// WinAnsi code map to [`REPLACEMENT`].
pub fn encode_char(c: char) -> Option<u8> {
    if c.is_control() {
        return None;
    }
    let code = match c {
        ' '..='~' => c as u8,
        '\u{00A0}'..='\u{00FF}' => c as u8,
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => REPLACEMENT,
    };
    Some(code)
}

/// Encode a whole string.
pub fn encode_str(text: &str) -> Vec<u8> {
    text.chars().filter_map(encode_char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        assert_eq!(encode_str("Slide 1 (Extracted Text)"), b"Slide 1 (Extracted Text)");
    }

    #[test]
    fn test_latin1_and_punctuation() {
        assert_eq!(encode_str("caf\u{e9}"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_str("\u{2022} \u{20AC}5 \u{2014}"), vec![0x95, b' ', 0x80, b'5', b' ', 0x97]);
        assert_eq!(encode_str("\u{201C}q\u{201D}"), vec![0x93, b'q', 0x94]);
    }

    #[test]
    fn test_unmappable_and_control() {
        assert_eq!(encode_str("\u{4e2d}x"), vec![REPLACEMENT, b'x']);
        assert_eq!(encode_str("a\tb\u{0}"), b"ab");
    }
}
