//! Normalization of extracted text.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

const LIGATURES: [(&str, &str); 7] = [
    ("\u{FB00}", "ff"),
    ("\u{FB01}", "fi"),
    ("\u{FB02}", "fl"),
    ("\u{FB03}", "ffi"),
    ("\u{FB04}", "ffl"),
    ("\u{FB05}", "st"),
    ("\u{FB06}", "st"),
];

fn horizontal_space() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t\u{00A0}\u{3000}]+").expect("static pattern"))
}

fn line_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" ?(\r\n|\r|\n)+ ?").expect("static pattern"))
}

/// Clean text pulled out of a content stream.
///
/// Applies NFC normalization, expands typographic ligatures, drops U+FFFD and
/// Private Use Area characters (undecodable glyphs), collapses runs of spaces
/// and blank lines, and trims the result.
pub fn clean_text(text: &str) -> String {
    let mut result: String = text.nfc().collect();

    for (ligature, replacement) in LIGATURES {
        if result.contains(ligature) {
            result = result.replace(ligature, replacement);
        }
    }

    result.retain(|c| c != '\u{FFFD}' && !is_private_use(c));

    let result = horizontal_space().replace_all(&result, " ");
    let result = line_break().replace_all(&result, "\n");
    result.trim().to_string()
}

fn is_private_use(c: char) -> bool {
    let code = c as u32;
    (0xE000..=0xF8FF).contains(&code)
        || (0xF0000..=0xFFFFD).contains(&code)
        || (0x100000..=0x10FFFD).contains(&code)
}
