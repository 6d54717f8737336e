//! Approximate word counting for quota purposes.
//!
//! CJK text carries no inter-word spacing, so each CJK character counts as
//! one "word"; whitespace-delimited Latin-script segments count as one word
//! each.

/// Returns true for codepoints in the CJK Unified Ideographs block
/// (U+4E00..U+9FFF) or Extension A (U+3400..U+4DBF).
fn is_cjk(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}')
}

pub fn approximate_word_count(text: &str) -> usize {
    text.split_whitespace()
        .map(|segment| {
            if segment.chars().any(is_cjk) {
                segment.chars().count()
            } else {
                1
            }
        })
        .sum()
}
