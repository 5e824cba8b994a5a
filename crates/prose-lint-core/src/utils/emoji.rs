//! Grapheme-aware emoji detection.
//!
//! Works on extended grapheme clusters so ZWJ sequences, skin-tone
//! modifiers, flags, and keycaps count as a single emoji.

use unicode_segmentation::UnicodeSegmentation;

const VARIATION_SELECTOR_16: char = '\u{FE0F}';
const COMBINING_KEYCAP: char = '\u{20E3}';

/// Returns true for code points that render as emoji by default.
#[must_use]
pub fn is_emoji_char(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1F000..=0x1FAFF
            | 0x2600..=0x27BF
            | 0x2300..=0x23FF
            | 0x2B05..=0x2B07
            | 0x2B1B..=0x2B1C
            | 0x2B50
            | 0x2B55
            | 0x203C
            | 0x2049
            | 0x3030
            | 0x303D
            | 0x3297
            | 0x3299
    )
}

/// Returns true when a grapheme cluster is an emoji.
#[must_use]
pub fn is_emoji_grapheme(grapheme: &str) -> bool {
    let mut chars = grapheme.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if is_emoji_char(first) {
        return true;
    }
    // Text-default symbols become emoji with VS16 or a keycap.
    grapheme.contains(VARIATION_SELECTOR_16) || grapheme.contains(COMBINING_KEYCAP)
}

/// Byte offset of the first emoji grapheme in `text`.
#[must_use]
pub fn first_emoji_offset(text: &str) -> Option<usize> {
    text.grapheme_indices(true)
        .find(|(_, g)| is_emoji_grapheme(g))
        .map(|(i, _)| i)
}
