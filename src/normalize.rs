//! Search-key normalization shared by the index, the resolvers, and the
//! probe binary.
//!
//! CRITICAL: keys produced here are compared against keys built from the
//! content index. Any change affects both sides. Run tests after changes.

use unicode_normalization::UnicodeNormalization;

// ============================================================================
// SUBSTITUTION TABLES
// ============================================================================

/// Greek letters some titles use as stylized Latin letters (e.g. KHYMΞXΛ).
/// Applied after lowercasing, so only lowercase forms are listed.
pub static GREEK_STAND_INS: &[(char, &str)] = &[
    ('ξ', "e"), // Ξ
    ('λ', "a"), // Λ
];

/// Spelling differences between the two catalogs, as
/// (content index spelling, feed spelling). Add new rows here; matching code
/// never needs to change.
pub static SPELLING_FIXES: &[(&str, &str)] = &[
    // "cal" vs "cle"
    ("アンバークロニカル", "アンバークロニクル"),
];

/// Offset between the fullwidth ASCII forms block and plain ASCII.
const FULLWIDTH_OFFSET: u32 = 0xFEE0;

// ============================================================================
// CHARACTER CLASSES
// ============================================================================

/// Fullwidth forms of printable ASCII ("！" through "～").
pub fn is_fullwidth_ascii(c: char) -> bool {
    matches!(c as u32, 0xFF01..=0xFF5E)
}

/// Map a fullwidth ASCII form to its halfwidth equivalent; other chars pass through.
pub fn to_halfwidth(c: char) -> char {
    if is_fullwidth_ascii(c) {
        char::from_u32(c as u32 - FULLWIDTH_OFFSET).unwrap_or(c)
    } else {
        c
    }
}

/// Characters that survive into a search key: ASCII alphanumerics, kana,
/// CJK ideographs, Greek, mathematical operators, and the male sign used in
/// one title.
pub fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c as u32,
            0x3040..=0x309F     // Hiragana
            | 0x30A0..=0x30FF   // Katakana
            | 0x4E00..=0x9FAF   // CJK ideographs
            | 0x0370..=0x03FF   // Greek
            | 0x2200..=0x22FF)  // Mathematical operators
        || c == '♂'
}

// ============================================================================
// NORMALIZATION
// ============================================================================

fn apply_spelling_fixes(s: &str) -> String {
    SPELLING_FIXES
        .iter()
        .fold(s.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Normalize a display/song name into a comparison key.
///
/// Steps, in order: NFC composition (the catalogs disagree on decomposed vs
/// precomposed kana diacritics), lowercase, fullwidth to halfwidth, Greek
/// stand-ins, spelling fixes, then strip every char outside [`is_key_char`].
///
/// Stripping can bring together text that composes or spells differently, so
/// composition and spelling fixes run once more over the stripped key. That
/// keeps the function idempotent.
///
/// May return an empty string; callers treat an empty key as a miss.
pub fn normalize_key(name: &str) -> String {
    let composed: String = name.nfc().collect();

    let mut folded = String::with_capacity(composed.len());
    for c in composed.to_lowercase().chars().map(to_halfwidth) {
        match GREEK_STAND_INS.iter().find(|(greek, _)| *greek == c) {
            Some((_, latin)) => folded.push_str(latin),
            None => folded.push(c),
        }
    }

    let stripped: String = apply_spelling_fixes(&folded)
        .chars()
        .filter(|c| is_key_char(*c))
        .collect();

    let settled: String = stripped.nfc().collect();
    apply_spelling_fixes(&settled)
}

// ============================================================================
// TESTS
// ============================================================================
