//! Special-edition (bonus/event chart) resolution.
//!
//! Special-edition feed entries carry a one-character bracket marker before
//! the base song name, e.g. `"(宴) Garakuta Doll Play (1)"`. The content
//! index names the same charts with its own conventions, so resolution is a
//! search over marked display names followed by an ordered table of name
//! synthesis rules.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::index::CandidateIndex;
use crate::models::FeedEntry;

// ============================================================================
// REGEX PATTERNS
// ============================================================================

/// One bracketed/parenthesized marker character, optional space, base name.
pub static EDITION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\(\[].[\)\]] ?(.+)$").unwrap());

/// Sheet difficulty label of the form "【<char>】".
pub static DIFFICULTY_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^【(.)】$").unwrap());

/// Trailing part number: "Reach For The Stars (2)" → "Reach For The Stars"
pub static TRAILING_PART_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r" \([0-9]\)$").unwrap());

// ============================================================================
// RULE TABLES
// ============================================================================

/// Difficulty word → chart number for songs whose bonus charts are numbered
/// by difficulty.
pub static DIFFICULTY_NUMERALS: &[(&str, &str)] = &[
    ("EASY", "1"),
    ("BASIC", "2"),
    ("ADVANCED", "3"),
    ("EXPERT", "4"),
    ("MASTER", "5"),
    ("Re:MASTER", "6"),
];

/// Rewrites a base name (plus the sheet difficulty label) into the name the
/// content index uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SynthesisRule {
    /// `"<title> (<digit>)"` → `"[<tag> NO.<digit>] <title>"`
    NumberedPart {
        title: &'static str,
        tag: &'static str,
    },
    /// `"<title> (<difficulty>)"` → `"[<tag> NO.<numeral>] <title>"` via
    /// [`DIFFICULTY_NUMERALS`]. Unknown difficulty words do not fire.
    DifficultyPart {
        title: &'static str,
        tag: &'static str,
    },
    /// Difficulty label `"【<c>】"` → `"[<c>] <base without trailing (n)>"`
    DifficultyMarker,
}

/// Applied in order; the first synthesized name present in the index wins.
pub static SYNTHESIS_RULES: &[SynthesisRule] = &[
    SynthesisRule::NumberedPart {
        title: "Garakuta Doll Play",
        tag: "宴",
    },
    SynthesisRule::DifficultyPart {
        title: "Wonderland Wars オープニング",
        tag: "宴",
    },
    SynthesisRule::DifficultyMarker,
];

/// Some special-edition songIds end in a qualifier selecting one tier of a
/// chart the content index splits into tagged entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TierQualifier {
    pub song_id_suffix: &'static str,
    pub display_suffix: &'static str,
}

pub static TIER_QUALIFIERS: &[TierQualifier] = &[
    // "hero class"
    TierQualifier {
        song_id_suffix: "（ヒーロー級）",
        display_suffix: "[HARD]",
    },
    // "introductory edition"
    TierQualifier {
        song_id_suffix: "（入門編）",
        display_suffix: "[EASY]",
    },
];

/// Inner text of `"<title> (<inner>)"`, if `name` has that exact shape.
fn parenthesized_suffix<'n>(name: &'n str, title: &str) -> Option<&'n str> {
    name.strip_prefix(title)?
        .strip_prefix(" (")?
        .strip_suffix(')')
}

impl SynthesisRule {
    pub fn synthesize(&self, base_name: &str, difficulty: &str) -> Option<String> {
        match *self {
            SynthesisRule::NumberedPart { title, tag } => {
                let part = parenthesized_suffix(base_name, title)?;
                let mut chars = part.chars();
                match (chars.next(), chars.next()) {
                    (Some(digit), None) if digit.is_ascii_digit() => {
                        Some(format!("[{} NO.{}] {}", tag, digit, title))
                    }
                    _ => None,
                }
            }
            SynthesisRule::DifficultyPart { title, tag } => {
                let word = parenthesized_suffix(base_name, title)?;
                if word.is_empty() || !word.chars().all(|c| c.is_ascii_alphabetic() || c == ':') {
                    return None;
                }
                DIFFICULTY_NUMERALS
                    .iter()
                    .find(|(name, _)| *name == word)
                    .map(|(_, numeral)| format!("[{} NO.{}] {}", tag, numeral, title))
            }
            SynthesisRule::DifficultyMarker => {
                let caps = DIFFICULTY_MARKER.captures(difficulty)?;
                let marker = caps.get(1)?.as_str();
                let stripped = TRAILING_PART_NUMBER.replace(base_name, "");
                Some(format!("[{}] {}", marker, stripped))
            }
        }
    }
}

// ============================================================================
// BASE NAME EXTRACTION
// ============================================================================

/// True when a name carries a one-character edition marker.
pub fn has_edition_marker(name: &str) -> bool {
    EDITION_MARKER.is_match(name)
}

/// Base name of a marked name: `"[宴]Song"` → `"Song"`.
pub fn strip_edition_marker(name: &str) -> Option<&str> {
    EDITION_MARKER
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Base name of a special-edition feed entry.
///
/// The title is tried before the songId: some songIds end in Japanese
/// qualifiers that never appear in content index names.
/// `None` means the entry is not an edition variant at all.
pub fn edition_base_name(entry: &FeedEntry) -> Option<&str> {
    strip_edition_marker(&entry.title).or_else(|| strip_edition_marker(&entry.song_id))
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Outcome of resolving one special-edition entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditionOutcome {
    /// Content ids in index order (several for split-tier charts)
    Resolved(Vec<String>),
    /// Nothing in the content index resembles this edition
    LikelyNotIndexed,
    /// Matching names exist, but none could be finalized
    IndexedButUnresolved,
}

pub struct SpecialEditionResolver<'a> {
    index: &'a CandidateIndex,
}

impl<'a> SpecialEditionResolver<'a> {
    pub fn new(index: &'a CandidateIndex) -> Self {
        Self { index }
    }

    /// Marked content-index names containing `base_name`, as `(name, id)` in
    /// index order.
    pub fn existing_names(&self, base_name: &str) -> Vec<(&'a str, &'a str)> {
        self.index
            .entries()
            .iter()
            .filter(|e| has_edition_marker(&e.display_name) && e.display_name.contains(base_name))
            .map(|e| (e.display_name.as_str(), e.content_id.as_str()))
            .collect()
    }

    /// First synthesis rule whose name exists in the index, as `(name, id)`.
    pub fn synthesized_name(&self, base_name: &str, difficulty: &str) -> Option<(String, &'a str)> {
        SYNTHESIS_RULES.iter().find_map(|rule| {
            let name = rule.synthesize(base_name, difficulty)?;
            let id = self.index.get_exact(&name)?;
            Some((name, id))
        })
    }

    /// Resolve an edition: existing marked names first, then rule synthesis.
    pub fn resolve(&self, base_name: &str, song_id: &str, difficulty: &str) -> EditionOutcome {
        let existing = self.existing_names(base_name);

        if !existing.is_empty() {
            let qualifier = TIER_QUALIFIERS
                .iter()
                .find(|q| song_id.ends_with(q.song_id_suffix));

            let mut ids: Vec<String> = Vec::new();
            for (name, id) in existing {
                if qualifier.is_some_and(|q| !name.ends_with(q.display_suffix)) {
                    continue;
                }
                if !ids.iter().any(|seen| seen == id) {
                    ids.push(id.to_string());
                }
            }

            return if ids.is_empty() {
                EditionOutcome::IndexedButUnresolved
            } else {
                EditionOutcome::Resolved(ids)
            };
        }

        match self.synthesized_name(base_name, difficulty) {
            Some((_, id)) => EditionOutcome::Resolved(vec![id.to_string()]),
            None => EditionOutcome::LikelyNotIndexed,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
