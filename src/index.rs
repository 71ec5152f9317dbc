//! Candidate index over the content catalog.
//!
//! Built once per run from the `(displayName, contentId)` list. Holds the raw
//! name map, the normalized-key map, and the reverse id map used when a
//! record needs its display name back. Read-only after construction.

use rustc_hash::FxHashMap;

use crate::models::ContentIndexEntry;
use crate::normalize::normalize_key;

// ============================================================================
// Alias Patches
// ============================================================================

/// Extra keys inserted after the base build for names one catalog misspells
/// or abbreviates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AliasPatch {
    /// Keys containing `from` are also indexed with `from` replaced by `to`.
    Respell {
        from: &'static str,
        to: &'static str,
    },
    /// Keys containing `contains` also make `key` point at the same id.
    FixedKey {
        contains: &'static str,
        key: &'static str,
    },
}

/// The only hand-maintained exception list. New patches are new rows.
pub static ALIAS_PATCHES: &[AliasPatch] = &[
    // "Idolratrize" vs "Idoratrize"
    AliasPatch::Respell {
        from: "idolratrize",
        to: "idoratrize",
    },
    // "Plus Danshi" is listed as "+♂" in the feed
    AliasPatch::FixedKey {
        contains: "plusdanshi",
        key: "♂",
    },
];

impl AliasPatch {
    /// Alias key for an existing key, if the patch applies to it.
    pub fn alias_for(&self, key: &str) -> Option<String> {
        match *self {
            AliasPatch::Respell { from, to } if key.contains(from) => Some(key.replace(from, to)),
            AliasPatch::FixedKey { contains, key: alias } if key.contains(contains) => {
                Some(alias.to_string())
            }
            _ => None,
        }
    }
}

// ============================================================================
// Candidate Index
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CandidateIndex {
    /// Content entries in input order, for ordered scans
    entries: Vec<ContentIndexEntry>,
    /// Raw display name → contentId
    by_name: FxHashMap<String, String>,
    /// Normalized key → contentId
    by_key: FxHashMap<String, String>,
    /// contentId → display name
    name_by_id: FxHashMap<String, String>,
}

impl CandidateIndex {
    /// Build the index with the default [`ALIAS_PATCHES`].
    pub fn build(entries: Vec<ContentIndexEntry>) -> Self {
        Self::build_with_patches(entries, ALIAS_PATCHES)
    }

    /// Build the index with an explicit patch table.
    ///
    /// Later entries win when two names share a raw name or a key. Patches
    /// never replace a key that a real display name produced.
    pub fn build_with_patches(entries: Vec<ContentIndexEntry>, patches: &[AliasPatch]) -> Self {
        let mut by_name = FxHashMap::default();
        let mut by_key = FxHashMap::default();
        let mut name_by_id = FxHashMap::default();

        for entry in &entries {
            by_name.insert(entry.display_name.clone(), entry.content_id.clone());
            name_by_id.insert(entry.content_id.clone(), entry.display_name.clone());

            let key = normalize_key(&entry.display_name);
            if !key.is_empty() {
                by_key.insert(key, entry.content_id.clone());
            }
        }

        // Sorted so alias collisions resolve the same way every run
        let mut base_keys: Vec<(&String, &String)> = by_key.iter().collect();
        base_keys.sort();

        let mut aliases: Vec<(String, String)> = Vec::new();
        for (key, id) in base_keys {
            for patch in patches {
                if let Some(alias) = patch.alias_for(key) {
                    aliases.push((alias, id.clone()));
                }
            }
        }
        for (alias, id) in aliases {
            by_key.entry(alias).or_insert(id);
        }

        Self {
            entries,
            by_name,
            by_key,
            name_by_id,
        }
    }

    /// Exact raw display-name lookup.
    pub fn get_exact(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    /// Normalized-key lookup. An empty key is always a miss.
    pub fn get_key(&self, key: &str) -> Option<&str> {
        if key.is_empty() {
            return None;
        }
        self.by_key.get(key).map(String::as_str)
    }

    /// Two-tier lookup for a single name: exact raw name first, then its
    /// normalized key.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.get_exact(name)
            .or_else(|| self.get_key(&normalize_key(name)))
    }

    /// Display name for a contentId.
    pub fn display_name(&self, content_id: &str) -> Option<&str> {
        self.name_by_id.get(content_id).map(String::as_str)
    }

    pub fn entries(&self) -> &[ContentIndexEntry] {
        &self.entries
    }

    /// Display names in input order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.display_name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True for an index built from no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct normalized keys, alias keys included.
    pub fn key_count(&self) -> usize {
        self.by_key.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ContentIndexEntry> {
        vec![
            ContentIndexEntry::new("Title A", "id1"),
            ContentIndexEntry::new("Title A [DX]", "id2"),
            ContentIndexEntry::new("Idolratrize World", "id3"),
            ContentIndexEntry::new("Plus Danshi", "id4"),
            ContentIndexEntry::new("★★★", "id5"),
        ]
    }

    #[test]
    fn test_exact_and_key_lookup() {
        let index = CandidateIndex::build(sample());
        assert_eq!(index.get_exact("Title A"), Some("id1"));
        assert_eq!(index.get_exact("title a"), None);
        assert_eq!(index.get_key("titlea"), Some("id1"));
        assert_eq!(index.get_key("titleadx"), Some("id2"));
        assert_eq!(index.lookup("TITLE A!"), Some("id1"));
        assert_eq!(index.display_name("id2"), Some("Title A [DX]"));
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn test_empty_key_is_miss() {
        let index = CandidateIndex::build(sample());
        // "★★★" normalizes to "" and is only reachable by raw name
        assert_eq!(index.get_key(""), None);
        assert_eq!(index.lookup("☆☆☆"), None);
        assert_eq!(index.lookup("★★★"), Some("id5"));
    }

    #[test]
    fn test_alias_patches() {
        let index = CandidateIndex::build(sample());
        assert_eq!(index.get_key("idolratrizeworld"), Some("id3"));
        assert_eq!(index.get_key("idoratrizeworld"), Some("id3"));
        assert_eq!(index.lookup("Idoratrize World"), Some("id3"));
        assert_eq!(index.lookup("+♂"), Some("id4"));
    }

    #[test]
    fn test_alias_never_replaces_real_key() {
        let entries = vec![
            ContentIndexEntry::new("Idolratrize", "patched"),
            ContentIndexEntry::new("Idoratrize", "real"),
        ];
        let index = CandidateIndex::build(entries);
        assert_eq!(index.get_key("idoratrize"), Some("real"));
        assert_eq!(index.get_key("idolratrize"), Some("patched"));
    }

    #[test]
    fn test_custom_patch_table() {
        let patches = [AliasPatch::Respell {
            from: "colour",
            to: "color",
        }];
        let index = CandidateIndex::build_with_patches(
            vec![ContentIndexEntry::new("Colour Me", "id1")],
            &patches,
        );
        assert_eq!(index.lookup("Color Me"), Some("id1"));
        // Default patches are not applied
        let index = CandidateIndex::build_with_patches(
            vec![ContentIndexEntry::new("Plus Danshi", "id4")],
            &patches,
        );
        assert_eq!(index.lookup("+♂"), None);
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = CandidateIndex::build(sample());
        let b = CandidateIndex::build(sample());
        assert_eq!(a, b);
    }

    #[test]
    fn test_raw_name_disambiguates_key_collision() {
        let entries = vec![
            ContentIndexEntry::new("Link", "first"),
            ContentIndexEntry::new("LINK", "second"),
        ];
        let index = CandidateIndex::build(entries);
        assert_eq!(index.lookup("Link"), Some("first"));
        assert_eq!(index.lookup("LINK"), Some("second"));
        // Key lookup alone sees only the later entry
        assert_eq!(index.get_key("link"), Some("second"));
    }
}
