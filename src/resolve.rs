//! Per-entry match resolution.
//!
//! Each feed entry is classified into a branch, resolved against the
//! [`CandidateIndex`], and either emitted as one or more [`MatchedSong`]
//! records or routed into a diagnostic bucket. Nothing in here returns an
//! error: every per-entry ambiguity ends as a record, a bucket, or a skip.

use rustc_hash::FxHashSet;

use crate::index::CandidateIndex;
use crate::models::{
    ChartSheet, FeedEntry, MatchedSong, ResolutionStats, UnmatchedReason, UnmatchedRecord,
    DESIGNER_PLACEHOLDER, DX_CHART_TYPE, SPECIAL_CHART_TYPE, STD_CHART_TYPE,
};
use crate::normalize::normalize_key;
use crate::special::{edition_base_name, EditionOutcome, SpecialEditionResolver};
use crate::variant::{VariantExpander, DX_SUFFIX};

// ============================================================================
// Branch Classification
// ============================================================================

/// Resolution branch of a feed entry, decided by its first sheet's type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryBranch<'e> {
    Standard,
    SpecialEdition {
        base_name: &'e str,
        difficulty: &'e str,
    },
    /// Special-edition chart type, but no bracket marker on title or songId.
    /// Not an edition variant; skipped without a diagnostic.
    MalformedEdition,
}

pub fn classify(entry: &FeedEntry) -> EntryBranch<'_> {
    if entry.first_chart_type() != Some(SPECIAL_CHART_TYPE) {
        return EntryBranch::Standard;
    }
    match edition_base_name(entry) {
        Some(base_name) => EntryBranch::SpecialEdition {
            base_name,
            difficulty: entry.first_difficulty(),
        },
        None => EntryBranch::MalformedEdition,
    }
}

/// True if the raw songId, raw title, or either's normalized key hits the index.
pub fn song_likely_in_index(index: &CandidateIndex, song_id: &str, title: &str) -> bool {
    index.get_exact(song_id).is_some()
        || index.get_exact(title).is_some()
        || index.get_key(&normalize_key(song_id)).is_some()
        || index.get_key(&normalize_key(title)).is_some()
}

// ============================================================================
// Record Assembly
// ============================================================================

/// Sheets whose levels belong to a content entry.
///
/// When the feed lists both chart engines for one song, a display name
/// ending in the DX tag selects the DX sheets and anything else selects the
/// original-engine sheets. Untagged DX conversions therefore pick the wrong
/// subset; the content index is trusted to tag them.
pub fn select_sheets<'e>(entry: &'e FeedEntry, display_name: &str) -> Vec<&'e ChartSheet> {
    if entry.has_chart_type(DX_CHART_TYPE) && entry.has_chart_type(STD_CHART_TYPE) {
        let wanted = if display_name.ends_with(DX_SUFFIX) {
            DX_CHART_TYPE
        } else {
            STD_CHART_TYPE
        };
        entry
            .sheets
            .iter()
            .filter(|s| s.chart_type == wanted)
            .collect()
    } else {
        entry.sheets.iter().collect()
    }
}

/// Distinct note designers in encounter order, comma-joined.
/// Placeholders and blanks are skipped; `None` if nothing is left.
pub fn join_designers(sheets: &[&ChartSheet]) -> Option<String> {
    let mut designers: Vec<&str> = Vec::new();
    for sheet in sheets {
        if let Some(designer) = sheet.note_designer.as_deref() {
            if designer.is_empty() || designer == DESIGNER_PLACEHOLDER {
                continue;
            }
            if !designers.contains(&designer) {
                designers.push(designer);
            }
        }
    }
    if designers.is_empty() {
        None
    } else {
        Some(designers.join(","))
    }
}

/// Build the merged record for a feed entry resolved to `content_id`.
pub fn build_song(entry: &FeedEntry, content_id: &str, display_name: &str) -> MatchedSong {
    let sheets = select_sheets(entry, display_name);

    MatchedSong {
        content_id: content_id.to_string(),
        source_song_id: entry.song_id.clone(),
        title: display_name.to_string(),
        artist: entry.artist.clone(),
        designer: join_designers(&sheets),
        release_date: entry.release_date.clone(),
        levels: sheets.iter().map(|s| s.level.clone()).collect(),
        romanized_title: None,
        romanized_artist: None,
        romanized_designer: None,
        community_names: None,
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Everything one resolution pass produces.
#[derive(Clone, Debug, Default)]
pub struct Resolution {
    pub songs: Vec<MatchedSong>,
    pub unmatched: Vec<UnmatchedRecord>,
    pub stats: ResolutionStats,
}

impl Resolution {
    pub fn unmatched_ids(&self, reason: UnmatchedReason) -> Vec<&str> {
        self.unmatched
            .iter()
            .filter(|u| u.reason == reason)
            .map(|u| u.source_song_id.as_str())
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EmitKind {
    Base,
    Variant,
    Special,
}

pub struct MatchResolver<'a> {
    index: &'a CandidateIndex,
    claimed: FxHashSet<String>,
    result: Resolution,
}

impl<'a> MatchResolver<'a> {
    pub fn new(index: &'a CandidateIndex) -> Self {
        Self {
            index,
            claimed: FxHashSet::default(),
            result: Resolution::default(),
        }
    }

    /// Resolve every entry in feed order.
    pub fn resolve_all(index: &'a CandidateIndex, feed: &[FeedEntry]) -> Resolution {
        let mut resolver = Self::new(index);
        for entry in feed {
            resolver.resolve_entry(entry);
        }
        resolver.finish()
    }

    pub fn resolve_entry(&mut self, entry: &FeedEntry) {
        self.result.stats.feed_entries += 1;

        match classify(entry) {
            EntryBranch::Standard => self.resolve_standard(entry),
            EntryBranch::SpecialEdition {
                base_name,
                difficulty,
            } => self.resolve_special(entry, base_name, difficulty),
            EntryBranch::MalformedEdition => {
                self.result.stats.special_skipped_malformed += 1;
            }
        }
    }

    pub fn finish(mut self) -> Resolution {
        self.result.stats.total_matched = self.result.songs.len();
        self.result
    }

    fn resolve_standard(&mut self, entry: &FeedEntry) {
        self.result.stats.standard_processed += 1;

        if !song_likely_in_index(self.index, &entry.song_id, &entry.title) {
            self.record_unmatched(entry, UnmatchedReason::LikelyNotIndexed);
            return;
        }

        let set = VariantExpander::new(self.index)
            .expand(&[entry.song_id.as_str(), entry.title.as_str()]);

        let Some(base) = set.base.as_deref() else {
            self.record_unmatched(entry, UnmatchedReason::IndexedButUnresolved);
            return;
        };

        self.emit(entry, base, EmitKind::Base);
        for variant in set.variants() {
            self.emit(entry, variant, EmitKind::Variant);
        }
    }

    fn resolve_special(&mut self, entry: &FeedEntry, base_name: &str, difficulty: &str) {
        self.result.stats.special_processed += 1;

        let resolver = SpecialEditionResolver::new(self.index);
        match resolver.resolve(base_name, &entry.song_id, difficulty) {
            EditionOutcome::Resolved(ids) => {
                for id in &ids {
                    self.emit(entry, id, EmitKind::Special);
                }
            }
            EditionOutcome::LikelyNotIndexed => {
                self.record_unmatched(entry, UnmatchedReason::LikelyNotIndexed)
            }
            EditionOutcome::IndexedButUnresolved => {
                self.record_unmatched(entry, UnmatchedReason::IndexedButUnresolved)
            }
        }
    }

    fn emit(&mut self, entry: &FeedEntry, content_id: &str, kind: EmitKind) {
        let index = self.index;
        let Some(display_name) = index.display_name(content_id) else {
            return;
        };

        if !self.claimed.insert(content_id.to_string()) {
            self.result.stats.duplicate_claims += 1;
            eprintln!(
                "[WARN] '{}' resolved to already claimed '{}' ({}), skipping",
                entry.song_id, display_name, content_id
            );
            return;
        }

        let stats = &mut self.result.stats;
        match kind {
            EmitKind::Base => stats.matched_base += 1,
            EmitKind::Variant => stats.matched_variants += 1,
            EmitKind::Special => stats.matched_special += 1,
        }

        self.result
            .songs
            .push(build_song(entry, content_id, display_name));
    }

    fn record_unmatched(&mut self, entry: &FeedEntry, reason: UnmatchedReason) {
        match reason {
            UnmatchedReason::LikelyNotIndexed => self.result.stats.likely_not_indexed += 1,
            UnmatchedReason::IndexedButUnresolved => {
                self.result.stats.indexed_but_unresolved += 1
            }
        }
        self.result.unmatched.push(UnmatchedRecord {
            source_song_id: entry.song_id.clone(),
            reason,
        });
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentIndexEntry;

    fn index(pairs: &[(&str, &str)]) -> CandidateIndex {
        CandidateIndex::build(
            pairs
                .iter()
                .map(|(name, id)| ContentIndexEntry::new(*name, *id))
                .collect(),
        )
    }

    fn sheet(chart_type: &str, difficulty: &str, level: &str, designer: Option<&str>) -> ChartSheet {
        ChartSheet {
            chart_type: chart_type.to_string(),
            difficulty_label: difficulty.to_string(),
            level: level.to_string(),
            note_designer: designer.map(str::to_string),
        }
    }

    fn entry(song_id: &str, title: &str, sheets: Vec<ChartSheet>) -> FeedEntry {
        FeedEntry {
            song_id: song_id.to_string(),
            title: title.to_string(),
            artist: "Artist".to_string(),
            sheets,
            release_date: Some("2024-01-01".to_string()),
        }
    }

    fn ids(resolution: &Resolution) -> Vec<&str> {
        resolution
            .songs
            .iter()
            .map(|s| s.content_id.as_str())
            .collect()
    }

    #[test]
    fn test_classify() {
        let standard = entry("A", "A", vec![sheet("std", "basic", "3", None)]);
        assert_eq!(classify(&standard), EntryBranch::Standard);

        let no_sheets = entry("A", "A", vec![]);
        assert_eq!(classify(&no_sheets), EntryBranch::Standard);

        let special = entry("(宴) A (1)", "A", vec![sheet("utage", "【宴】", "13", None)]);
        assert_eq!(
            classify(&special),
            EntryBranch::SpecialEdition {
                base_name: "A (1)",
                difficulty: "【宴】"
            }
        );

        let malformed = entry("A", "A", vec![sheet("utage", "【宴】", "13", None)]);
        assert_eq!(classify(&malformed), EntryBranch::MalformedEdition);
    }

    #[test]
    fn test_variant_expansion_end_to_end() {
        let index = index(&[("Title A", "id1"), ("Title A [DX]", "id2")]);
        let feed = vec![entry("Title A", "Title A", vec![sheet("std", "basic", "3", None)])];
        let resolution = MatchResolver::resolve_all(&index, &feed);

        assert_eq!(ids(&resolution), vec!["id1", "id2"]);
        assert_eq!(resolution.songs[1].title, "Title A [DX]");
        assert_eq!(resolution.stats.matched_base, 1);
        assert_eq!(resolution.stats.matched_variants, 1);
        assert_eq!(resolution.stats.total_matched, 2);
        assert!(resolution.unmatched.is_empty());
    }

    #[test]
    fn test_special_edition_synthesis_end_to_end() {
        let index = index(&[("[宴 NO.1] Garakuta Doll Play", "idX")]);
        let feed = vec![entry(
            "(宴) Garakuta Doll Play (1)",
            "Garakuta Doll Play",
            vec![sheet("utage", "【宴】", "13+", Some("X"))],
        )];
        let resolution = MatchResolver::resolve_all(&index, &feed);

        assert_eq!(ids(&resolution), vec!["idX"]);
        let song = &resolution.songs[0];
        assert_eq!(song.title, "[宴 NO.1] Garakuta Doll Play");
        assert_eq!(song.source_song_id, "(宴) Garakuta Doll Play (1)");
        assert_eq!(song.levels, vec!["13+"]);
        assert_eq!(resolution.stats.special_processed, 1);
        assert_eq!(resolution.stats.matched_special, 1);
    }

    #[test]
    fn test_no_overlap_is_likely_not_indexed() {
        let index = index(&[("Title A", "id1")]);
        let feed = vec![entry("Zzz", "Zzz", vec![sheet("std", "basic", "3", None)])];
        let resolution = MatchResolver::resolve_all(&index, &feed);

        assert!(resolution.songs.is_empty());
        assert_eq!(
            resolution.unmatched_ids(UnmatchedReason::LikelyNotIndexed),
            vec!["Zzz"]
        );
        assert_eq!(resolution.stats.likely_not_indexed, 1);
    }

    #[test]
    fn test_normalized_key_tier_reached() {
        let index = index(&[("Title!", "id1")]);
        let feed = vec![entry("Title！", "Title！", vec![sheet("std", "basic", "3", None)])];
        let resolution = MatchResolver::resolve_all(&index, &feed);

        assert_eq!(ids(&resolution), vec!["id1"]);
        assert_eq!(resolution.songs[0].title, "Title!");
    }

    #[test]
    fn test_key_collision_does_not_steal_other_song() {
        let index = index(&[("Lo", "lo"), ("Lost", "lost")]);
        let feed = vec![
            entry("Lo", "Lo", vec![sheet("std", "basic", "3", None)]),
            entry("Lost", "Lost", vec![sheet("std", "basic", "5", None)]),
        ];
        let resolution = MatchResolver::resolve_all(&index, &feed);

        assert_eq!(ids(&resolution), vec!["lo", "lost"]);
        assert_eq!(resolution.songs[1].source_song_id, "Lost");
        assert_eq!(resolution.songs[1].levels, vec!["5"]);
        assert_eq!(resolution.stats.matched_variants, 0);
        assert_eq!(resolution.stats.duplicate_claims, 0);
    }

    #[test]
    fn test_tagged_sibling_alone_is_not_evidence() {
        // Only "Title B [DX]" exists; the untagged names never hit
        let index = index(&[("Title B [DX]", "id2")]);
        let feed = vec![entry("Title B", "Title B", vec![sheet("dx", "basic", "3", None)])];
        let resolution = MatchResolver::resolve_all(&index, &feed);

        assert!(resolution.songs.is_empty());
        assert_eq!(resolution.stats.likely_not_indexed, 1);
    }

    #[test]
    fn test_special_edition_routes_buckets() {
        let index = index(&[("[協]青春コンプレックス [1P]", "p1")]);
        let feed = vec![
            entry(
                "[協]青春コンプレックス（ヒーロー級）",
                "[協]青春コンプレックス",
                vec![sheet("utage", "【協】", "12", None)],
            ),
            entry(
                "(宴) Unknown Song",
                "(宴) Unknown Song",
                vec![sheet("utage", "【宴】", "12", None)],
            ),
            entry("Plain", "Plain", vec![sheet("utage", "【宴】", "12", None)]),
        ];
        let resolution = MatchResolver::resolve_all(&index, &feed);

        assert!(resolution.songs.is_empty());
        assert_eq!(
            resolution.unmatched_ids(UnmatchedReason::IndexedButUnresolved),
            vec!["[協]青春コンプレックス（ヒーロー級）"]
        );
        assert_eq!(
            resolution.unmatched_ids(UnmatchedReason::LikelyNotIndexed),
            vec!["(宴) Unknown Song"]
        );
        // Malformed entry is skipped, not bucketed
        assert_eq!(resolution.unmatched.len(), 2);
        assert_eq!(resolution.stats.special_skipped_malformed, 1);
        assert_eq!(resolution.stats.special_processed, 2);
    }

    #[test]
    fn test_special_edition_emits_each_tier() {
        let index = index(&[
            ("[協]青春コンプレックス [EASY]", "easy"),
            ("[協]青春コンプレックス [HARD]", "hard"),
        ]);
        let feed = vec![entry(
            "[協]青春コンプレックス",
            "[協]青春コンプレックス",
            vec![sheet("utage", "【協】", "12", None)],
        )];
        let resolution = MatchResolver::resolve_all(&index, &feed);
        assert_eq!(ids(&resolution), vec!["easy", "hard"]);
    }

    #[test]
    fn test_content_id_claimed_once() {
        let index = index(&[("Title A", "id1")]);
        let feed = vec![
            entry("Title A", "Title A", vec![sheet("std", "basic", "3", None)]),
            entry("TITLE A", "TITLE A", vec![sheet("std", "basic", "4", None)]),
        ];
        let resolution = MatchResolver::resolve_all(&index, &feed);

        assert_eq!(ids(&resolution), vec!["id1"]);
        assert_eq!(resolution.songs[0].levels, vec!["3"]);
        assert_eq!(resolution.stats.duplicate_claims, 1);

        let unique: FxHashSet<&str> = ids(&resolution).into_iter().collect();
        assert_eq!(unique.len(), resolution.songs.len());
    }

    #[test]
    fn test_designer_dedup_and_placeholder() {
        let e = entry(
            "S",
            "S",
            vec![
                sheet("std", "basic", "3", Some("X")),
                sheet("std", "advanced", "6", Some("X")),
                sheet("std", "expert", "9", Some("-")),
                sheet("std", "master", "12", None),
            ],
        );
        let song = build_song(&e, "id", "S");
        assert_eq!(song.designer.as_deref(), Some("X"));
        assert_eq!(song.levels, vec!["3", "6", "9", "12"]);
    }

    #[test]
    fn test_designer_join_and_absent() {
        let e = entry(
            "S",
            "S",
            vec![
                sheet("std", "expert", "9", Some("B")),
                sheet("std", "master", "12", Some("A")),
                sheet("std", "remaster", "13", Some("B")),
            ],
        );
        assert_eq!(build_song(&e, "id", "S").designer.as_deref(), Some("B,A"));

        let e = entry("S", "S", vec![sheet("std", "basic", "3", Some("-"))]);
        assert_eq!(build_song(&e, "id", "S").designer, None);
    }

    #[test]
    fn test_levels_select_engine_subset() {
        let e = entry(
            "S",
            "S",
            vec![
                sheet("dx", "basic", "4", Some("D")),
                sheet("dx", "master", "13", Some("D")),
                sheet("std", "basic", "2", Some("S")),
                sheet("std", "master", "11", Some("S")),
            ],
        );
        let dx = build_song(&e, "id2", "S [DX]");
        assert_eq!(dx.levels, vec!["4", "13"]);
        assert_eq!(dx.designer.as_deref(), Some("D"));

        let original = build_song(&e, "id1", "S");
        assert_eq!(original.levels, vec!["2", "11"]);
        assert_eq!(original.designer.as_deref(), Some("S"));

        // Only one engine present: every sheet counts
        let single = entry("S", "S", vec![sheet("dx", "basic", "4", None)]);
        assert_eq!(build_song(&single, "id", "S").levels, vec!["4"]);
    }

    #[test]
    fn test_song_likely_in_index() {
        let index = index(&[("Title A", "id1")]);
        assert!(song_likely_in_index(&index, "Title A", "x"));
        assert!(song_likely_in_index(&index, "x", "title a"));
        assert!(!song_likely_in_index(&index, "x", "y"));
    }

    #[test]
    fn test_rerun_is_identical() {
        let index = index(&[("Title A", "id1"), ("Title A [ST]", "id3")]);
        let feed = vec![entry("Title A", "Title A", vec![sheet("std", "basic", "3", None)])];
        let a = MatchResolver::resolve_all(&index, &feed);
        let b = MatchResolver::resolve_all(&index, &feed);
        assert_eq!(a.songs, b.songs);
        assert_eq!(a.stats, b.stats);
    }
}
