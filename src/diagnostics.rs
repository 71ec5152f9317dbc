//! End-of-run diagnostics.
//!
//! Reports content-index entries that no merged record claimed, grouped by
//! variant-suffix family, plus the run counters and unmatched feed ids.

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::index::CandidateIndex;
use crate::models::{MatchedSong, ResolutionStats, UnmatchedReason};
use crate::resolve::Resolution;

/// Variant-suffix families as (label, display-name suffix).
pub static SUFFIX_FAMILIES: &[(&str, &str)] = &[
    ("DX", "[DX]"),
    ("ST", "[ST]"),
    ("1P", "[1P]"),
    ("2P", "[2P]"),
    ("EASY", "[EASY]"),
    ("HARD", "[HARD]"),
];

/// Content-index names in one suffix family that no record references.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UncollectedFamily {
    pub label: String,
    pub suffix: String,
    pub names: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct DiagnosticsReport {
    pub uncollected: Vec<UncollectedFamily>,
    pub stats: ResolutionStats,
    pub likely_not_indexed: Vec<String>,
    pub indexed_but_unresolved: Vec<String>,
}

/// Names ending in `suffix` minus the names referenced by `songs`, in index order.
pub fn uncollected_names(
    index: &CandidateIndex,
    songs: &[MatchedSong],
    suffix: &str,
) -> Vec<String> {
    let collected: FxHashSet<&str> = songs.iter().map(|s| s.title.as_str()).collect();
    let mut seen: FxHashSet<&str> = FxHashSet::default();

    index
        .names()
        .filter(|name| name.ends_with(suffix) && !collected.contains(*name))
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

impl DiagnosticsReport {
    pub fn build(index: &CandidateIndex, resolution: &Resolution) -> Self {
        let uncollected = SUFFIX_FAMILIES
            .iter()
            .map(|(label, suffix)| UncollectedFamily {
                label: label.to_string(),
                suffix: suffix.to_string(),
                names: uncollected_names(index, &resolution.songs, suffix),
            })
            .collect();

        let ids = |reason: UnmatchedReason| {
            resolution
                .unmatched_ids(reason)
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        };

        Self {
            uncollected,
            stats: resolution.stats.clone(),
            likely_not_indexed: ids(UnmatchedReason::LikelyNotIndexed),
            indexed_but_unresolved: ids(UnmatchedReason::IndexedButUnresolved),
        }
    }

    /// Print the human-readable summary to stdout.
    pub fn print(&self) {
        for family in &self.uncollected {
            println!(
                "Uncollected {} converts ({}): {:?}",
                family.label,
                family.names.len(),
                family.names
            );
        }

        println!("\nTotal matched songs: {}", self.stats.total_matched);
        println!(
            "Standard entries processed: {} ({} base, {} variants)",
            self.stats.standard_processed, self.stats.matched_base, self.stats.matched_variants
        );
        println!(
            "Special-edition entries processed: {} ({} records, {} skipped)",
            self.stats.special_processed,
            self.stats.matched_special,
            self.stats.special_skipped_malformed
        );
        if self.stats.duplicate_claims > 0 {
            println!("Duplicate claims skipped: {}", self.stats.duplicate_claims);
        }

        if !self.indexed_but_unresolved.is_empty() {
            println!("\nFeed songIds found in content index but could not match:");
            for song_id in &self.indexed_but_unresolved {
                println!("'{}'", song_id);
            }
            println!("\nTotal unmatched: {}", self.indexed_but_unresolved.len());
        }

        if !self.likely_not_indexed.is_empty() {
            println!("\nFeed songIds probably not in content index:");
            for song_id in &self.likely_not_indexed {
                println!("'{}'", song_id);
            }
            println!("\nTotal unmatched: {}", self.likely_not_indexed.len());
        }
    }

    /// Write the report as JSON.
    pub fn write_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
