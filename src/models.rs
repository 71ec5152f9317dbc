//! Core data models for catalog linking.
//!
//! Input records from the metadata feed and the content index, the merged
//! output record, unmatched-entry diagnostics, and run statistics.

use serde::{Deserialize, Serialize};

// ============================================================================
// Chart Types
// ============================================================================

/// Sheet type marking a bonus/event ("special edition") chart.
pub const SPECIAL_CHART_TYPE: &str = "utage";

/// Sheet type of the newer chart engine.
pub const DX_CHART_TYPE: &str = "dx";

/// Sheet type of the original chart engine.
pub const STD_CHART_TYPE: &str = "std";

/// Note designer value the feed uses when the designer is unknown.
pub const DESIGNER_PLACEHOLDER: &str = "-";

// ============================================================================
// Feed Models
// ============================================================================

/// One playable difficulty/engine entry of a feed song.
/// Extra feed fields (levelValue, note counts, regions...) are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSheet {
    #[serde(rename = "type")]
    pub chart_type: String,
    #[serde(rename = "difficulty")]
    pub difficulty_label: String,
    pub level: String,
    #[serde(default)]
    pub note_designer: Option<String>,
}

/// Song entry from the authoritative metadata feed
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    pub song_id: String,
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub sheets: Vec<ChartSheet>,
    #[serde(default)]
    pub release_date: Option<String>,
}

impl FeedEntry {
    /// Chart type of the first sheet, which decides the resolution branch.
    pub fn first_chart_type(&self) -> Option<&str> {
        self.sheets.first().map(|s| s.chart_type.as_str())
    }

    /// Difficulty label of the first sheet ("" when the entry has no sheets).
    pub fn first_difficulty(&self) -> &str {
        self.sheets
            .first()
            .map(|s| s.difficulty_label.as_str())
            .unwrap_or("")
    }

    pub fn has_chart_type(&self, chart_type: &str) -> bool {
        self.sheets.iter().any(|s| s.chart_type == chart_type)
    }
}

// ============================================================================
// Content Index Models
// ============================================================================

/// `(displayName, contentId)` pair from the community-harvested content index
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentIndexEntry {
    pub display_name: String,
    pub content_id: String,
}

impl ContentIndexEntry {
    pub fn new(display_name: impl Into<String>, content_id: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            content_id: content_id.into(),
        }
    }
}

// ============================================================================
// Output Models
// ============================================================================

/// Merged catalog record.
///
/// `title` is the content index display name, not the feed title: the content
/// index decides how the song is rendered. Optional fields are omitted from
/// the JSON output when absent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedSong {
    pub content_id: String,
    pub source_song_id: String,
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designer: Option<String>,
    pub release_date: Option<String>,
    /// One level string per difficulty slot, in feed order.
    pub levels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub romanized_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub romanized_artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub romanized_designer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_names: Option<Vec<String>>,
}

// ============================================================================
// Unmatched Tracking
// ============================================================================

/// Why a feed entry produced no record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum UnmatchedReason {
    /// No evidence at all that the song exists in the content index
    LikelyNotIndexed,
    /// The content index appears to have the song, but no id could be finalized
    IndexedButUnresolved,
}

/// Diagnostic record for a feed entry that was not merged. Never persisted
/// with the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmatchedRecord {
    pub source_song_id: String,
    pub reason: UnmatchedReason,
}

// ============================================================================
// Statistics
// ============================================================================

/// Per-branch resolution counters for one run.
#[derive(Default, Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionStats {
    pub feed_entries: usize,

    // Standard branch
    pub standard_processed: usize,
    pub matched_base: usize,
    pub matched_variants: usize,

    // Special-edition branch
    pub special_processed: usize,
    pub special_skipped_malformed: usize,
    pub matched_special: usize,

    // Diagnostic buckets
    pub likely_not_indexed: usize,
    pub indexed_but_unresolved: usize,

    /// Records dropped because their contentId was already claimed this run
    pub duplicate_claims: usize,

    pub total_matched: usize,
    pub elapsed_seconds: f64,
}

impl ResolutionStats {
    /// Share of feed entries that produced at least one record, as a percentage.
    pub fn match_rate(&self) -> f64 {
        let attempted = self.standard_processed + self.special_processed;
        if attempted == 0 {
            0.0
        } else {
            let unmatched = self.likely_not_indexed + self.indexed_but_unresolved;
            100.0 * attempted.saturating_sub(unmatched) as f64 / attempted as f64
        }
    }

    /// Log stats to stderr in JSON format
    pub fn log_phase(&self, phase: &str) {
        if let Ok(json) = serde_json::to_string_pretty(self) {
            eprintln!("[STATS:{}]\n{}", phase, json);
        }
    }
}
