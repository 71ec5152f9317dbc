//! Community-name enrichment.
//!
//! Players know many songs by nicknames. An alias sheet (one song per line,
//! `songName<TAB>alias<TAB>alias...`) is joined onto finished records by
//! their feed songId.

use rustc_hash::FxHashMap;

use crate::models::MatchedSong;

/// Feed songIds whose alias-sheet line lives under a different name.
pub static KEY_OVERRIDES: &[(&str, &str)] = &[
    ("Link", "Link (maimai)"),
    ("Link (2)", "Link"),
];

/// Alias-sheet key for a feed songId.
pub fn sheet_key(source_song_id: &str) -> &str {
    KEY_OVERRIDES
        .iter()
        .find(|(song_id, _)| *song_id == source_song_id)
        .map(|(_, key)| *key)
        .unwrap_or(source_song_id)
}

#[derive(Clone, Debug, Default)]
pub struct CommunityNames {
    by_song: FxHashMap<String, Vec<String>>,
}

impl CommunityNames {
    /// Parse the alias sheet. Lines without any alias are dropped; a later
    /// line for the same song replaces an earlier one.
    pub fn parse(tsv: &str) -> Self {
        let mut by_song = FxHashMap::default();

        for line in tsv.lines() {
            let mut fields = line.trim_end_matches('\r').split('\t');
            let Some(song_name) = fields.next() else {
                continue;
            };
            if song_name.is_empty() {
                continue;
            }
            let aliases: Vec<String> = fields
                .filter(|alias| !alias.is_empty())
                .map(str::to_string)
                .collect();
            if aliases.is_empty() {
                continue;
            }
            by_song.insert(song_name.to_string(), aliases);
        }

        Self { by_song }
    }

    pub fn lookup(&self, source_song_id: &str) -> Option<&[String]> {
        self.by_song
            .get(sheet_key(source_song_id))
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.by_song.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_song.is_empty()
    }

    /// Attach aliases to every record that has some. Returns how many records
    /// were enriched.
    pub fn apply(&self, songs: &mut [MatchedSong]) -> usize {
        let mut enriched = 0;
        for song in songs.iter_mut() {
            if let Some(aliases) = self.lookup(&song.source_song_id) {
                song.community_names = Some(aliases.to_vec());
                enriched += 1;
            }
        }
        enriched
    }
}
