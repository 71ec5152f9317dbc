//! Input loading for the content index, metadata feed, and alias sheet.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

use crate::community::CommunityNames;
use crate::models::{ContentIndexEntry, FeedEntry};

// ============================================================================
// Content Index
// ============================================================================

/// Harvested folder map `{ name: id }` or an explicit entry list.
#[derive(Deserialize)]
#[serde(untagged)]
enum ContentIndexDocument {
    Map(Map<String, Value>),
    List(Vec<ContentIndexEntry>),
}

/// Trim and NFC-normalize a harvested display name.
pub fn clean_display_name(name: &str) -> String {
    name.trim().nfc().collect()
}

/// Parse a content index document. Entry order is file order.
pub fn parse_content_index(json: &str) -> Result<Vec<ContentIndexEntry>> {
    let document: ContentIndexDocument =
        serde_json::from_str(json).context("Content index is neither a name map nor an entry list")?;

    let entries = match document {
        ContentIndexDocument::Map(map) => {
            let mut entries = Vec::with_capacity(map.len());
            for (name, value) in map {
                let Value::String(content_id) = value else {
                    bail!("Content index entry '{}' has a non-string id: {}", name, value);
                };
                entries.push(ContentIndexEntry::new(clean_display_name(&name), content_id));
            }
            entries
        }
        ContentIndexDocument::List(list) => list
            .into_iter()
            .map(|e| ContentIndexEntry::new(clean_display_name(&e.display_name), e.content_id))
            .collect(),
    };

    Ok(entries)
}

pub fn load_content_index(path: &Path) -> Result<Vec<ContentIndexEntry>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read content index: {}", path.display()))?;
    parse_content_index(&json)
        .with_context(|| format!("Failed to parse content index: {}", path.display()))
}

// ============================================================================
// Metadata Feed
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum FeedDocument {
    Wrapped { songs: Vec<FeedEntry> },
    Bare(Vec<FeedEntry>),
}

/// Parse the metadata feed: the public `{ "songs": [...] }` document or a bare array.
pub fn parse_feed(json: &str) -> Result<Vec<FeedEntry>> {
    let document: FeedDocument =
        serde_json::from_str(json).context("Feed is neither a songs document nor an entry list")?;
    Ok(match document {
        FeedDocument::Wrapped { songs } => songs,
        FeedDocument::Bare(songs) => songs,
    })
}

pub fn load_feed(path: &Path) -> Result<Vec<FeedEntry>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read feed: {}", path.display()))?;
    parse_feed(&json).with_context(|| format!("Failed to parse feed: {}", path.display()))
}

// ============================================================================
// Alias Sheet
// ============================================================================

pub fn load_community_names(path: &Path) -> Result<CommunityNames> {
    let tsv = fs::read_to_string(path)
        .with_context(|| format!("Failed to read community names: {}", path.display()))?;
    Ok(CommunityNames::parse(&tsv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "catalog-link-sources-{}-{}",
            std::process::id(),
            name
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_content_index_map_keeps_file_order() {
        let entries =
            parse_content_index(r#"{"Zeta": "id3", "Alpha [DX]": "id1", "Mid": "id2"}"#).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha [DX]", "Mid"]);
        assert_eq!(entries[1].content_id, "id1");
    }

    #[test]
    fn test_content_index_list_and_cleanup() {
        // decomposed "é" plus stray whitespace
        let entries =
            parse_content_index("[{\"displayName\": \"  Cafe\u{301} \", \"contentId\": \"id1\"}]")
                .unwrap();
        assert_eq!(entries, vec![ContentIndexEntry::new("Caf\u{e9}", "id1")]);
    }

    #[test]
    fn test_content_index_rejects_non_string_id() {
        let err = parse_content_index(r#"{"Song": 12}"#).unwrap_err();
        assert!(err.to_string().contains("non-string id"));
        assert!(parse_content_index("not json").is_err());
    }

    #[test]
    fn test_feed_shapes() {
        let entry = r#"{"songId": "Song", "title": "Song", "artist": "A", "sheets": [], "releaseDate": null}"#;
        let wrapped = parse_feed(&format!(r#"{{"categories": [], "songs": [{}]}}"#, entry)).unwrap();
        let bare = parse_feed(&format!("[{}]", entry)).unwrap();
        assert_eq!(wrapped, bare);
        assert_eq!(wrapped[0].song_id, "Song");
        assert!(parse_feed(r#"{"items": []}"#).is_err());
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = load_feed(Path::new("/nonexistent/catalog-link/feed.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read feed"));
    }

    #[test]
    fn test_load_from_disk() {
        let index_path = temp_file("index.json", r#"{"Song": "id1"}"#);
        let tsv_path = temp_file("names.tsv", "Song\tnick\n");

        let entries = load_content_index(&index_path).unwrap();
        assert_eq!(entries.len(), 1);
        let names = load_community_names(&tsv_path).unwrap();
        assert_eq!(names.len(), 1);

        fs::remove_file(index_path).unwrap();
        fs::remove_file(tsv_path).unwrap();
    }
}
