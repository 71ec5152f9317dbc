//! Catalog persistence.
//!
//! The catalog is a tab-indented JSON array of [`MatchedSong`]. Writes go to a
//! sibling temp file that is renamed over the target, so a failed run never
//! leaves a truncated catalog behind.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::MatchedSong;

/// Pretty JSON indented with tabs.
pub fn to_tab_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser).context("Failed to serialize catalog")?;
    String::from_utf8(buf).context("Serialized catalog is not UTF-8")
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

/// Serialize `songs` fully, then replace `path` in one rename.
pub fn write_catalog(path: &Path, songs: &[MatchedSong]) -> Result<()> {
    let json = to_tab_json(songs)?;
    let tmp = temp_sibling(path);

    fs::write(&tmp, json)
        .with_context(|| format!("Failed to write temp catalog: {}", tmp.display()))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("Failed to replace catalog: {}", path.display()));
    }
    Ok(())
}

pub fn read_catalog(path: &Path) -> Result<Vec<MatchedSong>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse catalog: {}", path.display()))
}
