//! Romanization of Japanese titles, artists, and designers.
//!
//! The transliteration engine sits behind the [`Romanizer`] trait. The pass
//! over finished records runs on the rayon pool; each record is owned by one
//! worker and output order is the input order.

use any_ascii::any_ascii;
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use rayon::prelude::*;

use crate::models::MatchedSong;

/// Kana, CJK ideograph, or ideographic iteration mark.
pub fn is_japanese_char(c: char) -> bool {
    matches!(c as u32,
        0x3005..=0x3007     // Iteration and closing marks
        | 0x3040..=0x309F   // Hiragana
        | 0x30A0..=0x30FF   // Katakana
        | 0x3400..=0x4DBF   // CJK extension A
        | 0x4E00..=0x9FAF)  // CJK ideographs
}

pub fn contains_japanese(text: &str) -> bool {
    text.chars().any(is_japanese_char)
}

/// Japanese → Latin transliteration service.
pub trait Romanizer: Send + Sync {
    fn romanize(&self, text: &str) -> Result<String>;
}

/// Romanizes Japanese runs with `kakasi` (kanji read as Japanese, kana as
/// Hepburn romaji) and leaves other text untouched. Runs are space
/// separated; whatever kakasi leaves outside ASCII is folded by `any_ascii`.
#[derive(Clone, Copy, Debug, Default)]
pub struct KakasiRomanizer;

impl Romanizer for KakasiRomanizer {
    fn romanize(&self, text: &str) -> Result<String> {
        let mut out = String::with_capacity(text.len() * 2);
        let mut run = String::new();
        let mut run_is_japanese = false;

        for c in text.chars() {
            let japanese = is_japanese_char(c);
            if japanese != run_is_japanese && !run.is_empty() {
                flush_run(&mut out, &run, run_is_japanese);
                run.clear();
            }
            run_is_japanese = japanese;
            run.push(c);
        }
        if !run.is_empty() {
            flush_run(&mut out, &run, run_is_japanese);
        }

        Ok(out.split_whitespace().collect::<Vec<_>>().join(" "))
    }
}

fn flush_run(out: &mut String, run: &str, japanese: bool) {
    if japanese {
        let romaji = kakasi::convert(run).romaji;
        out.push(' ');
        out.push_str(&any_ascii(&romaji).to_lowercase());
        out.push(' ');
    } else {
        out.push_str(run);
    }
}

fn romanize_field(romanizer: &dyn Romanizer, text: &str) -> Result<Option<String>> {
    if !contains_japanese(text) {
        return Ok(None);
    }
    let romanized = romanizer
        .romanize(text)
        .with_context(|| format!("Failed to romanize '{}'", text))?;
    Ok(Some(romanized))
}

/// Fill the romanized fields of one record.
pub fn romanize_song(song: &mut MatchedSong, romanizer: &dyn Romanizer) -> Result<()> {
    song.romanized_title = romanize_field(romanizer, &song.title)?;
    song.romanized_artist = romanize_field(romanizer, &song.artist)?;
    song.romanized_designer = match song.designer.as_deref() {
        Some(designer) => romanize_field(romanizer, designer)?,
        None => None,
    };
    Ok(())
}

/// Romanize every record in parallel. The first failure aborts the pass.
pub fn romanize_songs(
    songs: &mut [MatchedSong],
    romanizer: &dyn Romanizer,
    pb: &ProgressBar,
) -> Result<()> {
    songs.par_iter_mut().try_for_each(|song| {
        let result = romanize_song(song, romanizer);
        pb.inc(1);
        result
    })
}
