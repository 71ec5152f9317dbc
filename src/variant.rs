//! Chart-variant expansion for standard songs.
//!
//! The content index stores alternate chart-engine conversions of a song as
//! separate entries named `"<base> [DX]"` / `"<base> [ST]"`. Given the names
//! a feed entry is known by, probe the base entry and each tagged sibling.

use crate::index::CandidateIndex;
use crate::normalize::normalize_key;

/// Display-name tag of a newer-engine conversion.
pub const DX_SUFFIX: &str = "[DX]";

/// Display-name tag of an original-engine conversion.
pub const ST_SUFFIX: &str = "[ST]";

/// Resolved ids for one song: the untagged base entry and the tagged siblings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VariantSet {
    pub base: Option<String>,
    pub dx: Option<String>,
    pub st: Option<String>,
}

impl VariantSet {
    /// Sibling ids that were found, in emission order (DX before ST).
    pub fn variants(&self) -> impl Iterator<Item = &str> {
        self.dx.iter().chain(self.st.iter()).map(String::as_str)
    }
}

pub struct VariantExpander<'a> {
    index: &'a CandidateIndex,
}

impl<'a> VariantExpander<'a> {
    pub fn new(index: &'a CandidateIndex) -> Self {
        Self { index }
    }

    /// Probe `names` with an optional suffix.
    ///
    /// Tier order: every name exactly (with suffix) first, then every name's
    /// normalized key. First hit wins. The suffix is appended with one space
    /// before normalizing, so `"Title A"` + `[DX]` probes the key of
    /// `"Title A [DX]"`.
    ///
    /// Normalizing drops the brackets, so `"Lo [ST]"` shares a key with
    /// `"Lost"`. A suffixed normalized hit only counts when the entry's
    /// display name carries the tag.
    pub fn probe(&self, names: &[&str], suffix: Option<&str>) -> Option<String> {
        let candidates: Vec<String> = names
            .iter()
            .map(|name| match suffix {
                Some(tag) => format!("{} {}", name, tag),
                None => name.to_string(),
            })
            .collect();

        candidates
            .iter()
            .find_map(|name| self.index.get_exact(name))
            .or_else(|| {
                candidates.iter().find_map(|name| {
                    let id = self.index.get_key(&normalize_key(name))?;
                    self.is_tagged(id, suffix).then_some(id)
                })
            })
            .map(str::to_string)
    }

    fn is_tagged(&self, content_id: &str, suffix: Option<&str>) -> bool {
        match suffix {
            Some(tag) => self
                .index
                .display_name(content_id)
                .is_some_and(|name| name.ends_with(tag)),
            None => true,
        }
    }

    /// Resolve the base entry and both tagged siblings.
    ///
    /// A sibling equal to the base (or DX equal to ST) is dropped: variants
    /// are always distinct content entries.
    pub fn expand(&self, names: &[&str]) -> VariantSet {
        let base = self.probe(names, None);
        let dx = self
            .probe(names, Some(DX_SUFFIX))
            .filter(|id| Some(id) != base.as_ref());
        let st = self
            .probe(names, Some(ST_SUFFIX))
            .filter(|id| Some(id) != base.as_ref() && Some(id) != dx.as_ref());

        VariantSet { base, dx, st }
    }
}
