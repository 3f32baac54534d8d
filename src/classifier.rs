//! Disaster tag classification for listing items.
//!
//! A [`TagClassifier`] holds a fixed keyword set and answers one question:
//! does a listing item's raw tag string indicate a disaster-related story,
//! and if so, which keyword matched?
//!
//! # Matching policy
//!
//! Matching is a case-insensitive substring containment test of the raw
//! comma-joined tag string against each keyword. A keyword appearing anywhere
//! in the string counts, including inside a longer unrelated tag. This biases
//! toward recall over precision; downstream consumers depend on that bias, so
//! do not tighten it to tokenized exact matching.

use once_cell::sync::Lazy;

/// Default disaster keyword set, lowercase.
///
/// Curated from the distinct tags observed on the upstream feed (see the
/// `--list-tags` mode). "bagyo" is Filipino for storm/typhoon.
pub static DEFAULT_KEYWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "earthquake",
        "fire",
        "typhoon",
        "super typhoon",
        "bagyo",
        "flooding",
        "volcanic eruption",
        "tsunami risk",
        "disaster",
        "calamity",
        "tropical storm",
        "typhoons",
        "flood",
    ]
});

/// Classifies raw tag strings against a fixed set of disaster keywords.
#[derive(Debug, Clone)]
pub struct TagClassifier {
    keywords: Vec<String>,
}

impl Default for TagClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS.iter().copied())
    }
}

impl TagClassifier {
    /// Build a classifier from an explicit keyword set.
    ///
    /// Keywords are lowercased; empty entries are dropped.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    /// Classify a raw tag string.
    ///
    /// # Arguments
    ///
    /// * `raw_tags` - The comma-separated tag string from a listing item,
    ///   possibly absent or empty
    ///
    /// # Returns
    ///
    /// The first keyword contained in the tag string, or `None` when the tag
    /// field is absent, empty, or matches nothing. Pure; never fails on
    /// malformed input.
    pub fn classify(&self, raw_tags: Option<&str>) -> Option<&str> {
        let raw = raw_tags?.trim();
        if raw.is_empty() {
            return None;
        }

        let haystack = raw.to_lowercase();
        self.keywords
            .iter()
            .find(|keyword| haystack.contains(keyword.as_str()))
            .map(String::as_str)
    }
}
