//! Frequency-banded candidate index
//!
//! Loads a corpus frequency list and buckets every word by (character
//! length, frequency band), where a band is floor(log2(count)): one band
//! step is a factor-of-two change in corpus frequency. The search widens
//! over bands one step at a time, so the index also reports its total
//! band range, which is what lets a fruitless widening walk stop.

use rustc_hash::FxHashMap;
use std::fs;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("failed to read lexicon file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse lexicon JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("lexicon file has no \"frequencies\" object")]
    MissingFrequencies,
    #[error("lexicon contains no usable entries")]
    Empty,
}

/// Length-by-band candidate index over a corpus frequency list
pub struct LexiconIndex {
    by_length_band: FxHashMap<(usize, i64), Vec<String>>,
    bands: FxHashMap<String, i64>,
    min_band: i64,
    max_band: i64,
}

impl LexiconIndex {
    /// Load from a JSON file: `{"frequencies": {"chien": 153424, ...}}`
    pub fn load(path: &str) -> Result<Self, LexiconError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse from a JSON string
    pub fn from_json(content: &str) -> Result<Self, LexiconError> {
        let json: serde_json::Value = serde_json::from_str(content)?;
        let frequencies = json
            .get("frequencies")
            .and_then(|v| v.as_object())
            .ok_or(LexiconError::MissingFrequencies)?;

        let entries: Vec<(String, f64)> = frequencies
            .iter()
            .filter_map(|(word, value)| value.as_f64().map(|count| (word.clone(), count)))
            .collect();

        Self::from_entries(entries)
    }

    /// Build from (word, count) pairs. Entries are indexed in sorted
    /// word order, so identical inputs always bucket identically; empty
    /// words, zero counts, and duplicates are dropped.
    pub fn from_entries(entries: Vec<(String, f64)>) -> Result<Self, LexiconError> {
        let mut entries: Vec<(String, f64)> = entries
            .into_iter()
            .filter(|(word, count)| !word.is_empty() && *count >= 1.0)
            .collect();
        if entries.is_empty() {
            return Err(LexiconError::Empty);
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.dedup_by(|a, b| a.0 == b.0);

        let mut by_length_band: FxHashMap<(usize, i64), Vec<String>> = FxHashMap::default();
        let mut bands = FxHashMap::default();
        let mut min_band = i64::MAX;
        let mut max_band = i64::MIN;

        for (word, count) in entries {
            let band = band_for_count(count);
            let length = word.chars().count();
            min_band = min_band.min(band);
            max_band = max_band.max(band);
            by_length_band
                .entry((length, band))
                .or_default()
                .push(word.clone());
            bands.insert(word, band);
        }

        Ok(LexiconIndex {
            by_length_band,
            bands,
            min_band,
            max_band,
        })
    }

    /// Words of exactly `length` characters in the given frequency band,
    /// or None when that bucket holds nothing
    pub fn candidates(&self, length: usize, band: i64) -> Option<&[String]> {
        self.by_length_band
            .get(&(length, band))
            .map(|words| words.as_slice())
    }

    /// Frequency band of a word: exact lookup first, then lowercase
    pub fn band_of(&self, word: &str) -> Option<i64> {
        self.bands
            .get(word)
            .or_else(|| self.bands.get(&word.to_lowercase()))
            .copied()
    }

    /// The band interval every indexed word falls inside. Widening past
    /// it in both directions can never turn up anything new.
    pub fn band_range(&self) -> (i64, i64) {
        (self.min_band, self.max_band)
    }

    /// Band assumed for words the corpus list never saw (its rarest)
    pub fn default_band(&self) -> i64 {
        self.min_band
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

/// floor(log2(count)), clamped below at count 1
fn band_for_count(count: f64) -> i64 {
    count.max(1.0).log2().floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(word: &str, count: f64) -> (String, f64) {
        (word.to_string(), count)
    }

    #[test]
    fn test_band_for_count() {
        assert_eq!(band_for_count(1.0), 0);
        assert_eq!(band_for_count(2.0), 1);
        assert_eq!(band_for_count(3.0), 1);
        assert_eq!(band_for_count(16.0), 4);
        assert_eq!(band_for_count(31.0), 4);
        assert_eq!(band_for_count(32.0), 5);
        assert_eq!(band_for_count(153424.0), 17);
    }

    #[test]
    fn test_candidates_bucketed_by_length_and_band() {
        let index = LexiconIndex::from_entries(vec![
            entry("chat", 16.0),
            entry("dort", 20.0),
            entry("chien", 16.0),
            entry("le", 4096.0),
        ])
        .unwrap();

        assert_eq!(
            index.candidates(4, 4),
            Some(["chat".to_string(), "dort".to_string()].as_slice())
        );
        assert_eq!(index.candidates(5, 4), Some(["chien".to_string()].as_slice()));
        assert_eq!(index.candidates(4, 9), None);
        assert_eq!(index.candidates(7, 4), None);
    }

    #[test]
    fn test_bucket_order_is_sorted() {
        // Input order must not leak into bucket order
        let index = LexiconIndex::from_entries(vec![
            entry("zone", 16.0),
            entry("abri", 16.0),
            entry("mers", 16.0),
        ])
        .unwrap();
        assert_eq!(
            index.candidates(4, 4),
            Some(["abri".to_string(), "mers".to_string(), "zone".to_string()].as_slice())
        );
    }

    #[test]
    fn test_band_of_falls_back_to_lowercase() {
        let index = LexiconIndex::from_entries(vec![entry("paris", 64.0)]).unwrap();
        assert_eq!(index.band_of("paris"), Some(6));
        assert_eq!(index.band_of("Paris"), Some(6));
        assert_eq!(index.band_of("lyon"), None);
    }

    #[test]
    fn test_band_range_and_default() {
        let index = LexiconIndex::from_entries(vec![
            entry("rare", 2.0),
            entry("commune", 1024.0),
        ])
        .unwrap();
        assert_eq!(index.band_range(), (1, 10));
        assert_eq!(index.default_band(), 1);
    }

    #[test]
    fn test_duplicates_and_junk_dropped() {
        let index = LexiconIndex::from_entries(vec![
            entry("chat", 16.0),
            entry("chat", 900.0),
            entry("", 50.0),
            entry("nul", 0.0),
        ])
        .unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.band_of("chat"), Some(4));
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(
            LexiconIndex::from_entries(vec![]),
            Err(LexiconError::Empty)
        ));
        assert!(matches!(
            LexiconIndex::from_json(r#"{"words": []}"#),
            Err(LexiconError::MissingFrequencies)
        ));
    }

    #[test]
    fn test_from_json() {
        let index =
            LexiconIndex::from_json(r#"{"frequencies": {"chien": 153424, "bercail": 153}}"#)
                .unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.band_of("bercail"), Some(7));
        assert!(index.candidates(5, 17).is_some());
    }
}
