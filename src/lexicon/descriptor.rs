//! Word descriptor extraction
//!
//! Summarizes the good words at one sentence position into the single
//! (length, band) pair that seeds the candidate query. Advisory only:
//! the search recovers on its own when the exact descriptor bucket
//! yields nothing.

use super::index::LexiconIndex;
use crate::maze::format::strip_end_punct;

/// Target surface shape for one position's distractor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WordDescriptor {
    /// Character length candidates must match exactly
    pub length: usize,
    /// Seed frequency band the widening walk starts from
    pub band: i64,
}

impl WordDescriptor {
    /// Average the good words' lengths and frequency bands, rounding to
    /// the nearest integers. Trailing punctuation does not count toward
    /// length; a word that is pure punctuation still counts one
    /// character. Words the lexicon never saw contribute its rarest band.
    pub fn describe(good_words: &[&str], lexicon: &LexiconIndex) -> Self {
        debug_assert!(!good_words.is_empty());

        let n = good_words.len() as f64;
        let mut length_sum = 0.0;
        let mut band_sum = 0.0;

        for word in good_words {
            let (core, _) = strip_end_punct(word);
            let (length, lookup) = if core.is_empty() {
                (1, *word)
            } else {
                (core.chars().count(), core)
            };
            length_sum += length as f64;
            band_sum += lexicon
                .band_of(lookup)
                .unwrap_or_else(|| lexicon.default_band()) as f64;
        }

        WordDescriptor {
            length: (length_sum / n).round() as usize,
            band: (band_sum / n).round() as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> LexiconIndex {
        LexiconIndex::from_entries(vec![
            ("chat".to_string(), 16.0),
            ("chien".to_string(), 64.0),
            ("brousse".to_string(), 2.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_single_word() {
        let descriptor = WordDescriptor::describe(&["chat"], &lexicon());
        assert_eq!(descriptor, WordDescriptor { length: 4, band: 4 });
    }

    #[test]
    fn test_averages_round_to_nearest() {
        // Lengths 4 and 5 average to 4.5, rounding away from zero;
        // bands 4 and 6 average to 5 exactly
        let descriptor = WordDescriptor::describe(&["chat", "chien"], &lexicon());
        assert_eq!(descriptor, WordDescriptor { length: 5, band: 5 });
    }

    #[test]
    fn test_trailing_punctuation_ignored() {
        let descriptor = WordDescriptor::describe(&["chat.", "chat,"], &lexicon());
        assert_eq!(descriptor, WordDescriptor { length: 4, band: 4 });
    }

    #[test]
    fn test_unlisted_word_takes_rarest_band() {
        // "lama" is not in the frequency list: band comes from the
        // lexicon floor (brousse at count 2 puts it at 1)
        let descriptor = WordDescriptor::describe(&["lama"], &lexicon());
        assert_eq!(descriptor, WordDescriptor { length: 4, band: 1 });
    }

    #[test]
    fn test_pure_punctuation_counts_one_character() {
        let descriptor = WordDescriptor::describe(&["."], &lexicon());
        assert_eq!(descriptor.length, 1);
        assert_eq!(descriptor.band, lexicon().default_band());
    }
}
