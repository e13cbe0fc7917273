//! Maze Module: distractor search and sentence-set generation
//!
//! # Components
//! - `search.rs`: expanding-frequency-band search for one position
//! - `format.rs`: casing and trailing-punctuation surface matching
//! - `sentence.rs`: per-position drive loop over a parallel sentence set

pub mod format;
pub mod search;
pub mod sentence;

pub use search::SearchPolicy;
pub use sentence::process_sentence_set;

// Error types only cross the CLI boundary boxed as dyn Error
#[allow(unused_imports)]
pub use search::SearchError;
#[allow(unused_imports)]
pub use sentence::MazeError;

/// The token standing in for position 0 of every distractor sentence.
/// Maze displays give the reader no alternative on the opening word.
pub const PLACEHOLDER: &str = "x-x-x";

/// True when a candidate is the placeholder in disguise: compared
/// case-insensitively, ignoring punctuation
pub fn matches_placeholder(word: &str) -> bool {
    fn letters(s: &str) -> impl Iterator<Item = char> + '_ {
        s.chars()
            .filter(|c| !c.is_ascii_punctuation())
            .flat_map(char::to_lowercase)
    }
    letters(word).eq(letters(PLACEHOLDER))
}
