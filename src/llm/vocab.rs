//! Word-level vocabulary
//!
//! Handles:
//! - Word → token ID mapping for model input
//! - Token ID → word reverse mapping
//! - The `<unk>` fallback for out-of-vocabulary words

use rustc_hash::FxHashMap;
use std::fs;
use thiserror::Error;

/// The conventional out-of-vocabulary entry
pub const UNK_WORD: &str = "<unk>";

#[derive(Debug, Error)]
pub enum VocabError {
    #[error("failed to read vocabulary file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse vocabulary JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("vocabulary file has no \"words\" array")]
    MissingWords,
    #[error("vocabulary is empty")]
    Empty,
}

/// Vocabulary shared by the model and the candidate scorer. Token IDs
/// are the positions words held in the training word list.
pub struct Vocab {
    word_to_id: FxHashMap<String, u32>,
    id_to_word: Vec<String>,
    unk_id: Option<u32>,
}

#[allow(dead_code)]
impl Vocab {
    /// Build from an ordered word list; the first occurrence of a word
    /// keeps its ID
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut word_to_id = FxHashMap::default();
        let mut id_to_word = Vec::new();

        for word in words {
            let word: String = word.into();
            let id = id_to_word.len() as u32;
            word_to_id.entry(word.clone()).or_insert(id);
            id_to_word.push(word);
        }

        let unk_id = word_to_id.get(UNK_WORD).copied();
        Vocab {
            word_to_id,
            id_to_word,
            unk_id,
        }
    }

    /// Load from a JSON file: `{"words": ["<unk>", "le", "chat", ...]}`
    pub fn load(path: &str) -> Result<Self, VocabError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse from a JSON string
    pub fn from_json(content: &str) -> Result<Self, VocabError> {
        let json: serde_json::Value = serde_json::from_str(content)?;
        let words = json
            .get("words")
            .and_then(|v| v.as_array())
            .ok_or(VocabError::MissingWords)?;

        let list: Vec<String> = words
            .iter()
            .filter_map(|w| w.as_str())
            .map(str::to_string)
            .collect();

        if list.is_empty() {
            return Err(VocabError::Empty);
        }
        Ok(Self::from_words(list))
    }

    /// Token ID of a word, if the vocabulary knows it
    pub fn lookup(&self, word: &str) -> Option<u32> {
        self.word_to_id.get(word).copied()
    }

    /// Whether the vocabulary knows this exact word
    pub fn contains(&self, word: &str) -> bool {
        self.word_to_id.contains_key(word)
    }

    /// Word behind a token ID
    pub fn word(&self, id: u32) -> Option<&str> {
        self.id_to_word.get(id as usize).map(String::as_str)
    }

    /// Token ID of the `<unk>` entry, if the word list carried one
    pub fn unk_id(&self) -> Option<u32> {
        self.unk_id
    }

    pub fn len(&self) -> usize {
        self.id_to_word.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_word.is_empty()
    }
}
