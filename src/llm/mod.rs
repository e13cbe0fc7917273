//! LLM Module: Model inference, surprisal distributions, and vocabulary
//!
//! # Components
//! - `model.rs`: Candle LSTM loading and single-step inference
//! - `vocab.rs`: Word-level vocabulary (word ↔ token ID)
//! - `tokenize.rs`: Model-compatible splitting of raw words

pub mod model;
pub mod tokenize;
pub mod vocab;

pub use model::{Model, ModelError};
pub use vocab::Vocab;

/// Surprisal of one word in one context: a real value in bits, or
/// unknown when the vocabulary has no entry for it. Unknown is
/// deliberately not a number; callers decide how unscored words rank.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Surprisal {
    Known(f32),
    Unknown,
}

/// Per-vocabulary surprisal values for one upcoming position, indexed
/// by token ID. Produced fresh by each oracle step and read-only after.
#[derive(Clone, Debug)]
pub struct SurprisalDistribution {
    values: Vec<f32>,
}

#[allow(dead_code)]
impl SurprisalDistribution {
    pub fn new(values: Vec<f32>) -> Self {
        SurprisalDistribution { values }
    }

    /// Surprisal of `word`, or `Unknown` when it has no usable token ID
    pub fn surprisal_of(&self, vocab: &Vocab, word: &str) -> Surprisal {
        match vocab
            .lookup(word)
            .and_then(|id| self.values.get(id as usize))
        {
            Some(&value) => Surprisal::Known(value),
            None => Surprisal::Unknown,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The scoring seam between the generator and whatever language model
/// backs it. Each sentence carries one opaque state value; `advance`
/// consumes the sentence's next real word and yields the distribution
/// predicting the following position. Input states are never mutated,
/// so one position's distributions can be gathered across sentences in
/// any order.
pub trait SurprisalOracle {
    type State;

    /// Fresh context for the start of a sentence
    fn init_state(&self) -> Result<Self::State, ModelError>;

    /// Feed one word; return the successor state and the surprisal
    /// distribution over the next position
    fn advance(
        &self,
        vocab: &Vocab,
        state: &Self::State,
        word: &str,
    ) -> Result<(Self::State, SurprisalDistribution), ModelError>;
}
