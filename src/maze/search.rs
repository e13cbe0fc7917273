//! Distractor search
//!
//! Given every parallel sentence's surprisal distribution at one
//! position, find a candidate that is lexically matched to the good
//! words (same length, similar frequency band) and implausible in the
//! WORST of the contexts: the objective is the maximum over candidates
//! of the minimum surprisal across sentences. Candidates come from the
//! lexicon in widening frequency bands; evaluation stops early once a
//! candidate clears the threshold everywhere, and otherwise degrades to
//! the best candidate seen within the trial budget.

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::lexicon::{LexiconIndex, WordDescriptor};
use crate::llm::vocab::Vocab;
use crate::llm::{Surprisal, SurprisalDistribution};

use super::matches_placeholder;

/// Surprisal stood in for a candidate the model cannot score. Negative
/// on purpose: it loses to every real surprisal and can never satisfy a
/// threshold, so unscored candidates are only ever a last resort.
pub const UNKNOWN_SENTINEL: f32 = -1.0;

/// Caller-level search configuration
#[derive(Clone, Copy, Debug)]
pub struct SearchPolicy {
    /// Distinct candidates to score before settling for the best so far
    pub num_to_test: usize,
    /// Surprisal every sentence context must reach
    pub minimum: f32,
}

/// Outcome of one position's search. The score fields are informational;
/// the orchestrator only consumes the word.
#[derive(Clone, Debug)]
pub struct DistractorResult {
    /// The chosen word, bare of casing and punctuation
    pub word: String,
    /// The worst surprisal the word achieved across the contexts
    #[allow(dead_code)]
    pub min_surprisal: f32,
    /// Whether that worst case met the requested minimum
    #[allow(dead_code)]
    pub met_threshold: bool,
}

#[derive(Debug, Error)]
pub enum SearchError {
    /// Every frequency band reachable from the seed was drained without
    /// one scorable candidate turning up
    #[error("lexicon exhausted for length {length} around band {band}: no usable candidate")]
    LexiconExhausted { length: usize, band: i64 },
}

/// Candidates for one position, pulled from the lexicon in widening
/// band offsets. Every word enters at most once and the offset cursor
/// only moves outward, so the walk is duplicate-free and finite.
struct CandidatePool<'a> {
    lexicon: &'a LexiconIndex,
    length: usize,
    band: i64,
    /// Next untried offset from the seed band (0 is the seed itself)
    offset: i64,
    words: Vec<&'a str>,
    seen: FxHashSet<&'a str>,
    next: usize,
}

impl<'a> CandidatePool<'a> {
    fn new(lexicon: &'a LexiconIndex, descriptor: WordDescriptor) -> Self {
        CandidatePool {
            lexicon,
            length: descriptor.length,
            band: descriptor.band,
            offset: 0,
            words: Vec::new(),
            seen: FxHashSet::default(),
            next: 0,
        }
    }

    /// Next untried candidate, widening the band walk on demand. None
    /// once every offset still in play falls outside the lexicon.
    fn next_candidate(&mut self) -> Option<&'a str> {
        while self.next == self.words.len() {
            if self.exhausted() {
                return None;
            }
            self.widen();
        }
        let word = self.words[self.next];
        self.next += 1;
        Some(word)
    }

    fn exhausted(&self) -> bool {
        let (lowest, highest) = self.lexicon.band_range();
        self.band + self.offset > highest && self.band - self.offset < lowest
    }

    /// Query the next offset outward, more-frequent band first, then
    /// less-frequent. The offset advances whether or not anything new
    /// turned up.
    fn widen(&mut self) {
        let offset = self.offset;
        self.offset += 1;

        self.absorb(self.band + offset);
        if offset > 0 {
            self.absorb(self.band - offset);
        }
    }

    fn absorb(&mut self, band: i64) {
        let lexicon = self.lexicon;
        if let Some(candidates) = lexicon.candidates(self.length, band) {
            for word in candidates {
                if !matches_placeholder(word) && self.seen.insert(word.as_str()) {
                    self.words.push(word.as_str());
                }
            }
        }
    }
}

/// Find one distractor for the current position.
///
/// Candidates are scored in pool order against every sentence's
/// distribution; the first whose worst-case surprisal meets
/// `policy.minimum` in all contexts wins outright. Otherwise scoring
/// continues until the trial budget is spent AND at least one scorable
/// candidate exists, then settles for the best worst-case seen (the
/// earliest trial wins ties). Running the lexicon dry before anything
/// scorable appears is an error.
pub fn find_distractor(
    policy: &SearchPolicy,
    good_words: &[&str],
    distributions: &[SurprisalDistribution],
    vocab: &Vocab,
    lexicon: &LexiconIndex,
) -> Result<DistractorResult, SearchError> {
    debug_assert!(!good_words.is_empty());
    debug_assert_eq!(good_words.len(), distributions.len());

    let descriptor = WordDescriptor::describe(good_words, lexicon);
    let mut pool = CandidatePool::new(lexicon, descriptor);

    let mut best_word = "";
    let mut best_min = 0.0_f32;
    let mut trials = 0;

    while best_min == 0.0 || trials < policy.num_to_test {
        let candidate = match pool.next_candidate() {
            Some(word) => word,
            None => {
                // The widening walk is over. A usable best just means
                // the budget could not be filled; no best at all is fatal.
                if best_min > 0.0 {
                    break;
                }
                return Err(SearchError::LexiconExhausted {
                    length: descriptor.length,
                    band: descriptor.band,
                });
            }
        };
        trials += 1;

        let mut candidate_min = f32::INFINITY;
        let mut fully_known = true;
        for distribution in distributions {
            let surprisal = match distribution.surprisal_of(vocab, candidate) {
                Surprisal::Known(value) => value,
                Surprisal::Unknown => {
                    if fully_known {
                        eprintln!("⚠ candidate '{}' is unknown to the model", candidate);
                    }
                    fully_known = false;
                    UNKNOWN_SENTINEL
                }
            };
            candidate_min = candidate_min.min(surprisal);
        }

        if fully_known && candidate_min >= policy.minimum {
            return Ok(DistractorResult {
                word: candidate.to_string(),
                min_surprisal: candidate_min,
                met_threshold: true,
            });
        }
        if candidate_min > best_min {
            best_word = candidate;
            best_min = candidate_min;
        }
    }

    eprintln!(
        "⚠ no candidate reached surprisal {} in {} trials, settling for '{}' at {:.3}",
        policy.minimum, trials, best_word, best_min
    );
    Ok(DistractorResult {
        word: best_word.to_string(),
        min_surprisal: best_min,
        met_threshold: false,
    })
}
