//! Sentence-set orchestration
//!
//! Drives the position loop over a set of parallel sentences: advance
//! every sentence's model context by its real word, gather the next
//! position's good words, search one distractor serving all of them,
//! then dress it per sentence. Output rows come back in input order.

use thiserror::Error;

use crate::lexicon::LexiconIndex;
use crate::llm::vocab::Vocab;
use crate::llm::{ModelError, SurprisalOracle};

use super::format::match_surface;
use super::search::{find_distractor, SearchError, SearchPolicy};
use super::PLACEHOLDER;

#[derive(Debug, Error)]
pub enum MazeError {
    #[error("sentence set is empty")]
    EmptySet,
    /// Sentences are numbered from 1 in diagnostics, like sets
    #[error("sentence {sentence} is empty")]
    EmptySentence { sentence: usize },
    #[error("sentence {sentence} has {actual} words, the set needs {expected}")]
    TooShort {
        sentence: usize,
        expected: usize,
        actual: usize,
    },
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Oracle(#[from] ModelError),
}

/// One sentence moving through the position loop: its words, the model
/// context reached so far, and the distractor row built behind it
struct SentenceContext<S> {
    words: Vec<String>,
    state: S,
    row: Vec<String>,
}

/// Generate one distractor sentence per input sentence.
///
/// Sentences are whitespace-tokenized and must all match the first
/// sentence's word count; longer ones are truncated with a warning,
/// shorter ones reject the whole set. Every output row opens with the
/// placeholder, and each later position carries one shared distractor
/// dressed in that sentence's casing and punctuation.
pub fn process_sentence_set<O: SurprisalOracle>(
    oracle: &O,
    vocab: &Vocab,
    lexicon: &LexiconIndex,
    policy: &SearchPolicy,
    sentences: &[String],
) -> Result<Vec<String>, MazeError> {
    if sentences.is_empty() {
        return Err(MazeError::EmptySet);
    }

    let length = sentences[0].split_whitespace().count();
    if length == 0 {
        return Err(MazeError::EmptySentence { sentence: 1 });
    }

    let mut contexts = Vec::with_capacity(sentences.len());
    for (index, sentence) in sentences.iter().enumerate() {
        let mut words: Vec<String> = sentence
            .split_whitespace()
            .map(str::to_string)
            .collect();

        if words.is_empty() {
            return Err(MazeError::EmptySentence { sentence: index + 1 });
        }
        if words.len() < length {
            return Err(MazeError::TooShort {
                sentence: index + 1,
                expected: length,
                actual: words.len(),
            });
        }
        if words.len() > length {
            eprintln!(
                "⚠ sentence {} has {} words, truncating to the set's {}",
                index + 1,
                words.len(),
                length
            );
            words.truncate(length);
        }

        contexts.push(SentenceContext {
            words,
            state: oracle.init_state()?,
            row: vec![PLACEHOLDER.to_string()],
        });
    }

    for position in 0..length - 1 {
        let mut distributions = Vec::with_capacity(contexts.len());
        for context in contexts.iter_mut() {
            let (state, distribution) =
                oracle.advance(vocab, &context.state, &context.words[position])?;
            context.state = state;
            distributions.push(distribution);
        }

        let good_words: Vec<&str> = contexts
            .iter()
            .map(|context| context.words[position + 1].as_str())
            .collect();
        let result = find_distractor(policy, &good_words, &distributions, vocab, lexicon)?;

        for context in contexts.iter_mut() {
            let formatted = match_surface(&result.word, &context.words[position + 1]);
            context.row.push(formatted);
        }
    }

    Ok(contexts
        .into_iter()
        .map(|context| context.row.join(" "))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::SurprisalDistribution;

    /// Oracle whose every advance returns the same scripted surprisals,
    /// whatever the context
    struct ScriptedOracle {
        values: Vec<f32>,
    }

    impl SurprisalOracle for ScriptedOracle {
        type State = usize;

        fn init_state(&self) -> Result<usize, ModelError> {
            Ok(0)
        }

        fn advance(
            &self,
            _vocab: &Vocab,
            state: &usize,
            _word: &str,
        ) -> Result<(usize, SurprisalDistribution), ModelError> {
            Ok((state + 1, SurprisalDistribution::new(self.values.clone())))
        }
    }

    fn entries(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
        pairs.iter().map(|(w, c)| (w.to_string(), *c)).collect()
    }

    /// Good words score low everywhere, leaving the planted candidates
    /// ("tapis", "y") as the only ones clearing the threshold
    fn scripted(vocab: &Vocab, plausible: &[&str]) -> ScriptedOracle {
        let mut values = vec![30.0; vocab.len()];
        for word in plausible {
            values[vocab.lookup(word).unwrap() as usize] = 2.0;
        }
        ScriptedOracle { values }
    }

    fn test_vocab() -> Vocab {
        Vocab::from_words([
            "<unk>", "le", "chat", "chien", "mange", "dort", ".", "tapis", "y",
        ])
    }

    fn test_lexicon() -> LexiconIndex {
        LexiconIndex::from_entries(entries(&[
            ("le", 16.0),
            ("chat", 16.0),
            ("chien", 16.0),
            ("mange", 16.0),
            ("dort", 16.0),
            ("tapis", 16.0),
            ("y", 16.0),
        ]))
        .unwrap()
    }

    fn test_policy() -> SearchPolicy {
        SearchPolicy {
            num_to_test: 10,
            minimum: 5.0,
        }
    }

    #[test]
    fn test_parallel_set_end_to_end() {
        let vocab = test_vocab();
        let oracle = scripted(&vocab, &["le", "chat", "chien", "mange", "dort", "."]);
        let sentences = vec![
            "le chat mange .".to_string(),
            "le chien dort .".to_string(),
        ];

        let rows = process_sentence_set(
            &oracle,
            &vocab,
            &test_lexicon(),
            &test_policy(),
            &sentences,
        )
        .unwrap();

        assert_eq!(rows.len(), 2);
        for row in &rows {
            let tokens: Vec<&str> = row.split(' ').collect();
            assert_eq!(tokens.len(), 4);
            assert_eq!(tokens[0], "x-x-x");
            assert!(tokens[3].ends_with('.'));
        }
        // Positions 1 and 2 both average to length 5 around band 4,
        // where "tapis" is the one implausible entry; the final "." maps
        // to the length-1 candidate "y" plus the period.
        assert_eq!(rows[0], "x-x-x tapis tapis y.");
        assert_eq!(rows[1], "x-x-x tapis tapis y.");
    }

    #[test]
    fn test_generation_is_deterministic() {
        let vocab = test_vocab();
        let oracle = scripted(&vocab, &["le", "chat", "chien", "mange", "dort", "."]);
        let sentences = vec![
            "le chat mange .".to_string(),
            "le chien dort .".to_string(),
        ];

        let first = process_sentence_set(
            &oracle,
            &vocab,
            &test_lexicon(),
            &test_policy(),
            &sentences,
        )
        .unwrap();
        let second = process_sentence_set(
            &oracle,
            &vocab,
            &test_lexicon(),
            &test_policy(),
            &sentences,
        )
        .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_casing_follows_each_sentence() {
        let vocab = Vocab::from_words([
            "<unk>", "elle", "voit", "paris", "rome", "Paris", "Rome", ".", "gris", "tapis", "y",
        ]);
        let lexicon = LexiconIndex::from_entries(entries(&[
            ("elle", 16.0),
            ("voit", 16.0),
            ("paris", 16.0),
            ("rome", 16.0),
            ("gris", 16.0),
            ("tapis", 16.0),
            ("y", 16.0),
        ]))
        .unwrap();
        let oracle = scripted(&vocab, &["elle", "voit", "paris", "rome", "Paris", "Rome", "."]);
        let sentences = vec![
            "elle voit Paris .".to_string(),
            "elle voit Rome .".to_string(),
        ];

        let rows =
            process_sentence_set(&oracle, &vocab, &lexicon, &test_policy(), &sentences).unwrap();

        // The same distractor serves both sentences, capitalized because
        // the words it replaces are
        assert_eq!(rows[0].split(' ').nth(2), Some("Tapis"));
        assert_eq!(rows[1].split(' ').nth(2), Some("Tapis"));
    }

    #[test]
    fn test_longer_sentence_truncated() {
        let vocab = test_vocab();
        let oracle = scripted(&vocab, &["le", "chat", "chien", "mange", "dort", "."]);
        let sentences = vec![
            "le chat mange .".to_string(),
            "le chien dort . mange".to_string(),
        ];

        let rows = process_sentence_set(
            &oracle,
            &vocab,
            &test_lexicon(),
            &test_policy(),
            &sentences,
        )
        .unwrap();
        assert_eq!(rows[1].split(' ').count(), 4);
    }

    #[test]
    fn test_shorter_sentence_rejected() {
        let vocab = test_vocab();
        let oracle = scripted(&vocab, &["le", "chat", "chien", "mange", "dort", "."]);
        let sentences = vec!["le chat mange .".to_string(), "le chien".to_string()];

        let result = process_sentence_set(
            &oracle,
            &vocab,
            &test_lexicon(),
            &test_policy(),
            &sentences,
        );
        // The second sentence of the set is reported as sentence 2
        assert!(matches!(
            result,
            Err(MazeError::TooShort {
                sentence: 2,
                expected: 4,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let vocab = test_vocab();
        let oracle = scripted(&vocab, &[]);

        let result = process_sentence_set(
            &oracle,
            &vocab,
            &test_lexicon(),
            &test_policy(),
            &[],
        );
        assert!(matches!(result, Err(MazeError::EmptySet)));

        let result = process_sentence_set(
            &oracle,
            &vocab,
            &test_lexicon(),
            &test_policy(),
            &["".to_string()],
        );
        assert!(matches!(
            result,
            Err(MazeError::EmptySentence { sentence: 1 })
        ));
    }

    #[test]
    fn test_single_word_sentences_yield_placeholder_only() {
        let vocab = test_vocab();
        let oracle = scripted(&vocab, &[]);
        let sentences = vec!["chat".to_string(), "chien".to_string()];

        let rows = process_sentence_set(
            &oracle,
            &vocab,
            &test_lexicon(),
            &test_policy(),
            &sentences,
        )
        .unwrap();
        assert_eq!(rows, vec!["x-x-x".to_string(), "x-x-x".to_string()]);
    }
}
