//! Surface formatting of chosen distractors
//!
//! A distractor replaces one specific word of one specific sentence, so
//! it inherits that word's leading capitalization and trailing
//! punctuation. Nothing else about the candidate is altered.

/// Split a word into its core and whatever ASCII punctuation trails it.
/// A word that is all punctuation has an empty core.
pub fn strip_end_punct(word: &str) -> (&str, &str) {
    match word.rfind(|c: char| !c.is_ascii_punctuation()) {
        Some(i) => {
            let end = i + word[i..].chars().next().map_or(1, char::len_utf8);
            word.split_at(end)
        }
        None => ("", word),
    }
}

/// Dress a distractor in the surface form of the word it replaces: copy
/// the original's leading capitalization and append its trailing
/// punctuation
pub fn match_surface(distractor: &str, original: &str) -> String {
    let (_, punct) = strip_end_punct(original);
    let capitalized = original.chars().next().map_or(false, char::is_uppercase);

    let mut formatted = if capitalized {
        let mut chars = distractor.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    } else {
        distractor.to_string()
    };

    formatted.push_str(punct);
    formatted
}
