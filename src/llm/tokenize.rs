//! Model-compatible word tokenization
//!
//! The language model is trained on text where sentence punctuation is
//! its own token and elided words keep their apostrophe (`l'avocat` is
//! two tokens: `l'` and `avocat`). Raw whitespace-split words have to be
//! broken the same way before they reach the model.

/// Normalize typographic apostrophe variants to the plain ASCII form
/// the model vocabulary uses
fn normalize(text: &str) -> String {
    text.replace('’', "'").replace('ʼ', "'").replace('`', "'")
}

/// Split one whitespace-delimited word into model tokens: `. , ? !`
/// stand alone, and anything after an apostrophe starts a new token
pub fn tokenize(word: &str) -> Vec<String> {
    let normalized = normalize(word);
    let mut spaced = String::with_capacity(normalized.len() + 8);

    for c in normalized.chars() {
        match c {
            '.' | ',' | '?' | '!' => {
                spaced.push(' ');
                spaced.push(c);
                spaced.push(' ');
            }
            '\'' => {
                spaced.push(c);
                spaced.push(' ');
            }
            _ => spaced.push(c),
        }
    }

    spaced.split_whitespace().map(str::to_string).collect()
}
