//! Answer and question text normalization.
//!
//! Answers are compared as *sequences* of stems, so token order matters:
//! "blue whale" and "whale blue" do not match. That strictness is part of the
//! matching contract and is covered by tests; relaxing it to set comparison
//! would be a behavior change, not a cleanup.

use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::sync::LazyLock;

static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<.*?>").expect("MARKUP regex should compile"));

static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9 ]+").expect("NON_ALNUM regex should compile"));

static SPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" +").expect("SPACE_RUNS regex should compile"));

/// Words that carry no signal when matching answers.
const STOP_WORDS: [&str; 4] = ["a", "an", "the", "of"];

/// Fold answer text into canonical matching form: `&` becomes "and", each
/// run outside `[A-Za-z0-9 ]` becomes a space, space runs collapse to one,
/// lowercased and trimmed. Punctuation separates tokens rather than fusing
/// them: "twenty-one" folds to "twenty one".
pub fn normalize_answer(text: &str) -> String {
    let text = text.replace('&', " and ");
    let text = NON_ALNUM.replace_all(&text, " ");
    let text = SPACE_RUNS.replace_all(&text, " ");
    text.to_lowercase().trim().to_string()
}

/// Strip HTML-ish markup from question text for display. Display only, no
/// stemming.
pub fn strip_markup(text: &str) -> String {
    MARKUP.replace_all(text, "").trim().to_string()
}

/// Drop the leading command token: "!whatis the answer" -> "the answer".
pub fn strip_command(message: &str) -> String {
    message.split(' ').skip(1).collect::<Vec<_>>().join(" ")
}

/// Stem every non-stop-word token of an already-normalized string, in order.
pub fn stem_tokens(normalized: &str) -> Vec<String> {
    let stemmer = Stemmer::create(Algorithm::English);
    normalized
        .split_whitespace()
        .filter(|token| !STOP_WORDS.contains(token))
        .map(|token| stemmer.stem(token).into_owned())
        .collect()
}

/// Does a submitted answer match the correct one? Both sides are normalized
/// and stemmed, then compared position by position.
pub fn answers_match(submitted: &str, correct: &str) -> bool {
    stem_tokens(&normalize_answer(submitted)) == stem_tokens(&normalize_answer(correct))
}
