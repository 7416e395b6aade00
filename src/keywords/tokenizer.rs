use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

static RE_WORD: OnceLock<Regex> = OnceLock::new();

/// Splits a search query into counted words
///
/// The query is lower-cased and split on whitespace; whitespace-delimited stop words
/// are dropped, then the rest is re-split into runs of word characters. Punctuation
/// attached to a stop word therefore keeps it (`"the,"` survives the filter and
/// yields `the`).
pub fn tokenize(text: &str, stop_words: &HashSet<&str>) -> Vec<String> {
    let re_word = RE_WORD.get_or_init(|| Regex::new(r"\b\w+\b").unwrap());

    let lowered = text.to_lowercase();
    let kept: Vec<&str> = lowered
        .split_whitespace()
        .filter(|word| !stop_words.contains(word))
        .collect();
    let kept = kept.join(" ");

    re_word
        .find_iter(&kept)
        .map(|m| m.as_str().to_string())
        .collect()
}
