//! Plain-text helpers shared by the ranking and keyphrase stages.

mod stopwords;

use once_cell::sync::Lazy;
use regex::Regex;

pub use stopwords::is_stop_word;

/// Two or more word characters, the same token shape the TF-IDF vocabulary uses.
static TERM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid term regex"));

const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "e.g", "i.e", "approx", "fig",
];

/// Collapse every whitespace run to a single space and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Lowercased terms of `text` with stop words removed, in reading order.
pub fn terms(text: &str) -> Vec<String> {
    TERM.find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|t| !is_stop_word(t))
        .collect()
}

/// Distinct word n-grams of `min..=max` terms built from the stop-word-free
/// term stream. At most `limit` are kept, most frequent first; equally
/// frequent grams keep first-occurrence order.
pub fn candidate_ngrams(text: &str, min: usize, max: usize, limit: usize) -> Vec<String> {
    let tokens = terms(text);
    let mut counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    let mut out = Vec::new();

    for start in 0..tokens.len() {
        for n in min.max(1)..=max {
            let Some(window) = tokens.get(start..start + n) else {
                break;
            };
            let gram = window.join(" ");
            let count = counts.entry(gram.clone()).or_default();
            if *count == 0 {
                out.push(gram);
            }
            *count += 1;
        }
    }

    // Stable sort keeps first-occurrence order among equal counts.
    out.sort_by(|a, b| counts[b].cmp(&counts[a]));
    out.truncate(limit);
    out
}

fn is_closing(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '”' | '’')
}

fn opens_sentence(c: char) -> bool {
    c.is_uppercase() || c.is_ascii_digit() || matches!(c, '"' | '\'' | '(' | '[' | '“' | '‘')
}

fn ends_with_abbreviation(before: &str) -> bool {
    let word = before
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or("")
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    // Initials such as "J." or the inner dots of "U.S."
    word.chars().count() == 1 || ABBREVIATIONS.contains(&word.as_str())
}

/// Split text into sentences on terminal punctuation followed by whitespace and
/// a sentence opener. Returned sentences are trimmed and non-empty.
pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];
        if !matches!(c, '.' | '!' | '?') {
            i += 1;
            continue;
        }

        let mut end = i + 1;
        while end < chars.len() && (matches!(chars[end].1, '.' | '!' | '?') || is_closing(chars[end].1)) {
            end += 1;
        }
        let end_byte = chars.get(end).map(|&(p, _)| p).unwrap_or(text.len());

        let next_visible = chars[end..].iter().map(|&(_, c)| c).find(|c| !c.is_whitespace());
        let followed_by_space = chars.get(end).is_some_and(|&(_, c)| c.is_whitespace());

        let boundary = match next_visible {
            None => true,
            Some(next) => {
                followed_by_space
                    && opens_sentence(next)
                    && !(c == '.' && ends_with_abbreviation(&text[start..pos]))
            }
        };

        if boundary {
            let sentence = text[start..end_byte].trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            start = end_byte;
        }
        i = end;
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}
