use std::collections::{BTreeMap, HashMap};

use crate::{
    config::KeyPointConfig,
    text::{split_sentences, terms, word_count},
    types::RankedSentence,
};

/// Rank sentences by summed TF-IDF weight.
///
/// Only sentences with more than `min_sentence_words` words are considered.
/// Term weights use smoothed IDF (`ln((1 + n) / (1 + df)) + 1`) and each
/// sentence vector is L2-normalised before summing, over a vocabulary limited
/// to the `max_vocabulary` most frequent terms. Returns at most
/// `max_sentences`, highest score first; equal scores keep reading order.
pub fn rank_sentences(text: &str, config: &KeyPointConfig) -> Vec<RankedSentence> {
    let sentences: Vec<String> = split_sentences(text)
        .into_iter()
        .filter(|s| word_count(s) > config.min_sentence_words)
        .collect();
    if sentences.is_empty() {
        return Vec::new();
    }

    let tokenized: Vec<Vec<String>> = sentences.iter().map(|s| terms(s)).collect();
    let vocabulary = build_vocabulary(&tokenized, config.max_vocabulary);

    let n = sentences.len() as f64;
    let mut document_frequency: HashMap<&str, usize> = HashMap::new();
    for tokens in &tokenized {
        let mut distinct: Vec<&str> = tokens
            .iter()
            .map(String::as_str)
            .filter(|t| vocabulary.contains_key(*t))
            .collect();
        distinct.sort_unstable();
        distinct.dedup();
        for term in distinct {
            *document_frequency.entry(term).or_default() += 1;
        }
    }

    let idf = |term: &str| -> f64 {
        let df = document_frequency.get(term).copied().unwrap_or(0) as f64;
        ((1.0 + n) / (1.0 + df)).ln() + 1.0
    };

    let mut ranked: Vec<RankedSentence> = sentences
        .into_iter()
        .zip(&tokenized)
        .map(|(text, tokens)| {
            let mut counts: BTreeMap<&str, f64> = BTreeMap::new();
            for term in tokens.iter().filter(|t| vocabulary.contains_key(t.as_str())) {
                *counts.entry(term.as_str()).or_default() += 1.0;
            }
            let weights: Vec<f64> = counts.iter().map(|(term, tf)| tf * idf(*term)).collect();
            let norm = weights.iter().map(|w| w * w).sum::<f64>().sqrt();
            let score = if norm > 0.0 {
                weights.iter().sum::<f64>() / norm
            } else {
                0.0
            };
            RankedSentence { text, score }
        })
        .collect();

    // Stable sort keeps reading order among equal scores.
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(config.max_sentences);
    ranked
}

/// The `limit` most frequent terms across all sentences; ties go to the
/// alphabetically earlier term.
fn build_vocabulary(tokenized: &[Vec<String>], limit: usize) -> HashMap<String, usize> {
    let mut totals: HashMap<&str, usize> = HashMap::new();
    for term in tokenized.iter().flatten() {
        *totals.entry(term.as_str()).or_default() += 1;
    }

    let mut by_frequency: Vec<(&str, usize)> = totals.into_iter().collect();
    by_frequency.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    by_frequency
        .into_iter()
        .take(limit)
        .map(|(term, count)| (term.to_string(), count))
        .collect()
}
