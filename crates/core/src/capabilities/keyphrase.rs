use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    capabilities::{Embedder, KeyphraseExtractor, cosine_similarity},
    error::{QuizforgeError, Result},
    text::candidate_ngrams,
    types::Keyphrase,
};

const EMBED_BATCH: usize = 64;
const MAX_CANDIDATES: usize = 256;

/// Scores candidate 1-3 word phrases by how close their embedding sits to
/// the embedding of the whole document.
///
/// Only the `max_candidates` most frequent phrases are embedded, which bounds
/// the embedding requests per transcript regardless of its length.
pub struct EmbeddingKeyphraseExtractor {
    embedder: Arc<dyn Embedder>,
    ngram_range: (usize, usize),
    max_candidates: usize,
}

impl EmbeddingKeyphraseExtractor {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            ngram_range: (1, 3),
            max_candidates: MAX_CANDIDATES,
        }
    }

    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    pub fn with_ngram_range(mut self, min: usize, max: usize) -> Self {
        self.ngram_range = (min, max.max(min));
        self
    }

    async fn embed_all(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(EMBED_BATCH) {
            let embedded = self.embedder.embed(batch).await?;
            if embedded.len() != batch.len() {
                return Err(QuizforgeError::CallFailed {
                    capability: "embedder",
                    reason: format!("asked for {} vectors, got {}", batch.len(), embedded.len()),
                });
            }
            vectors.extend(embedded);
        }
        Ok(vectors)
    }
}

#[async_trait]
impl KeyphraseExtractor for EmbeddingKeyphraseExtractor {
    async fn extract(&self, text: &str, top_n: usize) -> Result<Vec<Keyphrase>> {
        let (min, max) = self.ngram_range;
        let candidates = candidate_ngrams(text, min, max, self.max_candidates);
        if candidates.is_empty() || top_n == 0 {
            return Ok(Vec::new());
        }

        let document = self.embed_all(&[text.to_string()]).await?;
        let phrases = self.embed_all(&candidates).await?;

        let mut scored: Vec<Keyphrase> = candidates
            .into_iter()
            .zip(&phrases)
            .map(|(phrase, vector)| Keyphrase {
                relevance: cosine_similarity(&document[0], vector),
                phrase,
            })
            .collect();

        scored.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
        scored.truncate(top_n);
        Ok(scored)
    }
}
