use std::collections::HashSet;

use tracing::debug;

use crate::{
    capabilities::{Embedder, cosine_similarity},
    types::{KeyPoint, KeyPointOrigin},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Admission {
    Accepted,
    /// Same text as an accepted key point; no embedding was computed.
    Duplicate,
    NearDuplicate { similarity: f32 },
    /// The embedder failed, so novelty could not be checked.
    Unverified,
}

/// Growing list of accepted key points that rejects exact and semantic
/// repeats.
///
/// Embeddings of accepted points are computed once and reused. The first
/// point is accepted without embedding; its vector is fetched alongside the
/// next candidate.
pub struct NoveltyFilter<'a> {
    embedder: &'a dyn Embedder,
    threshold: f32,
    accepted: Vec<KeyPoint>,
    embeddings: Vec<Option<Vec<f32>>>,
    seen: HashSet<String>,
}

impl<'a> NoveltyFilter<'a> {
    pub fn new(embedder: &'a dyn Embedder, threshold: f32) -> Self {
        Self {
            embedder,
            threshold,
            accepted: Vec::new(),
            embeddings: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.seen.contains(text)
    }

    pub async fn admit(&mut self, text: String, origin: KeyPointOrigin) -> Admission {
        if self.seen.contains(&text) {
            return Admission::Duplicate;
        }

        if self.accepted.is_empty() {
            self.accept(text, origin, None);
            return Admission::Accepted;
        }

        let missing: Vec<usize> = (0..self.embeddings.len())
            .filter(|&i| self.embeddings[i].is_none())
            .collect();
        let mut batch = Vec::with_capacity(missing.len() + 1);
        batch.push(text.clone());
        batch.extend(missing.iter().map(|&i| self.accepted[i].text.clone()));

        let mut vectors = match self.embedder.embed(&batch).await {
            Ok(vectors) if vectors.len() == batch.len() => vectors,
            Ok(vectors) => {
                debug!(expected = batch.len(), got = vectors.len(), "embedder returned wrong count");
                return Admission::Unverified;
            }
            Err(e) => {
                debug!(error = %e, "embedding failed, rejecting candidate");
                return Admission::Unverified;
            }
        };

        let candidate = vectors.remove(0);
        for (&i, vector) in missing.iter().zip(vectors) {
            self.embeddings[i] = Some(vector);
        }

        let closest = self
            .embeddings
            .iter()
            .flatten()
            .map(|existing| cosine_similarity(&candidate, existing))
            .fold(f32::MIN, f32::max);

        if closest > self.threshold {
            debug!(similarity = closest, candidate = %text, "near-duplicate key point");
            return Admission::NearDuplicate {
                similarity: closest,
            };
        }

        self.accept(text, origin, Some(candidate));
        Admission::Accepted
    }

    fn accept(&mut self, text: String, origin: KeyPointOrigin, embedding: Option<Vec<f32>>) {
        self.seen.insert(text.clone());
        self.accepted.push(KeyPoint { text, origin });
        self.embeddings.push(embedding);
    }

    pub fn into_key_points(self) -> Vec<KeyPoint> {
        self.accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::scripted::ScriptedEmbedder;

    #[tokio::test]
    async fn exact_duplicates_never_reach_the_embedder() {
        let embedder = ScriptedEmbedder::hashed(128);
        let mut filter = NoveltyFilter::new(&embedder, 0.85);

        let fact = "Rivers carry sediment downstream".to_string();
        assert_eq!(filter.admit(fact.clone(), KeyPointOrigin::Synthesized).await, Admission::Accepted);
        assert_eq!(embedder.calls(), 0);

        assert_eq!(filter.admit(fact, KeyPointOrigin::Synthesized).await, Admission::Duplicate);
        assert_eq!(embedder.calls(), 0);
        assert_eq!(filter.len(), 1);
    }

    #[tokio::test]
    async fn near_duplicates_are_rejected() {
        let embedder = ScriptedEmbedder::hashed(256);
        let mut filter = NoveltyFilter::new(&embedder, 0.85);

        filter
            .admit(
                "Photosynthesis converts light into chemical energy".to_string(),
                KeyPointOrigin::Synthesized,
            )
            .await;
        let verdict = filter
            .admit(
                "Photosynthesis converts light into chemical energy in plants".to_string(),
                KeyPointOrigin::Synthesized,
            )
            .await;

        assert!(matches!(verdict, Admission::NearDuplicate { .. }));
        assert_eq!(filter.len(), 1);
    }

    #[tokio::test]
    async fn accepted_embeddings_are_reused() {
        let embedder = ScriptedEmbedder::hashed(256);
        let mut filter = NoveltyFilter::new(&embedder, 0.85);

        for fact in [
            "Glaciers carve valleys through granite",
            "Volcanoes release molten rock and ash",
            "Coral reefs host diverse marine species",
        ] {
            assert_eq!(
                filter.admit(fact.to_string(), KeyPointOrigin::Synthesized).await,
                Admission::Accepted
            );
        }

        // second candidate embeds itself plus the first point, third only itself
        assert_eq!(embedder.calls(), 2);
        assert_eq!(embedder.texts_embedded(), 3);
        let texts: Vec<_> = filter.into_key_points().into_iter().map(|k| k.text).collect();
        assert_eq!(texts[0], "Glaciers carve valleys through granite");
    }
}
