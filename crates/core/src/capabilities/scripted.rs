//! Scripted capability doubles for tests and offline runs.
//!
//! Each double answers from a closure and counts how often it was called, so
//! tests can assert both on pipeline output and on how much model work was
//! spent getting there.

use std::{
    hash::{DefaultHasher, Hash, Hasher},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;

use crate::{
    capabilities::{
        Answer, AnswerExtractor, Embedder, GenerationParams, KeyphraseExtractor, QuizAuthor,
        TextGenerator,
    },
    error::{QuizforgeError, Result},
    text::terms,
    types::{Keyphrase, RawQuizText},
};

type GenerateFn = dyn Fn(&str) -> Result<Vec<String>> + Send + Sync;
type AnswerFn = dyn Fn(&str, &str) -> Result<Answer> + Send + Sync;
type EmbedFn = dyn Fn(&str) -> Vec<f32> + Send + Sync;
type AuthorFn = dyn Fn(&str, usize, usize) -> Result<Option<RawQuizText>> + Send + Sync;

/// Convenience for closures that want to fail a single call.
pub fn scripted_failure(reason: &str) -> QuizforgeError {
    QuizforgeError::CallFailed {
        capability: "scripted",
        reason: reason.to_string(),
    }
}

pub struct ScriptedGenerator {
    respond: Box<GenerateFn>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<(String, GenerationParams)>>,
}

impl ScriptedGenerator {
    pub fn new(respond: impl Fn(&str) -> Result<Vec<String>> + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every prompt seen so far, with the parameters it was sent with.
    pub fn prompts(&self) -> Vec<(String, GenerationParams)> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push((prompt.to_string(), params.clone()));
        }
        (self.respond)(prompt)
    }
}

pub struct ScriptedAnswerer {
    respond: Box<AnswerFn>,
    calls: AtomicUsize,
}

impl ScriptedAnswerer {
    pub fn new(respond: impl Fn(&str, &str) -> Result<Answer> + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnswerExtractor for ScriptedAnswerer {
    async fn answer(&self, question: &str, context: &str) -> Result<Answer> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(question, context)
    }
}

pub struct ScriptedEmbedder {
    vectorize: Box<EmbedFn>,
    calls: AtomicUsize,
    texts: AtomicUsize,
}

impl ScriptedEmbedder {
    pub fn new(vectorize: impl Fn(&str) -> Vec<f32> + Send + Sync + 'static) -> Self {
        Self {
            vectorize: Box::new(vectorize),
            calls: AtomicUsize::new(0),
            texts: AtomicUsize::new(0),
        }
    }

    /// Deterministic bag-of-words embedding: each non-stop-word term is hashed
    /// into one of `dims` buckets. Texts sharing vocabulary end up close.
    pub fn hashed(dims: usize) -> Self {
        let dims = dims.max(1);
        Self::new(move |text: &str| {
            let mut vector = vec![0.0f32; dims];
            for term in terms(text) {
                let mut hasher = DefaultHasher::new();
                term.hash(&mut hasher);
                vector[(hasher.finish() % dims as u64) as usize] += 1.0;
            }
            vector
        })
    }

    /// Number of `embed` invocations.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of individual texts embedded across all calls.
    pub fn texts_embedded(&self) -> usize {
        self.texts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for ScriptedEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|t| (self.vectorize)(t)).collect())
    }
}

/// Returns a fixed keyphrase list, or fails every call when built with
/// [`ScriptedKeyphrases::failing`].
pub struct ScriptedKeyphrases {
    phrases: Option<Vec<Keyphrase>>,
}

impl ScriptedKeyphrases {
    pub fn new(phrases: Vec<Keyphrase>) -> Self {
        Self {
            phrases: Some(phrases),
        }
    }

    pub fn failing() -> Self {
        Self { phrases: None }
    }
}

#[async_trait]
impl KeyphraseExtractor for ScriptedKeyphrases {
    async fn extract(&self, _text: &str, top_n: usize) -> Result<Vec<Keyphrase>> {
        match &self.phrases {
            Some(phrases) => Ok(phrases.iter().take(top_n).cloned().collect()),
            None => Err(scripted_failure("keyphrase extraction unavailable")),
        }
    }
}

pub struct ScriptedAuthor {
    respond: Box<AuthorFn>,
    calls: AtomicUsize,
}

impl ScriptedAuthor {
    pub fn new(
        respond: impl Fn(&str, usize, usize) -> Result<Option<RawQuizText>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always returns the same quiz text.
    pub fn fixed(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_, _, _| Ok(Some(RawQuizText::new(text.clone()))))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuizAuthor for ScriptedAuthor {
    async fn author(
        &self,
        key_points: &str,
        num_mcq: usize,
        num_tf: usize,
    ) -> Result<Option<RawQuizText>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(key_points, num_mcq, num_tf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::cosine_similarity;

    #[tokio::test]
    async fn hashed_embeddings_track_shared_vocabulary() {
        let embedder = ScriptedEmbedder::hashed(256);
        let vectors = embedder
            .embed(&[
                "Photosynthesis converts light into chemical energy".to_string(),
                "Photosynthesis converts light into chemical energy in plants".to_string(),
                "Volcanoes erupt molten rock".to_string(),
            ])
            .await
            .unwrap();

        let close = cosine_similarity(&vectors[0], &vectors[1]);
        let far = cosine_similarity(&vectors[0], &vectors[2]);
        assert!(close > 0.85, "{close}");
        assert!(far < 0.5, "{far}");
        assert_eq!(embedder.calls(), 1);
        assert_eq!(embedder.texts_embedded(), 3);
    }

    #[tokio::test]
    async fn generator_records_prompts() {
        let generator = ScriptedGenerator::new(|p| Ok(vec![p.to_uppercase()]));
        let params = GenerationParams {
            max_length: 10,
            num_beams: 1,
            num_return_sequences: 1,
            temperature: None,
        };

        let out = generator.generate("hi", &params).await.unwrap();
        assert_eq!(out, vec!["HI"]);
        assert_eq!(generator.calls(), 1);
        assert_eq!(generator.prompts()[0].0, "hi");
    }
}
