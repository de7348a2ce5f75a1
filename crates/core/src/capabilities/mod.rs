//! Model capabilities the pipeline calls out to.
//!
//! Each capability is a trait so the real HTTP-backed implementations and the
//! scripted doubles in [`scripted`] are interchangeable. Implementations are
//! built once per process and shared through [`Models`].

pub mod author;
pub mod inference;
pub mod keyphrase;
pub mod scripted;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    config::Settings,
    error::Result,
    types::{Keyphrase, RawQuizText},
};

pub use author::ChatQuizAuthor;
pub use inference::InferenceClient;
pub use keyphrase::EmbeddingKeyphraseExtractor;

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub max_length: usize,
    pub num_beams: usize,
    pub num_return_sequences: usize,
    pub temperature: Option<f32>,
}

/// Extractive answer span with the model's confidence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub score: f32,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<Vec<String>>;
}

#[async_trait]
pub trait AnswerExtractor: Send + Sync {
    async fn answer(&self, question: &str, context: &str) -> Result<Answer>;
}

#[async_trait]
pub trait Embedder: Send + Sync {
    /// One vector per input text, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

#[async_trait]
pub trait KeyphraseExtractor: Send + Sync {
    /// Up to `top_n` phrases, most relevant first.
    async fn extract(&self, text: &str, top_n: usize) -> Result<Vec<Keyphrase>>;
}

#[async_trait]
pub trait QuizAuthor: Send + Sync {
    /// `Ok(None)` means the model produced nothing usable.
    async fn author(
        &self,
        key_points: &str,
        num_mcq: usize,
        num_tf: usize,
    ) -> Result<Option<RawQuizText>>;
}

/// Shared, read-only handles to every capability a pipeline run needs.
#[derive(Clone)]
pub struct Models {
    pub question_generator: Arc<dyn TextGenerator>,
    pub fact_synthesizer: Arc<dyn TextGenerator>,
    pub answer_extractor: Arc<dyn AnswerExtractor>,
    pub embedder: Arc<dyn Embedder>,
    pub keyphrases: Arc<dyn KeyphraseExtractor>,
    pub quiz_author: Arc<dyn QuizAuthor>,
}

impl Models {
    /// Build the HTTP-backed capabilities. Fails with a resource-unavailable
    /// error if any of them cannot be set up.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let inference = &settings.inference;
        let client = InferenceClient::build_http(inference)?;

        let questions = InferenceClient::new(client.clone(), inference, &inference.question_model)?;
        let facts = InferenceClient::new(client.clone(), inference, &inference.fact_model)?;
        let answers = InferenceClient::new(client.clone(), inference, &inference.qa_model)?;
        let embedder: Arc<dyn Embedder> = Arc::new(InferenceClient::new(
            client.clone(),
            inference,
            &inference.embedding_model,
        )?);
        let author = ChatQuizAuthor::new(client, &settings.author)?;

        Ok(Self {
            question_generator: Arc::new(questions),
            fact_synthesizer: Arc::new(facts),
            answer_extractor: Arc::new(answers),
            keyphrases: Arc::new(EmbeddingKeyphraseExtractor::new(Arc::clone(&embedder))),
            embedder,
            quiz_author: Arc::new(author),
        })
    }
}

/// Cosine similarity; zero when either vector has no magnitude or the
/// lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut na, mut nb) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na.sqrt() * nb.sqrt())
}
