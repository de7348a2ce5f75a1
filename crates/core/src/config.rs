//! Settings consumed by the pipeline and by capability construction.
//!
//! Everything has a built-in default, so a config file only needs the keys
//! it wants to change.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::{QuizforgeError, Result},
    provider::Provider,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub inference: InferenceConfig,
    pub author: AuthorConfig,
    pub key_points: KeyPointConfig,
    pub quiz: QuizConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub base_url: String,
    /// Environment variable holding the bearer token, if the endpoint needs one.
    pub token_env: String,
    pub question_model: String,
    pub fact_model: String,
    pub qa_model: String,
    pub embedding_model: String,
    pub timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://router.huggingface.co/hf-inference".to_string(),
            token_env: "HF_TOKEN".to_string(),
            question_model: "mrm8488/t5-base-finetuned-question-generation-ap".to_string(),
            fact_model: "google/flan-t5-large".to_string(),
            qa_model: "deepset/roberta-large-squad2".to_string(),
            embedding_model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorConfig {
    pub provider: Provider,
    /// Overrides the provider's default chat model.
    pub model: Option<String>,
}

/// Caps and thresholds for key-point distillation.
///
/// Word-count minimums are exclusive: a sentence qualifies only with strictly
/// more words than the minimum.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyPointConfig {
    pub target: usize,
    pub max_sentences: usize,
    pub min_sentence_words: usize,
    pub max_vocabulary: usize,
    pub max_keyphrases: usize,
    pub question_sentences: usize,
    pub min_question_sentence_words: usize,
    pub question_keyphrases: usize,
    pub min_keyphrase_relevance: f32,
    pub max_questions: usize,
    pub min_answer_confidence: f32,
    pub min_answer_words: usize,
    pub min_fact_chars: usize,
    pub similarity_threshold: f32,
    pub min_padding_words: usize,
}

impl Default for KeyPointConfig {
    fn default() -> Self {
        Self {
            target: 20,
            max_sentences: 30,
            min_sentence_words: 5,
            max_vocabulary: 1000,
            max_keyphrases: 30,
            question_sentences: 15,
            min_question_sentence_words: 10,
            question_keyphrases: 10,
            min_keyphrase_relevance: 0.3,
            max_questions: 30,
            min_answer_confidence: 0.55,
            min_answer_words: 2,
            min_fact_chars: 15,
            similarity_threshold: 0.85,
            min_padding_words: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    pub num_mcq: usize,
    pub num_tf: usize,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            num_mcq: 5,
            num_tf: 3,
        }
    }
}

/// `<config dir>/quizforge/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("quizforge").join("config.toml"))
}

impl Settings {
    /// Load settings from `path`, or from the default location when it exists.
    /// An explicit path that cannot be read is an error; a missing default file
    /// is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| QuizforgeError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content).map_err(|e| QuizforgeError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
