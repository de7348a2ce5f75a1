use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    capabilities::{Answer, AnswerExtractor, Embedder, GenerationParams, TextGenerator},
    config::InferenceConfig,
    error::{QuizforgeError, Result},
};

/// Client for a Hugging Face style inference endpoint, bound to one model.
///
/// The same type serves text2text generation, extractive QA and sentence
/// embedding; which one applies depends on the model it is bound to.
#[derive(Clone)]
pub struct InferenceClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct Generated {
    generated_text: String,
}

impl InferenceClient {
    /// Shared HTTP client for every model on the endpoint.
    pub fn build_http(config: &InferenceConfig) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| QuizforgeError::ResourceUnavailable {
                capability: "inference client",
                reason: e.to_string(),
            })
    }

    pub fn new(http: reqwest::Client, config: &InferenceConfig, model: &str) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(QuizforgeError::ResourceUnavailable {
                capability: "inference client",
                reason: format!("base url must be http(s), got {:?}", config.base_url),
            });
        }
        if model.trim().is_empty() {
            return Err(QuizforgeError::ResourceUnavailable {
                capability: "inference client",
                reason: "model id is empty".to_string(),
            });
        }

        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty());

        Ok(Self {
            http,
            base_url,
            model: model.to_string(),
            token,
        })
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}/models/{}{}", self.base_url, self.model, suffix)
    }

    async fn post(&self, suffix: &str, body: Value) -> Result<Value> {
        let mut request = self
            .http
            .post(self.url(suffix))
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(QuizforgeError::InferenceFailed {
                model: self.model.clone(),
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json::<Value>().await?)
    }

    fn invalid(&self, reason: impl Into<String>) -> QuizforgeError {
        QuizforgeError::InvalidResponse {
            model: self.model.clone(),
            reason: reason.into(),
        }
    }
}

fn generation_body(prompt: &str, params: &GenerationParams) -> Value {
    let mut parameters = json!({
        "max_length": params.max_length,
        "num_beams": params.num_beams,
        "num_return_sequences": params.num_return_sequences,
    });
    if let Some(temperature) = params.temperature {
        parameters["temperature"] = json!(temperature);
    }
    json!({
        "inputs": prompt,
        "parameters": parameters,
        "options": { "wait_for_model": true },
    })
}

#[async_trait]
impl TextGenerator for InferenceClient {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<Vec<String>> {
        let response = self.post("", generation_body(prompt, params)).await?;
        let generated: Vec<Generated> = serde_json::from_value(response)
            .map_err(|e| self.invalid(format!("expected [{{generated_text}}]: {e}")))?;
        Ok(generated.into_iter().map(|g| g.generated_text).collect())
    }
}

#[async_trait]
impl AnswerExtractor for InferenceClient {
    async fn answer(&self, question: &str, context: &str) -> Result<Answer> {
        let response = self
            .post(
                "",
                json!({
                    "inputs": { "question": question, "context": context },
                    "options": { "wait_for_model": true },
                }),
            )
            .await?;

        // Some deployments wrap the single best span in an array.
        let best = match response {
            Value::Array(mut spans) if !spans.is_empty() => spans.swap_remove(0),
            other => other,
        };
        serde_json::from_value(best).map_err(|e| self.invalid(format!("expected {{answer, score}}: {e}")))
    }
}

#[async_trait]
impl Embedder for InferenceClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let response = self
            .post(
                "/pipeline/feature-extraction",
                json!({
                    "inputs": texts,
                    "options": { "wait_for_model": true },
                }),
            )
            .await?;

        let vectors: Vec<Vec<f32>> = serde_json::from_value(response)
            .map_err(|e| self.invalid(format!("expected one vector per input: {e}")))?;
        if vectors.len() != texts.len() {
            return Err(self.invalid(format!(
                "asked for {} embeddings, got {}",
                texts.len(),
                vectors.len()
            )));
        }
        Ok(vectors)
    }
}
