use async_trait::async_trait;
use tracing::debug;

use crate::{
    capabilities::QuizAuthor,
    config::AuthorConfig,
    error::{QuizforgeError, Result},
    provider::Provider,
    quiz::quiz_prompt,
    types::RawQuizText,
};

/// Authors quiz text through an OpenAI-compatible chat completions endpoint.
pub struct ChatQuizAuthor {
    http: reqwest::Client,
    provider: Provider,
    api_key: String,
    model: String,
}

impl ChatQuizAuthor {
    pub fn new(http: reqwest::Client, config: &AuthorConfig) -> Result<Self> {
        let provider = config.provider;
        let api_key = provider.validate_api_key()?;
        let model = config
            .model
            .clone()
            .unwrap_or_else(|| provider.config().model.to_string());

        Ok(Self {
            http,
            provider,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl QuizAuthor for ChatQuizAuthor {
    async fn author(
        &self,
        key_points: &str,
        num_mcq: usize,
        num_tf: usize,
    ) -> Result<Option<RawQuizText>> {
        let config = self.provider.config();
        let prompt = quiz_prompt(key_points, num_mcq, num_tf);

        let response = self
            .http
            .post(config.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [
                    {
                        "role": "user",
                        "content": prompt,
                    },
                ],
                "temperature": 0.3,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuizforgeError::QuizAuthoringFailed {
                reason: format!(
                    "{} returned {}: {}",
                    self.provider.name(),
                    status,
                    response.text().await.unwrap_or_default()
                ),
            });
        }

        let response = response.json::<serde_json::Value>().await?;
        let content = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| QuizforgeError::QuizAuthoringFailed {
                reason: format!("Invalid API response: {:?}", response),
            })?;

        let content = content.trim();
        if content.is_empty() {
            debug!(provider = self.provider.name(), "quiz author returned empty content");
            return Ok(None);
        }
        Ok(Some(RawQuizText::new(content)))
    }
}
