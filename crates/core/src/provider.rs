use serde::{Deserialize, Serialize};

use crate::error::{QuizforgeError, Result};

/// Chat-completions provider used to author the quiz.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Grok,
    Openai,
    #[default]
    Gemini,
}

pub struct ProviderConfig {
    pub api_url: &'static str,
    pub model: &'static str,
    pub env_var: &'static str,
}

impl Provider {
    pub fn config(&self) -> ProviderConfig {
        match self {
            Provider::Grok => ProviderConfig {
                api_url: "https://api.x.ai/v1/chat/completions",
                model: "grok-4-fast",
                env_var: "XAI_API_KEY",
            },
            Provider::Openai => ProviderConfig {
                api_url: "https://api.openai.com/v1/chat/completions",
                model: "gpt-4.1-mini",
                env_var: "OPENAI_API_KEY",
            },
            Provider::Gemini => ProviderConfig {
                api_url: "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions",
                model: "gemini-2.0-flash-lite",
                env_var: "GEMINI_API_KEY",
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Grok => "Grok",
            Provider::Openai => "OpenAI",
            Provider::Gemini => "Gemini",
        }
    }

    /// Validate that the API key is set for this provider
    pub fn validate_api_key(&self) -> Result<String> {
        let config = self.config();
        match std::env::var(config.env_var) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(QuizforgeError::MissingApiKey {
                env_var: config.env_var.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn providers_deserialize_from_lowercase_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            provider: Provider,
        }

        let parsed: Wrapper = toml::from_str(r#"provider = "openai""#).unwrap();
        assert_eq!(parsed.provider, Provider::Openai);
    }

    #[test]
    fn every_provider_has_its_own_key_variable() {
        let vars = [Provider::Grok, Provider::Openai, Provider::Gemini]
            .map(|p| p.config().env_var);
        assert_eq!(vars, ["XAI_API_KEY", "OPENAI_API_KEY", "GEMINI_API_KEY"]);
    }
}
