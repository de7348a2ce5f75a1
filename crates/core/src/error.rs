use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuizforgeError {
    /// A model capability could not be brought up. Fatal for any run that needs it.
    #[error("{capability} is unavailable: {reason}")]
    ResourceUnavailable {
        capability: &'static str,
        reason: String,
    },

    #[error("Inference request to {model} failed with status {status}: {body}")]
    InferenceFailed {
        model: String,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {model}: {reason}")]
    InvalidResponse { model: String, reason: String },

    #[error("{capability} call failed: {reason}")]
    CallFailed {
        capability: &'static str,
        reason: String,
    },

    #[error("Quiz authoring failed: {reason}")]
    QuizAuthoringFailed { reason: String },

    #[error("Invalid config at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Missing API key: {env_var} environment variable is not set")]
    MissingApiKey { env_var: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),
}

impl QuizforgeError {
    /// True for failures that make a capability unusable for the whole run,
    /// as opposed to a single item failing its model call.
    pub fn is_resource_unavailable(&self) -> bool {
        matches!(
            self,
            QuizforgeError::ResourceUnavailable { .. } | QuizforgeError::MissingApiKey { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, QuizforgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_errors_are_told_apart_from_item_failures() {
        let unavailable = QuizforgeError::ResourceUnavailable {
            capability: "embedder",
            reason: "no client".to_string(),
        };
        let missing_key = QuizforgeError::MissingApiKey {
            env_var: "GEMINI_API_KEY".to_string(),
        };
        let item = QuizforgeError::CallFailed {
            capability: "question generator",
            reason: "timeout".to_string(),
        };

        assert!(unavailable.is_resource_unavailable());
        assert!(missing_key.is_resource_unavailable());
        assert!(!item.is_resource_unavailable());
    }

    #[test]
    fn messages_name_the_failing_capability() {
        let err = QuizforgeError::ResourceUnavailable {
            capability: "answer extractor",
            reason: "bad base url".to_string(),
        };
        assert_eq!(err.to_string(), "answer extractor is unavailable: bad base url");
    }
}
