pub mod capabilities;
pub mod config;
pub mod error;
pub mod format;
pub mod keypoints;
pub mod pipeline;
pub mod provider;
pub mod quiz;
pub mod source;
pub mod text;
pub mod types;

pub use capabilities::{
    AnswerExtractor, Embedder, KeyphraseExtractor, Models, QuizAuthor, TextGenerator,
};
pub use config::{KeyPointConfig, QuizConfig, Settings};
pub use error::{QuizforgeError, Result};
pub use format::{format_key_points, format_parsed_quiz, format_quiz_readable};
pub use keypoints::extract_key_points;
pub use pipeline::{QuizOutcome, generate_quiz};
pub use provider::{Provider, ProviderConfig};
pub use quiz::parse_quiz;
pub use source::TranscriptSource;
pub use types::{
    KeyPoint, KeyPointOrigin, MultipleChoice, ParsedQuiz, QuizItem, RawQuizText, Transcript,
    TrueFalse, Verdict,
};
