use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw source text handed to the pipeline. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transcript(String);

impl Transcript {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for Transcript {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for Transcript {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

/// Whisper-style transcript file: `{ "text": ..., "segments": [...], "language": ... }`
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptFile {
    pub text: String,
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSentence {
    pub text: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyphrase {
    pub phrase: String,
    pub relevance: f32,
}

impl Keyphrase {
    pub fn new(phrase: impl Into<String>, relevance: f32) -> Self {
        Self {
            phrase: phrase.into(),
            relevance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateQuestion {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrioritizedQuestion {
    pub text: String,
    pub priority: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QaResult {
    pub question: String,
    pub answer: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPointOrigin {
    /// Rewritten from an accepted question/answer pair.
    Synthesized,
    /// Raw important sentence used to pad the list.
    Sentence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyPoint {
    pub text: String,
    pub origin: KeyPointOrigin,
}

/// Free-form quiz text as returned by the authoring model.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawQuizText(String);

impl RawQuizText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RawQuizText {
    fn from(text: String) -> Self {
        Self(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipleChoice {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    True,
    False,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::True => f.write_str("True"),
            Verdict::False => f.write_str("False"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrueFalse {
    pub question: String,
    pub answer: Verdict,
}

/// One structured question record, serialized with the `"type"` tag the quiz
/// consumers expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QuizItem {
    #[serde(rename = "Multiple Choice")]
    MultipleChoice(MultipleChoice),
    #[serde(rename = "True/False")]
    TrueFalse(TrueFalse),
}

impl QuizItem {
    pub fn question(&self) -> &str {
        match self {
            QuizItem::MultipleChoice(item) => &item.question,
            QuizItem::TrueFalse(item) => &item.question,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedQuiz {
    pub multiple_choice: Vec<MultipleChoice>,
    pub true_false: Vec<TrueFalse>,
}

impl ParsedQuiz {
    pub fn is_empty(&self) -> bool {
        self.multiple_choice.is_empty() && self.true_false.is_empty()
    }

    pub fn len(&self) -> usize {
        self.multiple_choice.len() + self.true_false.len()
    }

    /// Multiple-choice items first, then true/false, each in source order.
    pub fn items(&self) -> Vec<QuizItem> {
        self.multiple_choice
            .iter()
            .cloned()
            .map(QuizItem::MultipleChoice)
            .chain(self.true_false.iter().cloned().map(QuizItem::TrueFalse))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_items_serialize_with_type_tag() {
        let quiz = ParsedQuiz {
            multiple_choice: vec![MultipleChoice {
                question: "Which planet is largest?".to_string(),
                options: vec![
                    "Mars".to_string(),
                    "Jupiter".to_string(),
                    "Venus".to_string(),
                    "Mercury".to_string(),
                ],
                answer: "Jupiter".to_string(),
            }],
            true_false: vec![TrueFalse {
                question: "The Sun is a star.".to_string(),
                answer: Verdict::True,
            }],
        };

        let json = serde_json::to_value(quiz.items()).unwrap();
        assert_eq!(json[0]["type"], "Multiple Choice");
        assert_eq!(json[0]["answer"], "Jupiter");
        assert_eq!(json[0]["options"].as_array().unwrap().len(), 4);
        assert_eq!(json[1]["type"], "True/False");
        assert_eq!(json[1]["answer"], "True");
    }

    #[test]
    fn items_keep_multiple_choice_before_true_false() {
        let quiz = ParsedQuiz {
            multiple_choice: vec![MultipleChoice {
                question: "Q1".to_string(),
                options: vec!["a".to_string(), "b".to_string()],
                answer: "b".to_string(),
            }],
            true_false: vec![TrueFalse {
                question: "Q2".to_string(),
                answer: Verdict::False,
            }],
        };

        let questions: Vec<_> = quiz.items().iter().map(|i| i.question().to_string()).collect();
        assert_eq!(questions, vec!["Q1", "Q2"]);
        assert_eq!(quiz.len(), 2);
    }

    #[test]
    fn whisper_transcript_file_needs_only_text() {
        let file: TranscriptFile = serde_json::from_str(r#"{"text": "hello there"}"#).unwrap();
        assert_eq!(file.text, "hello there");
        assert!(file.segments.is_empty());
    }
}
