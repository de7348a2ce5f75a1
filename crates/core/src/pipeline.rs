use serde::Serialize;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::{
    capabilities::Models,
    config::Settings,
    error::{QuizforgeError, Result},
    keypoints::extract_key_points,
    quiz::{join_key_points, parse_quiz},
    types::{KeyPoint, ParsedQuiz, QuizItem, RawQuizText, Transcript},
};

/// Everything one run produced, including the intermediate key points and the
/// authored text the quiz was parsed from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuizOutcome {
    pub key_points: Vec<KeyPoint>,
    #[serde(skip)]
    pub raw_quiz: Option<RawQuizText>,
    pub quiz: ParsedQuiz,
}

impl QuizOutcome {
    pub fn items(&self) -> Vec<QuizItem> {
        self.quiz.items()
    }

    /// True when the transcript gave no key points and the author was never
    /// asked for a quiz.
    pub fn is_starved(&self) -> bool {
        self.key_points.is_empty()
    }
}

/// Transcript to parsed quiz.
///
/// No key points yields an empty outcome without calling the author. An
/// author that returns nothing stops the run with
/// [`QuizforgeError::QuizAuthoringFailed`]; there is no retry.
pub async fn generate_quiz(
    transcript: &Transcript,
    models: &Models,
    settings: &Settings,
) -> Result<QuizOutcome> {
    let span = info_span!("generate_quiz", run_id = %Uuid::new_v4());
    run(transcript, models, settings).instrument(span).await
}

async fn run(transcript: &Transcript, models: &Models, settings: &Settings) -> Result<QuizOutcome> {
    let key_points = extract_key_points(transcript, models, &settings.key_points).await;
    if key_points.is_empty() {
        warn!("no key points extracted, skipping quiz authoring");
        return Ok(QuizOutcome::default());
    }

    let raw = author_quiz(&key_points, models, settings).await?;
    let quiz = parse_quiz(&raw);
    info!(
        key_points = key_points.len(),
        multiple_choice = quiz.multiple_choice.len(),
        true_false = quiz.true_false.len(),
        "quiz generated"
    );

    Ok(QuizOutcome {
        key_points,
        raw_quiz: Some(raw),
        quiz,
    })
}

async fn author_quiz(
    key_points: &[KeyPoint],
    models: &Models,
    settings: &Settings,
) -> Result<RawQuizText> {
    let joined = join_key_points(key_points);
    let authored = models
        .quiz_author
        .author(&joined, settings.quiz.num_mcq, settings.quiz.num_tf)
        .await?;

    match authored {
        Some(raw) if !raw.as_str().trim().is_empty() => Ok(raw),
        _ => Err(QuizforgeError::QuizAuthoringFailed {
            reason: "author returned no quiz text".to_string(),
        }),
    }
}
