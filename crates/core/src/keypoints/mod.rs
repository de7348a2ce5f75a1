//! Key-point distillation: turns a long transcript into a short list of
//! standalone factual statements.
//!
//! Stages run strictly in order: rank sentences, extract keyphrases, generate
//! and prioritize questions, then for each question extract an answer,
//! synthesize a fact and pass it through the novelty filter. If that leaves
//! the list short, top-ranked sentences pad it.

pub mod answers;
pub mod novelty;
pub mod questions;
pub mod ranker;

use tracing::{debug, info, warn};

use crate::{
    capabilities::Models,
    config::KeyPointConfig,
    text::{normalize_whitespace, word_count},
    types::{KeyPoint, KeyPointOrigin, Transcript},
};

pub use answers::{extract_answer, fact_prompt, synthesize_fact};
pub use novelty::{Admission, NoveltyFilter};
pub use questions::{generate_questions, prioritize_questions};
pub use ranker::rank_sentences;

/// Distill up to `config.target` key points from `transcript`.
///
/// Never fails: model errors are absorbed per item. An empty result means the
/// source gave nothing usable.
pub async fn extract_key_points(
    transcript: &Transcript,
    models: &Models,
    config: &KeyPointConfig,
) -> Vec<KeyPoint> {
    let cleaned = normalize_whitespace(transcript.as_str());
    if cleaned.is_empty() || config.target == 0 {
        return Vec::new();
    }

    let sentences = rank_sentences(&cleaned, config);
    let keyphrases = match models.keyphrases.extract(&cleaned, config.max_keyphrases).await {
        Ok(keyphrases) => keyphrases,
        Err(e) => {
            warn!(error = %e, "keyphrase extraction failed, continuing without keyphrases");
            Vec::new()
        }
    };
    info!(
        sentences = sentences.len(),
        keyphrases = keyphrases.len(),
        "ranked transcript"
    );

    let candidates = generate_questions(
        models.question_generator.as_ref(),
        &sentences,
        &keyphrases,
        config,
    )
    .await;
    let prioritized = prioritize_questions(&candidates, &keyphrases, config.max_questions);
    info!(
        generated = candidates.len(),
        prioritized = prioritized.len(),
        "generated questions"
    );

    let mut filter = NoveltyFilter::new(models.embedder.as_ref(), config.similarity_threshold);

    for question in &prioritized {
        if filter.len() >= config.target {
            break;
        }
        let Some(qa) = extract_answer(
            models.answer_extractor.as_ref(),
            &question.text,
            &cleaned,
            config,
        )
        .await
        else {
            continue;
        };
        let Some(fact) = synthesize_fact(models.fact_synthesizer.as_ref(), &qa, config).await else {
            continue;
        };
        let verdict = filter.admit(fact, KeyPointOrigin::Synthesized).await;
        debug!(question = %question.text, ?verdict, "fact candidate");
    }

    let synthesized = filter.len();
    if synthesized < config.target {
        for sentence in &sentences {
            if filter.len() >= config.target {
                break;
            }
            if word_count(&sentence.text) <= config.min_padding_words || filter.contains(&sentence.text) {
                continue;
            }
            filter.admit(sentence.text.clone(), KeyPointOrigin::Sentence).await;
        }
    }

    let mut key_points = filter.into_key_points();
    key_points.truncate(config.target);
    info!(
        synthesized,
        padded = key_points.len() - synthesized.min(key_points.len()),
        "collected key points"
    );
    key_points
}
