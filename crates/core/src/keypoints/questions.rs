use std::collections::HashSet;

use tracing::debug;

use crate::{
    capabilities::{GenerationParams, TextGenerator},
    config::KeyPointConfig,
    text::word_count,
    types::{CandidateQuestion, Keyphrase, PrioritizedQuestion, RankedSentence},
};

const SENTENCE_PARAMS: GenerationParams = GenerationParams {
    max_length: 64,
    num_beams: 5,
    num_return_sequences: 2,
    temperature: None,
};

const KEYPHRASE_PARAMS: GenerationParams = GenerationParams {
    max_length: 64,
    num_beams: 3,
    num_return_sequences: 1,
    temperature: None,
};

/// Ask the question generator about the top sentences and keyphrases.
///
/// A failed call only loses the questions for that sentence or phrase.
/// Duplicates are kept; [`prioritize_questions`] removes them.
pub async fn generate_questions(
    generator: &dyn TextGenerator,
    sentences: &[RankedSentence],
    keyphrases: &[Keyphrase],
    config: &KeyPointConfig,
) -> Vec<CandidateQuestion> {
    let mut questions = Vec::new();

    let sentence_prompts = sentences
        .iter()
        .take(config.question_sentences)
        .filter(|s| word_count(&s.text) > config.min_question_sentence_words)
        .map(|s| (format!("generate question: {}", s.text), &SENTENCE_PARAMS));

    let phrase_prompts = keyphrases
        .iter()
        .take(config.question_keyphrases)
        .filter(|k| k.relevance > config.min_keyphrase_relevance)
        .map(|k| (format!("generate question about {}", k.phrase), &KEYPHRASE_PARAMS));

    for (prompt, params) in sentence_prompts.chain(phrase_prompts) {
        match generator.generate(&prompt, params).await {
            Ok(outputs) => questions.extend(
                outputs
                    .iter()
                    .map(|q| q.trim())
                    .filter(|q| !q.is_empty())
                    .map(|q| CandidateQuestion {
                        text: q.to_string(),
                    }),
            ),
            Err(e) => debug!(%prompt, error = %e, "question generation failed, skipping"),
        }
    }

    questions
}

/// Deduplicate questions and order them by the summed relevance of the
/// keyphrases they mention (case-insensitive substring match). Ties keep the
/// order the questions were generated in.
pub fn prioritize_questions(
    candidates: &[CandidateQuestion],
    keyphrases: &[Keyphrase],
    limit: usize,
) -> Vec<PrioritizedQuestion> {
    let lowered: Vec<(String, f32)> = keyphrases
        .iter()
        .map(|k| (k.phrase.to_lowercase(), k.relevance))
        .collect();

    let mut seen = HashSet::new();
    let mut prioritized: Vec<PrioritizedQuestion> = candidates
        .iter()
        .filter(|c| seen.insert(c.text.as_str()))
        .map(|c| {
            let question = c.text.to_lowercase();
            let priority = lowered
                .iter()
                .filter(|(phrase, _)| question.contains(phrase.as_str()))
                .map(|(_, relevance)| relevance)
                .sum();
            PrioritizedQuestion {
                text: c.text.clone(),
                priority,
            }
        })
        .collect();

    prioritized.sort_by(|a, b| b.priority.total_cmp(&a.priority));
    prioritized.truncate(limit);
    prioritized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::scripted::{ScriptedGenerator, scripted_failure};

    fn question(text: &str) -> CandidateQuestion {
        CandidateQuestion {
            text: text.to_string(),
        }
    }

    fn sentence(text: &str) -> RankedSentence {
        RankedSentence {
            text: text.to_string(),
            score: 1.0,
        }
    }

    #[test]
    fn priority_sums_matching_keyphrases() {
        let keyphrases = vec![
            Keyphrase::new("photosynthesis", 0.6),
            Keyphrase::new("Light", 0.3),
            Keyphrase::new("volcano", 0.9),
        ];
        let ranked = prioritize_questions(
            &[
                question("What erupts?"),
                question("How does light drive photosynthesis?"),
                question("Where does photosynthesis happen?"),
            ],
            &keyphrases,
            30,
        );

        assert_eq!(ranked[0].text, "How does light drive photosynthesis?");
        assert!((ranked[0].priority - 0.9).abs() < 1e-6);
        assert_eq!(ranked[1].text, "Where does photosynthesis happen?");
        assert_eq!(ranked[2].priority, 0.0);
    }

    #[test]
    fn exact_duplicates_collapse_and_ties_keep_order() {
        let ranked = prioritize_questions(
            &[question("B?"), question("A?"), question("B?"), question("C?")],
            &[],
            30,
        );
        let texts: Vec<_> = ranked.iter().map(|q| q.text.as_str()).collect();
        assert_eq!(texts, vec!["B?", "A?", "C?"]);
    }

    #[test]
    fn prioritized_list_is_capped() {
        let candidates: Vec<_> = (0..40).map(|i| question(&format!("Q{i}?"))).collect();
        assert_eq!(prioritize_questions(&candidates, &[], 30).len(), 30);
    }

    #[tokio::test]
    async fn generation_skips_failures_and_weak_inputs() {
        let generator = ScriptedGenerator::new(|prompt: &str| {
            if prompt.contains("glaciers") {
                Err(scripted_failure("model overloaded"))
            } else if prompt.starts_with("generate question about") {
                Ok(vec![" What is a moraine? ".to_string()])
            } else {
                Ok(vec![
                    "What do rivers carry?".to_string(),
                    "Where do rivers deposit silt?".to_string(),
                ])
            }
        });

        let sentences = vec![
            sentence("Rivers carry sediment downstream and deposit silt where the current slows down."),
            sentence("Too short to ask about."),
            sentence("Massive glaciers carve deep valleys through solid granite over many thousands of years."),
        ];
        let keyphrases = vec![Keyphrase::new("moraine", 0.5), Keyphrase::new("rock", 0.1)];

        let questions =
            generate_questions(&generator, &sentences, &keyphrases, &KeyPointConfig::default()).await;

        let texts: Vec<_> = questions.iter().map(|q| q.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["What do rivers carry?", "Where do rivers deposit silt?", "What is a moraine?"]
        );
        // rivers, glaciers, moraine; the short sentence and weak phrase are never sent
        assert_eq!(generator.calls(), 3);
        assert_eq!(generator.prompts()[0].1.num_return_sequences, 2);
        assert_eq!(generator.prompts()[2].0, "generate question about moraine");
    }
}
