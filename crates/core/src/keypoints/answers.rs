use tracing::debug;

use crate::{
    capabilities::{AnswerExtractor, GenerationParams, TextGenerator},
    config::KeyPointConfig,
    text::word_count,
    types::QaResult,
};

const FACT_PARAMS: GenerationParams = GenerationParams {
    max_length: 120,
    num_beams: 3,
    num_return_sequences: 1,
    temperature: Some(0.3),
};

pub fn fact_prompt(question: &str, answer: &str) -> String {
    format!(
        "Create a clear, factual statement based on this information:\n\
         Question: {question}\n\
         Answer: {answer}\n\n\
         Factual statement:"
    )
}

/// Answer `question` from `context`, keeping only confident answers of more
/// than `min_answer_words` words. Extraction errors count as no answer.
pub async fn extract_answer(
    extractor: &dyn AnswerExtractor,
    question: &str,
    context: &str,
    config: &KeyPointConfig,
) -> Option<QaResult> {
    let answer = match extractor.answer(question, context).await {
        Ok(answer) => answer,
        Err(e) => {
            debug!(question, error = %e, "answer extraction failed, skipping");
            return None;
        }
    };

    let answer_text = answer.answer.trim();
    if answer.score <= config.min_answer_confidence
        || word_count(answer_text) <= config.min_answer_words
    {
        debug!(question, score = answer.score, answer = answer_text, "answer rejected");
        return None;
    }

    Some(QaResult {
        question: question.to_string(),
        answer: answer_text.to_string(),
        confidence: answer.score,
    })
}

/// Rewrite a question/answer pair as one declarative statement.
pub async fn synthesize_fact(
    synthesizer: &dyn TextGenerator,
    qa: &QaResult,
    config: &KeyPointConfig,
) -> Option<String> {
    let prompt = fact_prompt(&qa.question, &qa.answer);
    let outputs = match synthesizer.generate(&prompt, &FACT_PARAMS).await {
        Ok(outputs) => outputs,
        Err(e) => {
            debug!(question = %qa.question, error = %e, "fact synthesis failed, skipping");
            return None;
        }
    };

    let fact = outputs.first()?.trim().trim_end_matches('?').trim_end();
    if fact.chars().count() <= config.min_fact_chars {
        debug!(question = %qa.question, fact, "synthesized fact too short");
        return None;
    }
    Some(fact.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{
        Answer,
        scripted::{ScriptedAnswerer, ScriptedGenerator, scripted_failure},
    };

    fn config() -> KeyPointConfig {
        KeyPointConfig::default()
    }

    fn qa() -> QaResult {
        QaResult {
            question: "What do rivers carry?".to_string(),
            answer: "sediment and silt downstream".to_string(),
            confidence: 0.9,
        }
    }

    #[tokio::test]
    async fn confident_multi_word_answers_are_accepted() {
        let extractor = ScriptedAnswerer::new(|_, _| {
            Ok(Answer {
                answer: " sediment and silt ".to_string(),
                score: 0.8,
            })
        });
        let qa = extract_answer(&extractor, "What do rivers carry?", "ctx", &config())
            .await
            .unwrap();
        assert_eq!(qa.answer, "sediment and silt");
        assert_eq!(qa.confidence, 0.8);
    }

    #[tokio::test]
    async fn low_confidence_short_or_failed_answers_are_dropped() {
        let cases = [(0.55, "three words here"), (0.9, "two words")];
        for (score, text) in cases {
            let extractor = ScriptedAnswerer::new(move |_, _| {
                Ok(Answer {
                    answer: text.to_string(),
                    score,
                })
            });
            assert!(extract_answer(&extractor, "q", "ctx", &config()).await.is_none());
        }

        let failing = ScriptedAnswerer::new(|_, _| Err(scripted_failure("boom")));
        assert!(extract_answer(&failing, "q", "ctx", &config()).await.is_none());
        assert_eq!(failing.calls(), 1);
    }

    #[tokio::test]
    async fn facts_lose_trailing_question_marks() {
        let synthesizer =
            ScriptedGenerator::new(|_| Ok(vec!["Rivers carry sediment and silt downstream? ".to_string()]));
        let fact = synthesize_fact(&synthesizer, &qa(), &config()).await.unwrap();

        assert_eq!(fact, "Rivers carry sediment and silt downstream");
        let (prompt, params) = &synthesizer.prompts()[0];
        assert!(prompt.contains("Question: What do rivers carry?"));
        assert!(prompt.contains("Answer: sediment and silt downstream"));
        assert_eq!(params.temperature, Some(0.3));
        assert_eq!(params.max_length, 120);
    }

    #[tokio::test]
    async fn short_empty_or_failed_facts_are_dropped() {
        let short = ScriptedGenerator::new(|_| Ok(vec!["Rivers flow.".to_string()]));
        assert!(synthesize_fact(&short, &qa(), &config()).await.is_none());

        let empty = ScriptedGenerator::new(|_| Ok(Vec::new()));
        assert!(synthesize_fact(&empty, &qa(), &config()).await.is_none());

        let failing = ScriptedGenerator::new(|_| Err(scripted_failure("timeout")));
        assert!(synthesize_fact(&failing, &qa(), &config()).await.is_none());
    }
}
