//! Quiz authoring prompt and the parser that recovers structure from the
//! authored text.

pub mod parser;

use crate::types::KeyPoint;

pub use parser::parse_quiz;

/// Key points as the bullet list handed to the quiz author.
pub fn join_key_points(key_points: &[KeyPoint]) -> String {
    key_points
        .iter()
        .map(|k| format!("- {}", k.text))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn quiz_prompt(key_points: &str, num_mcq: usize, num_tf: usize) -> String {
    format!(
        r#"You are an expert quiz creator. Based on the key points provided, generate a quiz.

**Formatting Rules:**
1. Generate exactly {num_mcq} multiple-choice questions with four options (A, B, C, D) each.
2. Put the question on its own line, then each option on its own line starting with "A.", "B.", "C." or "D.".
3. The final line for each multiple-choice question must be "ANSWER: <Letter>".
4. Next, create a second section with the exact header "--- TRUE/FALSE ---".
5. Under this header, generate exactly {num_tf} True/False questions.
6. The final line for each True/False question must be "ANSWER: True" or "ANSWER: False".
7. Do not add any other text, introductions, or conclusions.

**KEY POINTS TO USE FOR THE QUIZ:**
---
{key_points}
---
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KeyPointOrigin;

    #[test]
    fn key_points_become_bullets() {
        let points = vec![
            KeyPoint {
                text: "Rivers carry silt".to_string(),
                origin: KeyPointOrigin::Synthesized,
            },
            KeyPoint {
                text: "Glaciers carve valleys".to_string(),
                origin: KeyPointOrigin::Sentence,
            },
        ];
        assert_eq!(join_key_points(&points), "- Rivers carry silt\n- Glaciers carve valleys");
    }

    #[test]
    fn prompt_carries_counts_and_points() {
        let prompt = quiz_prompt("- Rivers carry silt", 7, 2);
        assert!(prompt.contains("exactly 7 multiple-choice"));
        assert!(prompt.contains("exactly 2 True/False"));
        assert!(prompt.contains("--- TRUE/FALSE ---"));
        assert!(prompt.contains("- Rivers carry silt"));
    }
}
