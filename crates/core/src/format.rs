use crate::{
    pipeline::QuizOutcome,
    types::{KeyPoint, KeyPointOrigin, ParsedQuiz},
};

/// Options are lettered A-D as requested from the author; anything past the
/// fourth falls back to its 1-based position.
fn option_label(index: usize) -> String {
    match index {
        0..=3 => char::from(b'A' + index as u8).to_string(),
        _ => (index + 1).to_string(),
    }
}

pub fn format_key_points(key_points: &[KeyPoint]) -> String {
    let mut output = String::new();
    for point in key_points {
        let marker = match point.origin {
            KeyPointOrigin::Synthesized => "•",
            KeyPointOrigin::Sentence => "◦",
        };
        output.push_str(&format!("{} {}\n", marker, point.text));
    }
    output
}

pub fn format_parsed_quiz(quiz: &ParsedQuiz) -> String {
    let mut output = String::new();

    if !quiz.multiple_choice.is_empty() {
        output.push_str("## Multiple choice\n\n");
        for (n, item) in quiz.multiple_choice.iter().enumerate() {
            output.push_str(&format!("{}. {}\n", n + 1, item.question));
            for (i, option) in item.options.iter().enumerate() {
                let mark = if *option == item.answer { "**" } else { "" };
                output.push_str(&format!("   {}. {mark}{option}{mark}\n", option_label(i)));
            }
            output.push('\n');
        }
    }

    if !quiz.true_false.is_empty() {
        output.push_str("## True / False\n\n");
        for (n, item) in quiz.true_false.iter().enumerate() {
            output.push_str(&format!("{}. {} **{}**\n", n + 1, item.question, item.answer));
        }
        output.push('\n');
    }

    output
}

pub fn format_quiz_readable(outcome: &QuizOutcome) -> String {
    let mut output = String::new();
    output.push_str("# Quiz\n\n");
    output.push_str(&format!(
        "**Key points:** {} | **Multiple choice:** {} | **True/False:** {}\n\n",
        outcome.key_points.len(),
        outcome.quiz.multiple_choice.len(),
        outcome.quiz.true_false.len()
    ));

    output.push_str("## Key points\n\n");
    output.push_str(&format_key_points(&outcome.key_points));
    output.push('\n');

    output.push_str(&format_parsed_quiz(&outcome.quiz));
    output
}
