//! Recovers question records from free-form quiz text.
//!
//! Every line is tagged as blank, header, option (`A.`–`D.`), answer
//! (`ANSWER:`) or plain text. Plain text opens a new block and closes the
//! previous one; options and answers attach to the open block. Block
//! boundaries therefore follow content, not blank lines, and section headers
//! may or may not be present.
//!
//! A closed block becomes a record only if it is well formed: a question line,
//! optional option lines, and a final answer line that resolves to one of the
//! captured options or to True/False. Anything else is dropped.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::types::{MultipleChoice, ParsedQuiz, RawQuizText, TrueFalse, Verdict};

static OPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-D]\.\s*(.*)$").expect("valid option regex"));

static ANSWER_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)answer:[\s*(]*([a-d])\b").expect("valid answer regex"));

static VERDICT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(true|false)\b").expect("valid verdict regex"));

static HEADERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // "--- TRUE/FALSE ---" and similar banners
        r"^-{3,}.*-{3,}$",
        // bare rules: "---", "===", "***"
        r"^(?:[-=*_#]\s*){3,}$",
        // "Multiple Choice Questions", "## True/False:", "**True or False Questions**"
        r"(?i)^#*\s*\**\s*(?:multiple[\s-]*choice|true\s*(?:/|or)\s*false)(?:\s+questions?)?\s*:?\s*\**\s*:?$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid header regex"))
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq)]
enum Line<'a> {
    Blank,
    Header,
    Option(&'a str),
    Answer(&'a str),
    Text(&'a str),
}

fn classify(raw: &str) -> Line<'_> {
    let line = raw.trim();
    if line.is_empty() {
        return Line::Blank;
    }
    if HEADERS.iter().any(|re| re.is_match(line)) {
        return Line::Header;
    }
    if let Some(caps) = OPTION.captures(line) {
        return Line::Option(caps.get(1).map_or("", |m| m.as_str().trim()));
    }
    let unbolded = line.trim_start_matches(['*', ' ']);
    if unbolded
        .get(..7)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("answer:"))
    {
        return Line::Answer(line);
    }
    Line::Text(line)
}

/// Lines collected since the last question line.
struct Block<'a> {
    question: &'a str,
    body: Vec<Line<'a>>,
}

enum State<'a> {
    Idle,
    Collecting(Block<'a>),
}

enum Record {
    MultipleChoice(MultipleChoice),
    TrueFalse(TrueFalse),
}

impl<'a> Block<'a> {
    fn new(question: &'a str) -> Self {
        Self {
            question,
            body: Vec::new(),
        }
    }

    fn into_record(self) -> Option<Record> {
        let (last, interior) = self.body.split_last()?;
        let Line::Answer(answer_line) = *last else {
            return None;
        };

        let options: Vec<&str> = interior
            .iter()
            .filter_map(|line| match line {
                Line::Option(text) => Some(*text),
                _ => None,
            })
            .collect();

        if !options.is_empty() {
            let letter = ANSWER_LETTER.captures(answer_line)?[1]
                .to_ascii_uppercase()
                .chars()
                .next()?;
            let index = (letter as u8 - b'A') as usize;
            let answer = options.get(index).filter(|a| !a.is_empty())?;
            return Some(Record::MultipleChoice(MultipleChoice {
                question: self.question.to_string(),
                options: options.iter().map(|o| o.to_string()).collect(),
                answer: answer.to_string(),
            }));
        }

        let verdict = match VERDICT.captures(answer_line)?[1].to_ascii_lowercase().as_str() {
            "true" => Verdict::True,
            _ => Verdict::False,
        };
        Some(Record::TrueFalse(TrueFalse {
            question: self.question.to_string(),
            answer: verdict,
        }))
    }
}

fn close(state: State<'_>, quiz: &mut ParsedQuiz) {
    let State::Collecting(block) = state else {
        return;
    };
    let question = block.question;
    match block.into_record() {
        Some(Record::MultipleChoice(item)) => quiz.multiple_choice.push(item),
        Some(Record::TrueFalse(item)) => quiz.true_false.push(item),
        None => debug!(question, "dropping malformed quiz block"),
    }
}

/// Parse authored quiz text into multiple-choice and true/false records.
/// Never fails; unusable input yields an empty quiz.
pub fn parse_quiz(raw: &RawQuizText) -> ParsedQuiz {
    let text = raw.as_str().replace("\r\n", "\n").replace('\r', "\n");
    let mut quiz = ParsedQuiz::default();
    let mut state = State::Idle;

    for raw_line in text.lines() {
        state = match (classify(raw_line), state) {
            (Line::Blank, state) => state,
            (Line::Header, state) => {
                close(state, &mut quiz);
                State::Idle
            }
            (Line::Text(question), state) => {
                close(state, &mut quiz);
                State::Collecting(Block::new(question))
            }
            (line @ (Line::Option(_) | Line::Answer(_)), State::Collecting(mut block)) => {
                block.body.push(line);
                State::Collecting(block)
            }
            (line, State::Idle) => {
                debug!(?line, "option or answer outside any question");
                State::Idle
            }
        };
    }
    close(state, &mut quiz);

    debug!(
        multiple_choice = quiz.multiple_choice.len(),
        true_false = quiz.true_false.len(),
        "parsed quiz"
    );
    quiz
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ParsedQuiz {
        parse_quiz(&RawQuizText::new(text))
    }

    const MCQ: &str = "\
What carries sediment downstream?
A. Wind
B. Rivers
C. Glaciers
D. Tides
ANSWER: B

Which gas do plants absorb?
A. Oxygen
B. Nitrogen
C. Carbon dioxide
D. Helium
ANSWER: C

What is the largest planet?
A. Jupiter
B. Saturn
C. Earth
D. Mars
ANSWER: A
";

    const TF: &str = "\
The Sun is a star.
ANSWER: True

Granite is a liquid at room temperature.
ANSWER: False
";

    #[test]
    fn well_formed_sections_parse_completely() {
        let quiz = parse(&format!("{MCQ}\n--- TRUE/FALSE ---\n\n{TF}"));

        assert_eq!(quiz.multiple_choice.len(), 3);
        assert_eq!(quiz.true_false.len(), 2);

        let answers: Vec<_> = quiz.multiple_choice.iter().map(|q| q.answer.as_str()).collect();
        assert_eq!(answers, vec!["Rivers", "Carbon dioxide", "Jupiter"]);
        assert!(quiz.multiple_choice.iter().all(|q| q.options.len() == 4));
        assert_eq!(quiz.multiple_choice[0].question, "What carries sediment downstream?");

        assert_eq!(quiz.true_false[0].answer, Verdict::True);
        assert_eq!(quiz.true_false[1].answer, Verdict::False);
    }

    #[test]
    fn headers_do_not_change_the_result() {
        let bare = parse(&format!("{MCQ}\n{TF}"));
        let with_headers = parse(&format!(
            "Multiple Choice Questions\n\n{MCQ}\n--- TRUE/FALSE ---\n{TF}"
        ));
        let markdown = parse(&format!("## Multiple Choice:\n{MCQ}\n**True/False Questions**\n{TF}"));

        assert_eq!(bare, with_headers);
        assert_eq!(bare, markdown);
        assert_eq!(bare.len(), 5);
    }

    #[test]
    fn blocks_need_no_blank_line_separators() {
        let quiz = parse(
            "What carries sediment?\nA. Wind\nB. Rivers\nANSWER: B\nThe Moon orbits Earth.\nANSWER: true",
        );
        assert_eq!(quiz.multiple_choice.len(), 1);
        assert_eq!(quiz.multiple_choice[0].answer, "Rivers");
        assert_eq!(quiz.true_false.len(), 1);
        assert_eq!(quiz.true_false[0].answer, Verdict::True);
    }

    #[test]
    fn out_of_range_answer_letter_drops_the_block() {
        let quiz = parse("Pick one.\nA. First\nB. Second\nANSWER: D\n\nThe sky is blue.\nANSWER: True");
        assert!(quiz.multiple_choice.is_empty());
        assert_eq!(quiz.true_false.len(), 1);
    }

    #[test]
    fn option_count_need_not_be_four() {
        let quiz = parse("Pick one.\nA. First\nB. Second\nC. Third\nANSWER: C");
        assert_eq!(quiz.multiple_choice.len(), 1);
        assert_eq!(quiz.multiple_choice[0].options, vec!["First", "Second", "Third"]);
        assert_eq!(quiz.multiple_choice[0].answer, "Third");
    }

    #[test]
    fn malformed_blocks_are_dropped_silently() {
        let quiz = parse(
            "ANSWER: True\n\n\
             Question without answer\nA. x\nB. y\n\n\
             Answer without letter\nA. x\nB. y\nANSWER: maybe\n\n\
             Statement with no verdict\nANSWER: unsure\n\n\
             Lonely question line",
        );
        assert!(quiz.is_empty());
    }

    #[test]
    fn empty_and_whitespace_input_yield_empty_quiz() {
        assert!(parse("").is_empty());
        assert!(parse("   \n\t\r\n  ").is_empty());
    }

    #[test]
    fn windows_line_endings_and_loose_answer_formats() {
        let quiz = parse("Which is a mammal?\r\nA. Shark\r\nB. Dolphin\r\n**ANSWER:** (b)\r\n");
        assert_eq!(quiz.multiple_choice.len(), 1);
        assert_eq!(quiz.multiple_choice[0].answer, "Dolphin");
    }

    #[test]
    fn leading_chatter_is_not_a_question() {
        let quiz = parse("Here is your quiz:\nThe Earth is flat.\nANSWER: False");
        assert_eq!(quiz.true_false.len(), 1);
        assert_eq!(quiz.true_false[0].question, "The Earth is flat.");
    }

    #[test]
    fn line_classification() {
        assert_eq!(classify("  "), Line::Blank);
        assert_eq!(classify("--- TRUE/FALSE ---"), Line::Header);
        assert_eq!(classify("B. Rivers"), Line::Option("Rivers"));
        assert_eq!(classify("answer: c"), Line::Answer("answer: c"));
        assert_eq!(classify("E. Not an option"), Line::Text("E. Not an option"));
        assert_eq!(
            classify("True or false: whales are fish."),
            Line::Text("True or false: whales are fish.")
        );
    }
}
