mod pdf;
mod style;
#[cfg(test)]
mod tests;

use std::path::Path;

use anyhow::Result;

use crate::model::QuestionRecord;
use crate::normalize::answers_match;
use crate::vocabulary::Vocabulary;

pub use pdf::PdfDocumentBuilder;
pub use style::RenderConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStyle {
    Title,
    QuestionHeading,
    Question,
    AnswersHeading,
    Answer,
    /// An offered option that matches a stated correct answer.
    CorrectOption,
    CorrectHeading,
    CorrectAnswer,
    Unidentified,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub text: String,
    pub style: BlockStyle,
}

impl TextBlock {
    pub fn new(text: impl Into<String>, style: BlockStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// Paginated document target fed by the renderer.
pub trait DocumentSink {
    fn push_block(&mut self, block: &TextBlock);

    fn spacer(&mut self, points: f32);

    fn page_break(&mut self);
}

fn bullet(text: &str) -> String {
    format!("- {text}")
}

/// Lays out one partition: a title, then one page-separated block per question.
///
/// Returns the number of questions written; records with no question text are skipped.
pub fn render_questions<S: DocumentSink>(
    sink: &mut S,
    questions: &[QuestionRecord],
    title: &str,
    vocabulary: &Vocabulary,
    title_spacing: f32,
) -> usize {
    sink.push_block(&TextBlock::new(title, BlockStyle::Title));
    sink.spacer(title_spacing);

    let mut rendered = 0;
    for question in questions {
        if question.question_text.is_empty() {
            continue;
        }
        if rendered > 0 {
            sink.page_break();
        }
        rendered += 1;

        sink.push_block(&TextBlock::new(
            vocabulary.question_header(rendered),
            BlockStyle::QuestionHeading,
        ));
        sink.push_block(&TextBlock::new(
            question.question_text.as_str(),
            BlockStyle::Question,
        ));

        sink.push_block(&TextBlock::new(
            vocabulary.answers_sentinel,
            BlockStyle::AnswersHeading,
        ));
        for answer in &question.all_answers {
            let is_correct = question
                .correct_answers
                .iter()
                .any(|correct| answers_match(correct, answer));
            let style = if is_correct {
                BlockStyle::CorrectOption
            } else {
                BlockStyle::Answer
            };
            sink.push_block(&TextBlock::new(bullet(answer), style));
        }

        if question.correct_answers.is_empty() {
            sink.push_block(&TextBlock::new(
                format!(
                    "{} {}",
                    vocabulary.correct_sentinel, vocabulary.unidentified_marker
                ),
                BlockStyle::Unidentified,
            ));
        } else {
            sink.push_block(&TextBlock::new(
                vocabulary.correct_sentinel,
                BlockStyle::CorrectHeading,
            ));
            for correct in &question.correct_answers {
                sink.push_block(&TextBlock::new(bullet(correct), BlockStyle::CorrectAnswer));
            }
        }
    }

    rendered
}

/// Renders one partition to a PDF at `path`, returning the number of questions written.
pub fn write_pdf(
    path: &Path,
    questions: &[QuestionRecord],
    title: &str,
    vocabulary: &Vocabulary,
    config: &RenderConfig,
) -> Result<usize> {
    let mut builder = PdfDocumentBuilder::new(config.clone(), title);
    let rendered = render_questions(
        &mut builder,
        questions,
        title,
        vocabulary,
        config.title_spacing,
    );
    builder.save(path)?;
    Ok(rendered)
}
