use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use super::pdf_text::is_page_marker;
use crate::model::QuestionRecord;
use crate::normalize::collapse_whitespace;
use crate::vocabulary::Vocabulary;

/// Recovers question records from the flattened text of a rendered quiz document.
pub trait TextRecordExtractor {
    fn name(&self) -> &'static str;

    fn extract(&self, text: &str) -> Vec<QuestionRecord>;
}

fn question_sentinel_pattern(vocabulary: &Vocabulary) -> String {
    format!(r"{}(?:[ \t]+\d+)?:", regex::escape(vocabulary.question_label))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanMode {
    Outside,
    Question,
    Answers,
    CorrectAnswer,
}

#[derive(Debug, Default)]
struct PendingRecord {
    question_text: String,
    all_answers: Vec<String>,
    correct_answers: Vec<String>,
    identified: bool,
}

impl PendingRecord {
    fn push_question_line(&mut self, line: &str) {
        if !self.question_text.is_empty() {
            self.question_text.push(' ');
        }
        self.question_text.push_str(line);
    }

    fn finish(self) -> Option<QuestionRecord> {
        let record = QuestionRecord::new(
            &self.question_text,
            self.all_answers,
            self.correct_answers,
            self.identified,
        );
        if record.is_blank() { None } else { Some(record) }
    }
}

/// Line-by-line state machine over sentinel lines.
#[derive(Debug)]
pub struct SentinelScanner {
    vocabulary: Vocabulary,
    question_line: Regex,
}

impl SentinelScanner {
    pub fn new(vocabulary: Vocabulary) -> Result<Self> {
        let pattern = format!(
            r"^{}\s*(?P<rest>.*)$",
            question_sentinel_pattern(&vocabulary)
        );
        Ok(Self {
            vocabulary,
            question_line: Regex::new(&pattern)
                .context("failed to compile question sentinel regex")?,
        })
    }
}

impl TextRecordExtractor for SentinelScanner {
    fn name(&self) -> &'static str {
        "scan"
    }

    fn extract(&self, text: &str) -> Vec<QuestionRecord> {
        let vocabulary = &self.vocabulary;
        let mut records = Vec::new();
        let mut pending: Option<PendingRecord> = None;
        let mut mode = ScanMode::Outside;

        for raw_line in text.lines() {
            let line = raw_line.trim();
            if is_page_marker(line) {
                continue;
            }

            if let Some(captures) = self.question_line.captures(line) {
                if let Some(previous) = pending.take() {
                    records.extend(previous.finish());
                }

                let mut record = PendingRecord::default();
                let rest = captures
                    .name("rest")
                    .map(|value| value.as_str().trim())
                    .unwrap_or_default();
                if !rest.is_empty() {
                    record.push_question_line(rest);
                }
                pending = Some(record);
                mode = ScanMode::Question;
                continue;
            }

            let Some(record) = pending.as_mut() else {
                continue;
            };

            if line.starts_with(vocabulary.answers_sentinel) {
                mode = ScanMode::Answers;
                continue;
            }

            if let Some(rest) = line.strip_prefix(vocabulary.correct_sentinel) {
                mode = ScanMode::CorrectAnswer;
                record.identified = !rest.contains(vocabulary.unidentified_marker);
                let remainder = rest.trim();
                if record.identified && !remainder.is_empty() && !remainder.starts_with('(') {
                    let answer = remainder.strip_prefix('-').unwrap_or(remainder).trim();
                    if !answer.is_empty() {
                        record.correct_answers.push(answer.to_string());
                    }
                }
                continue;
            }

            match mode {
                ScanMode::Question => {
                    if !line.is_empty() {
                        record.push_question_line(line);
                    }
                }
                ScanMode::Answers => push_list_line(&mut record.all_answers, line),
                ScanMode::CorrectAnswer => {
                    if line.contains(vocabulary.unidentified_marker) {
                        record.identified = false;
                        record.correct_answers.clear();
                    } else if record.identified {
                        push_list_line(&mut record.correct_answers, line);
                    }
                }
                ScanMode::Outside => {}
            }
        }

        if let Some(last) = pending.take() {
            records.extend(last.finish());
        }

        records
    }
}

/// Bullet lines open a new item; other non-empty lines continue the last one.
fn push_list_line(items: &mut Vec<String>, line: &str) {
    if line.is_empty() {
        return;
    }

    if let Some(body) = line.strip_prefix('-') {
        let body = body.trim();
        if !body.is_empty() {
            items.push(body.to_string());
        }
        return;
    }

    match items.last_mut() {
        Some(last) => {
            last.push(' ');
            last.push_str(line);
        }
        None => debug!(line = %line, "dropping text before the first bullet"),
    }
}

/// Splits the whole text at question sentinels and matches each segment with one pattern.
#[derive(Debug)]
pub struct PatternExtractor {
    vocabulary: Vocabulary,
    question_sentinel: Regex,
    record_body: Regex,
    bullet: Regex,
    bullet_after_break: Regex,
    inline_bullet: Regex,
}

impl PatternExtractor {
    pub fn new(vocabulary: Vocabulary) -> Result<Self> {
        let question_sentinel = format!(
            r"(?m)^[ \t]*{}",
            question_sentinel_pattern(&vocabulary)
        );
        let record_body = format!(
            r"(?s)^(?P<question>.*?)(?:{}(?P<answers>.*?))?(?:{}(?P<correct>.*))?$",
            regex::escape(vocabulary.answers_sentinel),
            regex::escape(vocabulary.correct_sentinel),
        );

        Ok(Self {
            vocabulary,
            question_sentinel: Regex::new(&question_sentinel)
                .context("failed to compile question sentinel regex")?,
            record_body: Regex::new(&record_body).context("failed to compile record body regex")?,
            bullet: Regex::new(r"(?m)^[ \t]*-[ \t]*").context("failed to compile bullet regex")?,
            bullet_after_break: Regex::new(r"\n[ \t]*-")
                .context("failed to compile bullet line regex")?,
            inline_bullet: Regex::new(r"(?:^|\s)-(?:\s+|$)")
                .context("failed to compile inline bullet regex")?,
        })
    }

    fn parse_segment(&self, segment: &str) -> Option<QuestionRecord> {
        let captures = self.record_body.captures(segment)?;

        let question = captures
            .name("question")
            .map(|value| collapse_whitespace(&strip_page_markers(value.as_str())))
            .unwrap_or_default();

        let all_answers = captures
            .name("answers")
            .map(|value| self.bullet_items(&strip_page_markers(value.as_str())))
            .unwrap_or_default();

        let (identified, correct_answers) = match captures.name("correct") {
            Some(value) => self.parse_correct_group(&truncate_at_page_marker(value.as_str())),
            None => (false, Vec::new()),
        };

        let record = QuestionRecord::new(&question, all_answers, correct_answers, identified);
        if record.is_blank() { None } else { Some(record) }
    }

    fn parse_correct_group(&self, group: &str) -> (bool, Vec<String>) {
        if group.contains(self.vocabulary.unidentified_marker) {
            return (false, Vec::new());
        }

        let items = self.bullet_items(group);
        if !items.is_empty() {
            return (true, items);
        }

        let prose = collapse_whitespace(group);
        if prose.is_empty() || prose.starts_with('(') {
            (true, Vec::new())
        } else {
            (true, vec![prose])
        }
    }

    /// Options are split at line-leading dashes when a dash opens any line after a break;
    /// otherwise at free-standing dashes, so text whose line breaks were lost still separates.
    fn bullet_items(&self, group: &str) -> Vec<String> {
        let bullet = if self.bullet_after_break.is_match(group) {
            &self.bullet
        } else if self.inline_bullet.is_match(group) {
            &self.inline_bullet
        } else {
            return Vec::new();
        };

        bullet
            .split(group)
            .skip(1)
            .map(collapse_whitespace)
            .filter(|item| !item.is_empty())
            .collect()
    }
}

impl TextRecordExtractor for PatternExtractor {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn extract(&self, text: &str) -> Vec<QuestionRecord> {
        let sentinels = self.question_sentinel.find_iter(text).collect::<Vec<_>>();

        sentinels
            .iter()
            .enumerate()
            .filter_map(|(index, sentinel)| {
                let end = sentinels
                    .get(index + 1)
                    .map(|next| next.start())
                    .unwrap_or(text.len());
                self.parse_segment(&text[sentinel.end()..end])
            })
            .collect()
    }
}

fn strip_page_markers(group: &str) -> String {
    group
        .lines()
        .filter(|line| !is_page_marker(line))
        .collect::<Vec<&str>>()
        .join("\n")
}

fn truncate_at_page_marker(group: &str) -> String {
    group
        .lines()
        .take_while(|line| !is_page_marker(line))
        .collect::<Vec<&str>>()
        .join("\n")
}
