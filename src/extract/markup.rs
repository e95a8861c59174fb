use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use regex::{Regex, RegexBuilder};
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, warn};

use crate::model::QuestionRecord;
use crate::normalize::{answers_match, collapse_whitespace};
use crate::vocabulary::Vocabulary;

/// Pulls question records out of a quiz review page.
#[derive(Debug)]
pub struct MarkupExtractor {
    vocabulary: Vocabulary,
    question_block: Selector,
    question_text: Selector,
    question_decorations: Vec<Selector>,
    answer_block: Selector,
    option_candidate: Selector,
    option_label: Selector,
    option_excluded: Vec<Selector>,
    check_icon: Selector,
    option_feedback: Selector,
    outcome_block: Selector,
    outcome_sources: Selector,
    option_row_class: Regex,
    boilerplate: Regex,
}

impl MarkupExtractor {
    pub fn new(vocabulary: Vocabulary) -> Result<Self> {
        let alternation = vocabulary
            .boilerplate_phrases
            .iter()
            .map(|phrase| regex::escape(phrase))
            .collect::<Vec<String>>()
            .join("|");

        Ok(Self {
            vocabulary,
            question_block: selector("div.que")?,
            question_text: selector("div.qtext")?,
            question_decorations: vec![selector("div.questionflag")?, selector("p.grade")?],
            answer_block: selector("div.answer")?,
            option_candidate: selector("div")?,
            option_label: selector("div.d-flex")?,
            option_excluded: vec![selector("span.answernumber")?, selector("div.feedback")?],
            check_icon: selector("i.fa-check")?,
            option_feedback: selector("div.feedback")?,
            outcome_block: selector("div.outcome")?,
            outcome_sources: selector("span.correct, div.feedback, div.rightanswer")?,
            option_row_class: Regex::new(r"^r[01]")
                .context("failed to compile option row class regex")?,
            boilerplate: RegexBuilder::new(&alternation)
                .case_insensitive(true)
                .build()
                .context("failed to compile boilerplate phrase regex")?,
        })
    }

    pub fn extract_file(&self, path: &Path) -> Result<Vec<QuestionRecord>> {
        let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let html = String::from_utf8_lossy(&raw);
        Ok(self.extract_document(&html, &path.display().to_string()))
    }

    pub fn extract_document(&self, html: &str, source: &str) -> Vec<QuestionRecord> {
        let document = Html::parse_document(html);
        let blocks = document
            .select(&self.question_block)
            .collect::<Vec<ElementRef<'_>>>();

        if blocks.is_empty() {
            warn!(source = %source, "no question blocks found");
            return Vec::new();
        }

        let records = blocks
            .into_iter()
            .map(|block| self.extract_question(block))
            .collect::<Vec<QuestionRecord>>();
        debug!(source = %source, records = records.len(), "extracted markup records");
        records
    }

    fn extract_question(&self, block: ElementRef<'_>) -> QuestionRecord {
        let question_text = block
            .select(&self.question_text)
            .next()
            .map(|node| flatten_text(node, &self.question_decorations))
            .unwrap_or_default();

        let mut all_answers = Vec::<String>::new();
        let mut correct_answers = Vec::<String>::new();

        if let Some(answer_block) = block.select(&self.answer_block).next() {
            let options = answer_block
                .select(&self.option_candidate)
                .filter(|candidate| self.is_option_row(*candidate));

            for option in options {
                let text = self.option_text(option);
                if text.is_empty() {
                    continue;
                }
                if self.option_marked_correct(option) {
                    correct_answers.push(text.clone());
                }
                all_answers.push(text);
            }
        }

        if let Some(outcome) = block.select(&self.outcome_block).next() {
            for stated in self.stated_correct_answers(outcome) {
                let matched = all_answers
                    .iter()
                    .find(|option| answers_match(&stated, option))
                    .cloned();
                correct_answers.push(matched.unwrap_or(stated));
            }
        }

        let identified = !correct_answers.is_empty();
        QuestionRecord::new(&question_text, all_answers, correct_answers, identified)
    }

    fn is_option_row(&self, element: ElementRef<'_>) -> bool {
        element
            .value()
            .classes()
            .any(|class| self.option_row_class.is_match(class))
    }

    fn option_text(&self, option: ElementRef<'_>) -> String {
        let label = option.select(&self.option_label).next().unwrap_or(option);
        self.strip_boilerplate(&flatten_text(label, &self.option_excluded))
    }

    fn option_marked_correct(&self, option: ElementRef<'_>) -> bool {
        if option.value().classes().any(|class| class == "correct") {
            return true;
        }
        if option.select(&self.check_icon).next().is_some() {
            return true;
        }

        option.select(&self.option_feedback).any(|feedback| {
            let text = flatten_text(feedback, &[]);
            self.vocabulary
                .affirming_phrases
                .iter()
                .any(|phrase| text.contains(phrase))
        })
    }

    fn stated_correct_answers(&self, outcome: ElementRef<'_>) -> Vec<String> {
        let trigger = self.vocabulary.correct_answer_trigger;
        let mut stated = Vec::<String>::new();

        for source in outcome.select(&self.outcome_sources) {
            let text = flatten_text(source, &[]);
            let Some((_, tail)) = text.split_once(trigger) else {
                continue;
            };

            let cleaned = self.strip_boilerplate(tail);
            let cleaned = cleaned.strip_suffix('.').unwrap_or(&cleaned).trim().to_string();
            if !cleaned.is_empty() && !stated.contains(&cleaned) {
                stated.push(cleaned);
            }
        }

        stated
    }

    pub(crate) fn strip_boilerplate(&self, text: &str) -> String {
        collapse_whitespace(&self.boilerplate.replace_all(text, " "))
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|error| anyhow!("failed to compile selector {css}: {error:?}"))
}

/// Text of `element` joined with single spaces, skipping subtrees matched by `excluded`.
fn flatten_text(element: ElementRef<'_>, excluded: &[Selector]) -> String {
    let mut pieces = Vec::<String>::new();
    collect_text(element, excluded, &mut pieces);
    collapse_whitespace(&pieces.join(" "))
}

fn collect_text(element: ElementRef<'_>, excluded: &[Selector], pieces: &mut Vec<String>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    pieces.push(trimmed.to_string());
                }
            }
            Node::Element(_) => {
                let Some(child_element) = ElementRef::wrap(child) else {
                    continue;
                };
                if excluded
                    .iter()
                    .any(|selector| selector.matches(&child_element))
                {
                    continue;
                }
                collect_text(child_element, excluded, pieces);
            }
            _ => {}
        }
    }
}
