use std::fs;
use std::path::PathBuf;

use super::pdf::{encode_text, wrap_text};
use super::style::{FontFamily, Rgb};
use super::*;
use crate::extract::{PatternExtractor, SentinelScanner, TextRecordExtractor};
use crate::vocabulary::{ENGLISH, POLISH};

#[derive(Default)]
struct RecordingSink {
    blocks: Vec<TextBlock>,
    text: String,
    page_breaks: usize,
}

impl DocumentSink for RecordingSink {
    fn push_block(&mut self, block: &TextBlock) {
        self.blocks.push(block.clone());
        self.text.push_str(&block.text);
        self.text.push('\n');
    }

    fn spacer(&mut self, _points: f32) {}

    fn page_break(&mut self) {
        self.page_breaks += 1;
        self.text.push('\n');
    }
}

fn record(question: &str, answers: &[&str], correct: &[&str]) -> QuestionRecord {
    QuestionRecord::new(
        question,
        answers.iter().map(|value| value.to_string()).collect(),
        correct.iter().map(|value| value.to_string()).collect(),
        !correct.is_empty(),
    )
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("quizmerge_render_{}_{name}", std::process::id()))
}

#[test]
fn layout_numbers_questions_and_highlights_correct_options() {
    let questions = vec![
        record("What is 2+2?", &["3", "4"], &["4"]),
        record("Capital of France?", &["Paris", "Lyon"], &[]),
    ];
    let mut sink = RecordingSink::default();

    let rendered = render_questions(&mut sink, &questions, "Title", &ENGLISH, 24.0);

    assert_eq!(rendered, 2);
    assert_eq!(sink.page_breaks, 1);
    assert_eq!(sink.blocks[0], TextBlock::new("Title", BlockStyle::Title));
    assert!(sink
        .blocks
        .contains(&TextBlock::new("Question 2:", BlockStyle::QuestionHeading)));
    assert!(sink
        .blocks
        .contains(&TextBlock::new("- 4", BlockStyle::CorrectOption)));
    assert!(sink.blocks.contains(&TextBlock::new("- 3", BlockStyle::Answer)));
    assert!(sink.blocks.contains(&TextBlock::new(
        "Correct answer: (could not be identified or absent)",
        BlockStyle::Unidentified
    )));
}

#[test]
fn records_without_question_text_are_skipped() {
    let questions = vec![
        record("", &["orphan"], &[]),
        record("Kept?", &["Yes"], &["Yes"]),
    ];
    let mut sink = RecordingSink::default();

    let rendered = render_questions(&mut sink, &questions, "Title", &ENGLISH, 24.0);

    assert_eq!(rendered, 1);
    assert_eq!(sink.page_breaks, 0);
    assert!(sink.text.contains("Question 1:\nKept?"));
    assert!(!sink.text.contains("orphan"));
}

#[test]
fn rendered_text_reads_back_through_both_text_extractors() {
    let questions = vec![
        record(
            "Which notation models business processes?",
            &["BPMN", "UML class diagram", "ERD"],
            &["BPMN"],
        ),
        record("Second question", &["Yes", "No"], &[]),
        record("Pick all even numbers", &["1", "2", "4"], &["2", "4"]),
    ];

    for vocabulary in [ENGLISH, POLISH] {
        let mut sink = RecordingSink::default();
        render_questions(
            &mut sink,
            &questions,
            vocabulary.identified_title,
            &vocabulary,
            24.0,
        );

        let extractors: Vec<Box<dyn TextRecordExtractor>> = vec![
            Box::new(PatternExtractor::new(vocabulary).expect("pattern extractor builds")),
            Box::new(SentinelScanner::new(vocabulary).expect("scanner builds")),
        ];
        for extractor in extractors {
            assert_eq!(
                extractor.extract(&sink.text),
                questions,
                "strategy {} / {}",
                extractor.name(),
                vocabulary.question_label
            );
        }
    }
}

#[test]
fn pdf_builder_emits_one_page_per_question() {
    let questions = vec![
        record("Zażółć gęślą jaźń?", &["Tak", "Nie"], &["Tak"]),
        record("Second?", &["A", "B"], &[]),
    ];
    let config = RenderConfig::default();
    let mut builder = PdfDocumentBuilder::new(config.clone(), POLISH.identified_title);
    render_questions(
        &mut builder,
        &questions,
        POLISH.identified_title,
        &POLISH,
        config.title_spacing,
    );

    let bytes = builder.into_bytes().expect("pdf serialized");
    assert!(bytes.starts_with(b"%PDF-1.5"));

    let doc = lopdf::Document::load_mem(&bytes).expect("pdf parses back");
    assert_eq!(doc.get_pages().len(), 2);
}

#[test]
fn empty_partition_still_produces_a_single_page() {
    let builder = PdfDocumentBuilder::new(RenderConfig::default(), "Empty");
    let bytes = builder.into_bytes().expect("pdf serialized");

    let doc = lopdf::Document::load_mem(&bytes).expect("pdf parses back");
    assert_eq!(doc.get_pages().len(), 1);
}

#[test]
fn long_questions_flow_onto_extra_pages() {
    let long_text = "word ".repeat(4000);
    let questions = vec![record(&long_text, &["A"], &["A"])];
    let mut builder = PdfDocumentBuilder::new(RenderConfig::default(), "Long");
    render_questions(&mut builder, &questions, "Long", &ENGLISH, 24.0);

    let bytes = builder.into_bytes().expect("pdf serialized");
    let doc = lopdf::Document::load_mem(&bytes).expect("pdf parses back");
    assert!(doc.get_pages().len() > 1);
}

#[test]
fn write_pdf_creates_parent_directories() {
    let dir = temp_path("nested");
    let path = dir.join("out").join("identified.pdf");
    let questions = vec![record("Saved?", &["Yes"], &["Yes"])];

    let rendered = write_pdf(
        &path,
        &questions,
        ENGLISH.identified_title,
        &ENGLISH,
        &RenderConfig::default(),
    )
    .expect("pdf written");

    let bytes = fs::read(&path).expect("pdf readable");
    let _ = fs::remove_dir_all(&dir);

    assert_eq!(rendered, 1);
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn encode_text_maps_polish_letters_and_replaces_unknown_characters() {
    assert_eq!(encode_text("abc"), b"abc".to_vec());
    assert_eq!(encode_text("ą"), vec![128]);
    assert_eq!(encode_text("Ż"), vec![143]);
    assert_eq!(encode_text("ó"), vec![0xF3]);
    assert_eq!(encode_text("\u{2013}"), vec![0x96]);
    assert_eq!(encode_text("漢"), b"?".to_vec());
}

#[test]
fn wrap_text_breaks_on_words_and_splits_long_words() {
    assert_eq!(
        wrap_text("one two three four", 9),
        vec!["one two", "three", "four"]
    );
    assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    assert_eq!(wrap_text("ab abcdefgh", 4), vec!["ab", "abcd", "efgh"]);
    assert!(wrap_text("   ", 10).is_empty());
}

#[test]
fn wrapped_continuation_lines_never_open_with_a_dash() {
    let lines = wrap_text("- Alpha beta - gamma delta", 12);
    assert_eq!(lines, vec!["- Alpha beta -", "gamma delta"]);
    assert_eq!(wrap_text("ab -abcdefgh", 4), vec!["ab -abc", "defg", "h"]);

    let text = format!(
        "Question 1:\nDash test\nAvailable answers:\n{}\n- Other\nCorrect answer:\n- Other\n",
        lines.join("\n")
    );
    let extractors: Vec<Box<dyn TextRecordExtractor>> = vec![
        Box::new(PatternExtractor::new(ENGLISH).expect("pattern extractor builds")),
        Box::new(SentinelScanner::new(ENGLISH).expect("scanner builds")),
    ];
    for extractor in extractors {
        let records = extractor.extract(&text);
        assert_eq!(
            records[0].all_answers,
            vec!["Alpha beta - gamma delta".to_string(), "Other".to_string()],
            "strategy {}",
            extractor.name()
        );
    }
}

#[test]
fn partial_style_config_keeps_defaults_for_missing_roles() {
    let config: RenderConfig = serde_json::from_str(
        r#"{"font_family": "times", "margin": 50, "correct": {"color": [0, 0, 1]}}"#,
    )
    .expect("config parses");

    assert_eq!(config.font_family, FontFamily::Times);
    assert_eq!(config.margin, 50.0);
    assert_eq!(config.correct.color, Rgb(0.0, 0.0, 1.0));
    assert_eq!(config.question, RenderConfig::default().question);
    assert_eq!(config.page_width, 595.0);
    config.validate().expect("config is usable");
}

#[test]
fn unusable_style_config_falls_back_to_defaults() {
    let oversized = temp_path("oversized_margin.json");
    fs::write(&oversized, r#"{"margin": 400}"#).expect("config written");
    assert!(RenderConfig::load(&oversized).is_err());
    assert_eq!(
        RenderConfig::load_or_default(Some(&oversized)),
        RenderConfig::default()
    );
    let _ = fs::remove_file(&oversized);

    let malformed = temp_path("malformed.json");
    fs::write(&malformed, "{not json").expect("config written");
    assert_eq!(
        RenderConfig::load_or_default(Some(&malformed)),
        RenderConfig::default()
    );
    let _ = fs::remove_file(&malformed);

    let missing = temp_path("missing.json");
    assert_eq!(
        RenderConfig::load_or_default(Some(&missing)),
        RenderConfig::default()
    );
    assert_eq!(RenderConfig::load_or_default(None), RenderConfig::default());
}
