use std::fs;
use std::path::{Path, PathBuf};

use super::inventory::{build_manifest, discover_sources};
use super::pipeline::{RunContext, collect_records};
use super::render::load_interchange;
use crate::cli::{BuildArgs, Locale, MergePdfArgs, RenderArgs, RenderOutputArgs, SourceKind, TextStrategy};

fn temp_root(name: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!(
        "quizmerge_commands_{}_{name}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&root);
    fs::create_dir_all(&root).expect("temp root created");
    root
}

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent created");
    }
    fs::write(path, contents).expect("fixture written");
}

fn render_output_args(root: &Path) -> RenderOutputArgs {
    RenderOutputArgs {
        identified_output: root.join("out").join("identified.pdf"),
        unidentified_output: root.join("out").join("unidentified.pdf"),
        style_config: None,
        locale: Locale::En,
        manifest_path: Some(root.join("out").join("run.json")),
    }
}

fn quiz_page(question: &str, options: &[(&str, bool)]) -> String {
    let rows = options
        .iter()
        .enumerate()
        .map(|(index, (text, correct))| {
            let class = if *correct { "r0 correct" } else { "r1" };
            format!(
                r#"<div class="{class}"><div class="d-flex"><span class="answernumber">{index}. </span>{text}</div></div>"#
            )
        })
        .collect::<String>();
    format!(
        r#"<html><body><div class="que"><div class="qtext">{question}</div><div class="answer">{rows}</div></div></body></html>"#
    )
}

#[test]
fn discovery_includes_flat_files_and_quiz_subdirectories() {
    let root = temp_root("discovery");
    write(&root.join("b.html"), "<html></html>");
    write(&root.join("a.HTM"), "<html></html>");
    write(&root.join("notes.txt"), "ignored");
    write(&root.join("Quiz 2").join("page.html"), "<html></html>");
    write(&root.join("quiz1").join("review.pdf"), "%PDF");
    write(&root.join("archive").join("old.html"), "<html></html>");
    write(&root.join("quiz1").join("deeper").join("too_deep.html"), "<html></html>");

    let markup = discover_sources(&root, SourceKind::Markup).expect("markup discovered");
    let pdfs = discover_sources(&root, SourceKind::Pdf).expect("pdfs discovered");
    let _ = fs::remove_dir_all(&root);

    assert_eq!(
        markup,
        vec![
            root.join("Quiz 2").join("page.html"),
            root.join("a.HTM"),
            root.join("b.html"),
        ]
    );
    assert_eq!(pdfs, vec![root.join("quiz1").join("review.pdf")]);
}

#[test]
fn discovery_reports_missing_directory() {
    let root = temp_root("missing").join("does_not_exist");
    assert!(discover_sources(&root, SourceKind::Markup).is_err());
}

#[test]
fn inventory_manifest_hashes_each_source() {
    let root = temp_root("inventory");
    write(&root.join("quiz_a").join("one.html"), "abc");

    let manifest = build_manifest(&root, SourceKind::Markup).expect("manifest built");
    let empty = build_manifest(&root, SourceKind::Pdf);
    let _ = fs::remove_dir_all(&root);

    assert_eq!(manifest.source_count, 1);
    assert_eq!(manifest.source_kind, "markup");
    assert_eq!(manifest.sources[0].size_bytes, 3);
    assert_eq!(
        manifest.sources[0].sha256,
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert!(empty.is_err());
}

#[test]
fn interchange_loading_is_lenient_per_entry() {
    let root = temp_root("interchange");
    let path = root.join("records.json");
    write(
        &path,
        r#"[
            {"question_text": "What is 2+2?", "all_answers": ["3", "4"], "correct_answers": ["4"]},
            "not an object",
            42,
            {"question_text": 7, "all_answers": ["x", null, 3], "correct_answers": "nope"},
            {"question_text": "Unresolved?", "all_answers": ["a"], "correct_answers": ["", "  "]}
        ]"#,
    );

    let records = load_interchange(&path).expect("interchange loads");
    let _ = fs::remove_dir_all(&root);

    assert_eq!(records.len(), 3);
    assert!(records[0].has_identified_correct_answer);
    assert_eq!(records[0].correct_answers, vec!["4"]);
    assert_eq!(records[1].question_text, "");
    assert_eq!(records[1].all_answers, vec!["x"]);
    assert!(!records[1].has_identified_correct_answer);
    assert!(!records[2].has_identified_correct_answer);
    assert!(records[2].correct_answers.is_empty());
}

#[test]
fn interchange_that_is_not_an_array_is_an_error() {
    let root = temp_root("interchange_object");
    let path = root.join("records.json");
    write(&path, r#"{"question_text": "lonely"}"#);

    let result = load_interchange(&path);
    let _ = fs::remove_dir_all(&root);

    assert!(result.is_err());
}

#[test]
fn failing_sources_are_recorded_and_skipped() {
    let root = temp_root("keep_going");
    let good = root.join("good.json");
    write(
        &good,
        r#"[{"question_text": "Kept?", "all_answers": ["Yes"], "correct_answers": ["Yes"]}]"#,
    );
    let broken = root.join("broken.json");
    write(&broken, "[{");
    let missing = root.join("missing.json");

    let mut run = RunContext::start("test".to_string(), Locale::En);
    let records = collect_records(
        &[broken.clone(), good.clone(), missing.clone()],
        &mut run,
        load_interchange,
    );
    let manifest = run.finish(Vec::new());
    let _ = fs::remove_dir_all(&root);

    assert_eq!(records.len(), 1);
    assert_eq!(manifest.counts.source_count, 3);
    assert_eq!(manifest.counts.failed_source_count, 2);
    assert_eq!(manifest.counts.raw_record_count, 1);
    assert_eq!(manifest.sources[0].status, "failed");
    assert!(manifest.sources[0].error.is_some());
    assert_eq!(manifest.sources[1].status, "ok");
    assert_eq!(manifest.sources[1].record_count, 1);
    assert!(manifest.sources[2].sha256.is_none());
    assert!(manifest.run_id.starts_with("run-"));
}

#[test]
fn build_merges_markup_and_writes_both_documents() {
    let root = temp_root("build");
    let source_dir = root.join("quizzes");
    write(
        &source_dir.join("quiz_1").join("attempt.html"),
        &quiz_page("What is BPMN?", &[("A notation", false), ("A database", false)]),
    );
    write(
        &source_dir.join("quiz_2").join("attempt.html"),
        &quiz_page("what is bpmn", &[("A notation", true), ("A database", false)]),
    );
    write(
        &source_dir.join("quiz_2").join("second.html"),
        &quiz_page("Open question?", &[("Yes", false), ("No", false)]),
    );
    write(&source_dir.join("broken.html"), "<html><body>no questions</body></html>");

    let args = BuildArgs {
        source_dir: source_dir.clone(),
        json_output: Some(root.join("out").join("raw.json")),
        render: render_output_args(&root),
    };
    super::build::run(args).expect("build succeeds");

    let identified = fs::read(root.join("out").join("identified.pdf")).expect("identified pdf");
    let unidentified =
        fs::read(root.join("out").join("unidentified.pdf")).expect("unidentified pdf");
    let raw: serde_json::Value = serde_json::from_slice(
        &fs::read(root.join("out").join("raw.json")).expect("raw json"),
    )
    .expect("raw json parses");
    let manifest: serde_json::Value = serde_json::from_slice(
        &fs::read(root.join("out").join("run.json")).expect("run manifest"),
    )
    .expect("run manifest parses");
    let _ = fs::remove_dir_all(&root);

    assert!(identified.starts_with(b"%PDF"));
    assert!(unidentified.starts_with(b"%PDF"));
    assert_eq!(raw.as_array().map(Vec::len), Some(3));
    assert_eq!(manifest["counts"]["source_count"], 4);
    assert_eq!(manifest["counts"]["raw_record_count"], 3);
    assert_eq!(manifest["counts"]["upgrades"], 1);
    assert_eq!(manifest["counts"]["identified_count"], 1);
    assert_eq!(manifest["counts"]["unidentified_count"], 1);
    assert_eq!(manifest["outputs"][0]["partition"], "interchange");
    assert_eq!(manifest["outputs"][0]["question_count"], 3);
    assert_eq!(manifest["outputs"][1]["status"], "ok");
    assert_eq!(manifest["outputs"][2]["question_count"], 1);
}

#[test]
fn build_renders_documents_when_interchange_export_fails() {
    let root = temp_root("build_export_fails");
    let source_dir = root.join("quizzes");
    write(
        &source_dir.join("quiz_1").join("attempt.html"),
        &quiz_page("What is BPMN?", &[("A notation", true), ("A database", false)]),
    );
    write(
        &source_dir.join("quiz_1").join("second.html"),
        &quiz_page("Open question?", &[("Yes", false), ("No", false)]),
    );
    // A regular file where the export's parent directory should be.
    write(&root.join("blocker"), "not a directory");

    let args = BuildArgs {
        source_dir,
        json_output: Some(root.join("blocker").join("raw.json")),
        render: render_output_args(&root),
    };
    let result = super::build::run(args);

    let identified_exists = root.join("out").join("identified.pdf").exists();
    let unidentified_exists = root.join("out").join("unidentified.pdf").exists();
    let manifest: serde_json::Value = serde_json::from_slice(
        &fs::read(root.join("out").join("run.json")).expect("run manifest"),
    )
    .expect("run manifest parses");
    let _ = fs::remove_dir_all(&root);

    assert!(result.is_ok());
    assert!(identified_exists);
    assert!(unidentified_exists);
    assert_eq!(manifest["outputs"][0]["partition"], "interchange");
    assert_eq!(manifest["outputs"][0]["status"], "failed");
    assert!(manifest["outputs"][0]["error"].is_string());
    assert_eq!(manifest["outputs"][1]["status"], "ok");
    assert_eq!(manifest["outputs"][2]["status"], "ok");
    assert_eq!(manifest["warnings"].as_array().map(Vec::len), Some(1));
}

#[test]
fn render_skips_empty_partition_and_keeps_the_other() {
    let root = temp_root("render");
    let input = root.join("records.json");
    write(
        &input,
        r#"[
            {"question_text": "Zebra?", "all_answers": ["z"], "correct_answers": ["z"]},
            {"question_text": "Apple?", "all_answers": ["a"], "correct_answers": ["a"]}
        ]"#,
    );

    let args = RenderArgs {
        input,
        render: render_output_args(&root),
    };
    super::render::run(args).expect("render succeeds");

    let identified_exists = root.join("out").join("identified.pdf").exists();
    let unidentified_exists = root.join("out").join("unidentified.pdf").exists();
    let manifest: serde_json::Value = serde_json::from_slice(
        &fs::read(root.join("out").join("run.json")).expect("run manifest"),
    )
    .expect("run manifest parses");
    let _ = fs::remove_dir_all(&root);

    assert!(identified_exists);
    assert!(!unidentified_exists);
    assert_eq!(manifest["outputs"][1]["status"], "skipped");
    assert_eq!(manifest["warnings"].as_array().map(Vec::len), Some(1));
}

#[test]
fn missing_source_directory_is_reported_not_fatal() {
    let root = temp_root("no_sources");
    let args = MergePdfArgs {
        source_dir: root.join("absent"),
        strategy: TextStrategy::Scan,
        layout: false,
        render: render_output_args(&root),
    };
    super::merge_pdf::run(args).expect("run completes");

    let manifest: serde_json::Value = serde_json::from_slice(
        &fs::read(root.join("out").join("run.json")).expect("run manifest"),
    )
    .expect("run manifest parses");
    let _ = fs::remove_dir_all(&root);

    assert_eq!(manifest["counts"]["source_count"], 0);
    assert_eq!(manifest["outputs"][0]["status"], "skipped");
    assert_eq!(manifest["outputs"][1]["status"], "skipped");
}

#[test]
fn reconstructed_commands_list_every_flag() {
    let root = PathBuf::from("work");
    let build = BuildArgs {
        source_dir: root.join("quizzes"),
        json_output: None,
        render: RenderOutputArgs {
            locale: Locale::Pl,
            manifest_path: None,
            ..render_output_args(&root)
        },
    };
    let merge = MergePdfArgs {
        source_dir: root.join("pdfs"),
        strategy: TextStrategy::Pattern,
        layout: true,
        render: render_output_args(&root),
    };

    let build_command = super::build::render_build_command(&build);
    let merge_command = super::merge_pdf::render_merge_pdf_command(&merge);

    assert!(build_command.starts_with("quizmerge build --source-dir work/quizzes"));
    assert!(build_command.contains("--locale pl"));
    assert!(!build_command.contains("--json-output"));
    assert!(!build_command.contains("--manifest-path"));
    assert!(merge_command.contains("--strategy pattern --layout"));
    assert!(merge_command.contains("--manifest-path work/out/run.json"));
}
