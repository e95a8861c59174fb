use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::warn;

use crate::cli::RenderArgs;
use crate::commands::pipeline::{RunContext, collect_records, publish, push_render_output_flags};
use crate::merge::MergeOrder;
use crate::model::{InterchangeRecord, QuestionRecord};

pub fn run(args: RenderArgs) -> Result<()> {
    let mut run = RunContext::start(render_render_command(&args), args.render.locale);

    let inputs = [args.input.clone()];
    let records = collect_records(&inputs, &mut run, load_interchange);

    publish(run, records, MergeOrder::SortedByKey, &args.render)
}

/// Reads an interchange file, skipping entries that are not objects.
pub fn load_interchange(path: &Path) -> Result<Vec<QuestionRecord>> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let entries = value
        .as_array()
        .with_context(|| format!("expected a json array of records in {}", path.display()))?;

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match interchange_from_value(entry) {
            Some(record) => records.push(QuestionRecord::from_interchange(record)),
            None => warn!(path = %path.display(), index, "skipping non-object interchange entry"),
        }
    }

    Ok(records)
}

/// Lenient field reading: non-string text reads as empty, non-string list items are dropped.
fn interchange_from_value(entry: &Value) -> Option<InterchangeRecord> {
    let object = entry.as_object()?;

    let text = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let list = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(ToOwned::to_owned)
                    .collect::<Vec<String>>()
            })
            .unwrap_or_default()
    };

    Some(InterchangeRecord {
        question_text: text("question_text"),
        all_answers: list("all_answers"),
        correct_answers: list("correct_answers"),
    })
}

pub(crate) fn render_render_command(args: &RenderArgs) -> String {
    let mut command = vec![
        "quizmerge".to_string(),
        "render".to_string(),
        "--input".to_string(),
        args.input.display().to_string(),
    ];
    push_render_output_flags(&mut command, &args.render);

    command.join(" ")
}
