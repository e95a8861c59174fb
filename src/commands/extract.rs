use anyhow::Result;
use tracing::info;

use crate::cli::{ExtractArgs, SourceKind};
use crate::commands::pipeline::{RunContext, collect_records, discover_or_report};
use crate::extract::MarkupExtractor;
use crate::model::{InterchangeRecord, OutputOutcome};
use crate::util::write_json_pretty;

pub fn run(args: ExtractArgs) -> Result<()> {
    let mut run = RunContext::start(render_extract_command(&args), args.locale);
    let extractor = MarkupExtractor::new(args.locale.vocabulary())?;

    let paths = discover_or_report(&args.source_dir, SourceKind::Markup, &mut run);
    let records = collect_records(&paths, &mut run, |path| extractor.extract_file(path));

    let interchange = records
        .iter()
        .map(|record| record.to_interchange())
        .collect::<Vec<InterchangeRecord>>();
    write_json_pretty(&args.output, &interchange)?;
    info!(
        path = %args.output.display(),
        record_count = interchange.len(),
        "wrote interchange records"
    );

    let outputs = vec![OutputOutcome {
        partition: "interchange".to_string(),
        path: args.output.display().to_string(),
        question_count: interchange.len(),
        status: "ok".to_string(),
        error: None,
    }];
    run.write_manifest(args.manifest_path.as_deref(), outputs)
}

pub(crate) fn render_extract_command(args: &ExtractArgs) -> String {
    let mut command = vec![
        "quizmerge".to_string(),
        "extract".to_string(),
        "--source-dir".to_string(),
        args.source_dir.display().to_string(),
        "--output".to_string(),
        args.output.display().to_string(),
        "--locale".to_string(),
        args.locale.as_str().to_string(),
    ];

    if let Some(path) = &args.manifest_path {
        command.push("--manifest-path".to_string());
        command.push(path.display().to_string());
    }

    command.join(" ")
}
