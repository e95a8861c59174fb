use std::path::Path;

use anyhow::Result;
use tracing::{error, info};

use crate::cli::{BuildArgs, SourceKind};
use crate::commands::pipeline::{
    RunContext, STATUS_FAILED, STATUS_OK, collect_records, discover_or_report, publish,
    push_render_output_flags,
};
use crate::extract::MarkupExtractor;
use crate::merge::MergeOrder;
use crate::model::{InterchangeRecord, OutputOutcome, QuestionRecord};
use crate::util::write_json_pretty;

pub fn run(args: BuildArgs) -> Result<()> {
    let mut run = RunContext::start(render_build_command(&args), args.render.locale);
    let extractor = MarkupExtractor::new(args.render.locale.vocabulary())?;

    let paths = discover_or_report(&args.source_dir, SourceKind::Markup, &mut run);
    let records = collect_records(&paths, &mut run, |path| extractor.extract_file(path));

    if let Some(json_output) = &args.json_output {
        export_interchange(json_output, &records, &mut run);
    }

    publish(run, records, MergeOrder::Encounter, &args.render)
}

/// Writes the raw records; a write failure is recorded and the documents are still rendered.
fn export_interchange(path: &Path, records: &[QuestionRecord], run: &mut RunContext) {
    let interchange = records
        .iter()
        .map(|record| record.to_interchange())
        .collect::<Vec<InterchangeRecord>>();

    let mut outcome = OutputOutcome {
        partition: "interchange".to_string(),
        path: path.display().to_string(),
        question_count: interchange.len(),
        status: STATUS_OK.to_string(),
        error: None,
    };

    match write_json_pretty(path, &interchange) {
        Ok(()) => info!(
            path = %path.display(),
            record_count = interchange.len(),
            "wrote interchange records"
        ),
        Err(err) => {
            let reason = format!("{err:#}");
            error!(path = %path.display(), reason = %reason, "failed to write interchange records");
            run.warn(format!("interchange export failed: {reason}"));
            outcome.question_count = 0;
            outcome.status = STATUS_FAILED.to_string();
            outcome.error = Some(reason);
        }
    }

    run.record_output(outcome);
}

pub(crate) fn render_build_command(args: &BuildArgs) -> String {
    let mut command = vec![
        "quizmerge".to_string(),
        "build".to_string(),
        "--source-dir".to_string(),
        args.source_dir.display().to_string(),
    ];

    if let Some(path) = &args.json_output {
        command.push("--json-output".to_string());
        command.push(path.display().to_string());
    }
    push_render_output_flags(&mut command, &args.render);

    command.join(" ")
}
