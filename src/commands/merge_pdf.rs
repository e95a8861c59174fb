use anyhow::Result;
use tracing::info;

use crate::cli::{MergePdfArgs, SourceKind};
use crate::commands::pipeline::{
    RunContext, collect_records, discover_or_report, publish, push_render_output_flags,
};
use crate::extract::{read_pdf_text, text_extractor};
use crate::merge::MergeOrder;

pub fn run(args: MergePdfArgs) -> Result<()> {
    let mut run = RunContext::start(render_merge_pdf_command(&args), args.render.locale);
    let extractor = text_extractor(args.strategy, args.render.locale.vocabulary())?;
    info!(strategy = extractor.name(), layout = args.layout, "reading quiz pdfs");

    let paths = discover_or_report(&args.source_dir, SourceKind::Pdf, &mut run);
    let records = collect_records(&paths, &mut run, |path| {
        let text = read_pdf_text(path, args.layout)?;
        Ok(extractor.extract(&text))
    });

    publish(run, records, MergeOrder::Encounter, &args.render)
}

pub(crate) fn render_merge_pdf_command(args: &MergePdfArgs) -> String {
    let mut command = vec![
        "quizmerge".to_string(),
        "merge-pdf".to_string(),
        "--source-dir".to_string(),
        args.source_dir.display().to_string(),
        "--strategy".to_string(),
        args.strategy.as_str().to_string(),
    ];

    if args.layout {
        command.push("--layout".to_string());
    }
    push_render_output_flags(&mut command, &args.render);

    command.join(" ")
}
